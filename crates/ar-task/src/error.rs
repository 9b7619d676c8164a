// error.rs — Error types for task loading and execution setup.

use std::path::PathBuf;

use ar_submit::SubmitError;
use thiserror::Error;

/// Errors that stop a task before any mutation happens.
///
/// Failures during execution are not errors: they are accumulated into the
/// `TaskResult`.
#[derive(Debug, Error)]
pub enum TaskError {
    /// The payload is not valid JSON or lacks a required field.
    #[error("malformed task input: {0}")]
    MalformedInput(String),

    /// The runner configuration file could not be parsed.
    #[error("invalid config at {path}: {message}")]
    Config { path: PathBuf, message: String },

    /// A file I/O operation failed.
    #[error("I/O error at {path}: {source}")]
    IoError {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The configured submit adapter could not be built.
    #[error(transparent)]
    Submit(#[from] SubmitError),
}
