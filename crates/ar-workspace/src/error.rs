// error.rs — Error types for the file mutation engine.

use std::path::PathBuf;

use ar_policy::{BlockReason, GuardrailError};
use thiserror::Error;

/// Errors that can occur while mutating a single file.
///
/// These are per-file: the executor collects them and moves on to the next
/// file rather than aborting the task.
#[derive(Debug, Error)]
pub enum MutationError {
    /// The guardrail vetoed the path. Never retried.
    #[error("Blocked path: {path}")]
    BlockedPath { path: String, reason: BlockReason },

    /// The content to write exceeds the size ceiling.
    #[error("File too large: {path} ({size} bytes exceeds limit of {limit} bytes)")]
    FileTooLarge {
        path: String,
        size: usize,
        limit: usize,
    },

    /// The file to modify does not exist.
    #[error("File not found: {path}")]
    FileNotFound { path: String },

    /// A file I/O operation failed.
    #[error("I/O error at {path}: {source}")]
    IoError {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl From<GuardrailError> for MutationError {
    fn from(err: GuardrailError) -> Self {
        match err {
            GuardrailError::BlockedPath { path, reason } => {
                MutationError::BlockedPath { path, reason }
            }
        }
    }
}
