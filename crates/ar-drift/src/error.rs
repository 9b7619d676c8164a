// error.rs — Error types for drift detection and remediation.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that abort a drift run. The binary maps these to exit code 2.
#[derive(Debug, Error)]
pub enum DriftError {
    /// An artifact directory exists but could not be listed.
    #[error("failed to scan {path}: {source}")]
    ScanFailed {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Failed to read an artifact for fingerprinting.
    #[error("failed to read artifact at {path}: {source}")]
    ReadFailed {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The report could not be written.
    #[error("failed to write report to {path}: {source}")]
    ReportWriteFailed {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    /// The `[drift]` section of the config file could not be parsed.
    #[error("invalid config at {path}: {message}")]
    Config { path: PathBuf, message: String },

    /// A remediation sink could not accept a task.
    #[error("failed to submit remediation task {task_key}: {message}")]
    SinkFailed { task_key: String, message: String },
}
