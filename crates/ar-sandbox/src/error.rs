// error.rs — Error types for command execution.

use thiserror::Error;

/// Why a command did not succeed.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CommandError {
    /// The process could not be started at all.
    #[error("failed to start `{command}`: {message}")]
    Spawn { command: String, message: String },

    /// The process exceeded its wall-clock budget and was killed.
    #[error("Command timed out after {timeout_secs}s: {command}")]
    Timeout { command: String, timeout_secs: u64 },

    /// The process exited unsuccessfully (or was killed by a signal: `code` is None).
    #[error("Command failed: {command}: {stderr}")]
    NonZeroExit {
        command: String,
        code: Option<i32>,
        stderr: String,
    },
}
