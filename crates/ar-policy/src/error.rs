// error.rs — Error types for the guardrail subsystem.

use thiserror::Error;

use crate::guardrail::BlockReason;

/// Errors returned when a guardrail vetoes an operation.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum GuardrailError {
    /// The path is protected and must never be mutated.
    #[error("Blocked path: {path}")]
    BlockedPath { path: String, reason: BlockReason },
}
