//! # ar-policy
//!
//! Path guardrails for the agent runner.
//!
//! Task content comes from an automated planner and is never trusted to stay
//! away from dependency caches, version-control metadata or credentials.
//! [`is_path_blocked`] is a pure predicate (no I/O) consulted before every
//! single file mutation, not once per task.
//!
//! ## Key invariants
//!
//! - **Protected directories**: any path with a segment in [`BLOCKED_DIRS`] is blocked.
//! - **Sensitive files**: env files, private keys/certificates and credential or
//!   secret files are blocked by suffix or file name (case-sensitive).
//! - **Repository-relative only**: absolute paths and `..` segments are blocked.

pub mod error;
pub mod guardrail;

pub use error::GuardrailError;
pub use guardrail::{
    check_path, evaluate, is_path_blocked, BlockReason, GuardrailVerdict, BLOCKED_DIRS,
    BLOCKED_FILE_NAMES, BLOCKED_SUFFIXES,
};
