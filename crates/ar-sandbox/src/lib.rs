//! # ar-sandbox
//!
//! Bounded command execution for the agent runner.
//!
//! Every subprocess the runner starts, whether a VCS subcommand or one of a
//! task's `commands_to_run`, goes through [`CommandRunner`]. A run always
//! finishes with a [`CommandOutcome`] describing exit status and captured
//! output; timeouts and non-zero exits are data, not panics or raw I/O errors.
//! Callers that want `?` semantics use [`CommandOutcome::into_result`].

pub mod config;
pub mod error;
pub mod runner;

pub use config::SandboxConfig;
pub use error::CommandError;
pub use runner::{
    CommandOutcome, CommandRunner, CommandStatus, DEFAULT_OUTPUT_LIMIT_BYTES, DEFAULT_TIMEOUT,
};
