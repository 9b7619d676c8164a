//! # ar-task
//!
//! Task payloads, results and the task executor for the agent runner.
//!
//! A [`TaskPayload`] is consumed exactly once by a [`TaskExecutor`], which
//! walks a linear state machine and always produces a [`TaskResult`]:
//!
//! ```text
//! init → branch_created → files_processed → committed → commands_run → done
//! ```
//!
//! Only a branch-creation failure aborts early. Per-file and per-command
//! failures are accumulated and reported together in the result.
//!
//! ## Key components
//!
//! - [`TaskPayload`] / [`TaskSpec`] — the declarative instruction set
//! - [`TaskExecutor`] — drives guardrail → mutation → commit → commands
//! - [`TaskResult`] — the single JSON artifact written to stdout
//! - [`RunnerConfig`] — `.runner/runner.toml`
//! - [`RunLog`] — per-task step log reported as `artifacts.log_path`

pub mod config;
pub mod error;
pub mod executor;
pub mod payload;
pub mod result;
pub mod run_log;
pub mod state;

pub use config::{RunnerConfig, CONFIG_RELATIVE_PATH};
pub use error::TaskError;
pub use executor::{commit_message, TaskExecutor};
pub use payload::{FileToCreate, FileToModify, TaskPayload, TaskSpec};
pub use result::{TaskArtifacts, TaskResult};
pub use run_log::RunLog;
pub use state::TaskState;
