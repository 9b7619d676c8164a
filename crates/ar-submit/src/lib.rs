//! Submit adapters for VCS integration
//!
//! The executor isolates each task on its own branch and records the files it
//! touched as a single commit. The core abstraction is the [`SubmitAdapter`]
//! trait, with a [`GitAdapter`] that shells out to `git` through the bounded
//! command runner and a no-op [`NoneAdapter`] fallback.

pub mod adapter;
pub mod branch;
pub mod config;
pub mod git;
pub mod none;

pub use adapter::{adapter_for, BranchResult, CommitResult, SubmitAdapter, SubmitError};
pub use branch::branch_name;
pub use config::{GitConfig, SubmitConfig};
pub use git::GitAdapter;
pub use none::NoneAdapter;
