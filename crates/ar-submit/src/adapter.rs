//! Core SubmitAdapter trait and result types

use ar_sandbox::CommandRunner;
use ar_workspace::Workspace;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::SubmitConfig;
use crate::git::GitAdapter;
use crate::none::NoneAdapter;

/// Errors that can occur during submit operations
#[derive(Debug, Error)]
pub enum SubmitError {
    #[error("Adapter not configured: {0}")]
    NotConfigured(String),

    #[error("VCS operation failed: {0}")]
    VcsError(String),
}

pub type Result<T> = std::result::Result<T, SubmitError>;

/// Result of creating (or re-entering) a task branch
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BranchResult {
    /// The branch now checked out
    pub branch: String,

    /// What the branch was created from (e.g. "origin/main", "HEAD")
    pub base: String,

    /// False when an existing branch of the same name was checked out instead
    pub created: bool,
}

/// Result of a commit operation
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CommitResult {
    /// Commit hash, or None when nothing was staged
    pub commit_id: Option<String>,

    /// Files that were successfully staged
    pub staged: Vec<String>,

    /// Human-readable message
    pub message: String,
}

/// Pluggable adapter for isolating and recording a task's changes
pub trait SubmitAdapter {
    /// Create and check out the task branch
    ///
    /// For Git: branch from the remote default branch, falling back to the
    /// current HEAD; an existing branch of the same name is reused
    /// For "none": no-op
    fn create_branch(&self, workspace: &Workspace, name: &str) -> Result<BranchResult>;

    /// Stage exactly `files` and commit them
    ///
    /// Returns a null commit id rather than creating an empty commit.
    fn commit_changes(
        &self,
        workspace: &Workspace,
        message: &str,
        files: &[String],
    ) -> Result<CommitResult>;

    /// Adapter display name (for logs)
    fn name(&self) -> &str;
}

/// Build the adapter named by `config.adapter`.
pub fn adapter_for(config: &SubmitConfig, runner: CommandRunner) -> Result<Box<dyn SubmitAdapter>> {
    match config.adapter.as_str() {
        "git" => Ok(Box::new(GitAdapter::new(runner, config.git.clone()))),
        "none" => Ok(Box::new(NoneAdapter::new())),
        other => Err(SubmitError::NotConfigured(format!(
            "unknown submit adapter '{}' (expected \"git\" or \"none\")",
            other
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn adapter_for_selects_by_name() {
        let mut config = SubmitConfig::default();
        assert_eq!(
            adapter_for(&config, CommandRunner::new()).unwrap().name(),
            "git"
        );

        config.adapter = "none".to_string();
        assert_eq!(
            adapter_for(&config, CommandRunner::new()).unwrap().name(),
            "none"
        );

        config.adapter = "perforce".to_string();
        assert!(matches!(
            adapter_for(&config, CommandRunner::new()),
            Err(SubmitError::NotConfigured(_))
        ));
    }
}
