//! "None" adapter - mutate the working tree without touching version control

use ar_workspace::Workspace;

use crate::adapter::{BranchResult, CommitResult, Result, SubmitAdapter};

/// Fallback adapter that performs no VCS operations
///
/// Selected with `adapter = "none"`, e.g. when the workspace is not a git
/// checkout. Branch creation reports the derived name without creating it and
/// commits always come back with a null id.
pub struct NoneAdapter;

impl NoneAdapter {
    pub fn new() -> Self {
        Self
    }
}

impl Default for NoneAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl SubmitAdapter for NoneAdapter {
    fn create_branch(&self, _workspace: &Workspace, name: &str) -> Result<BranchResult> {
        tracing::debug!("NoneAdapter: create_branch() - no-op");
        Ok(BranchResult {
            branch: name.to_string(),
            base: "none".to_string(),
            created: false,
        })
    }

    fn commit_changes(
        &self,
        _workspace: &Workspace,
        _message: &str,
        files: &[String],
    ) -> Result<CommitResult> {
        tracing::debug!("NoneAdapter: commit_changes() - no-op");
        Ok(CommitResult {
            commit_id: None,
            staged: files.to_vec(),
            message: "No commit (none adapter)".to_string(),
        })
    }

    fn name(&self) -> &str {
        "none"
    }
}
