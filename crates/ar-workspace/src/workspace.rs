// workspace.rs — The repository a task mutates, passed explicitly.
//
// Components never read the process working directory. The executor builds
// one Workspace per invocation and threads it through the mutation engine,
// the submit adapter and the command runner.

use std::path::{Path, PathBuf};

use crate::error::MutationError;

/// A handle on the checked-out repository a task operates on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Workspace {
    root: PathBuf,
}

impl Workspace {
    /// Create a workspace rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The repository root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve a repository-relative path after the guardrail has allowed it.
    ///
    /// Every mutation goes through here, so no file operation can skip the check.
    pub fn resolve(&self, relative_path: &str) -> Result<PathBuf, MutationError> {
        ar_policy::check_path(relative_path)?;
        Ok(self.root.join(relative_path))
    }

    /// Whether an allowed path currently names a file. Guarded paths are never reported.
    pub fn contains_file(&self, relative_path: &str) -> bool {
        !ar_policy::is_path_blocked(relative_path) && self.root.join(relative_path).is_file()
    }
}
