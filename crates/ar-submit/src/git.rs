//! Git adapter: one branch per task, one commit per run

use ar_sandbox::CommandRunner;
use ar_workspace::Workspace;

use crate::adapter::{BranchResult, CommitResult, Result, SubmitAdapter, SubmitError};
use crate::config::GitConfig;

/// Git adapter implementing the task branch workflow
///
/// Features:
/// - Branches from the remote default branch after a fetch
/// - Falls back to branching from the current HEAD when offline
/// - Re-enters an existing task branch on retry
/// - Stages only the files the task touched
pub struct GitAdapter {
    runner: CommandRunner,
    config: GitConfig,
}

impl GitAdapter {
    /// Create a new GitAdapter that runs git through `runner`
    pub fn new(runner: CommandRunner, config: GitConfig) -> Self {
        Self { runner, config }
    }

    /// Run a git command in the workspace root
    fn git_cmd(&self, workspace: &Workspace, args: &[&str]) -> Result<String> {
        let outcome = self
            .runner
            .run_program("git", args, workspace.root())
            .into_result()
            .map_err(|e| SubmitError::VcsError(e.to_string()))?;
        Ok(outcome.stdout.trim().to_string())
    }

    /// Get current branch name
    pub fn current_branch(&self, workspace: &Workspace) -> Result<String> {
        self.git_cmd(workspace, &["rev-parse", "--abbrev-ref", "HEAD"])
    }

    /// Resolve the remote's default branch, or the configured fallback
    fn default_branch(&self, workspace: &Workspace) -> String {
        let head_ref = format!("refs/remotes/{}/HEAD", self.config.remote);
        match self.git_cmd(workspace, &["symbolic-ref", "--short", &head_ref]) {
            Ok(short) => {
                let prefix = format!("{}/", self.config.remote);
                let name = short.strip_prefix(&prefix).unwrap_or(&short).to_string();
                if name.is_empty() {
                    self.config.fallback_branch.clone()
                } else {
                    name
                }
            }
            Err(e) => {
                tracing::debug!(error = %e, "remote HEAD not resolvable, using fallback branch");
                self.config.fallback_branch.clone()
            }
        }
    }

    fn branch_exists(&self, workspace: &Workspace, name: &str) -> bool {
        let local_ref = format!("refs/heads/{}", name);
        self.git_cmd(workspace, &["rev-parse", "--verify", "--quiet", &local_ref])
            .is_ok()
    }
}

impl SubmitAdapter for GitAdapter {
    fn create_branch(&self, workspace: &Workspace, name: &str) -> Result<BranchResult> {
        if self.branch_exists(workspace, name) {
            tracing::info!(branch = name, "GitAdapter: branch exists, checking it out");
            self.git_cmd(workspace, &["checkout", name])?;
            return Ok(BranchResult {
                branch: name.to_string(),
                base: name.to_string(),
                created: false,
            });
        }

        let default_branch = self.default_branch(workspace);
        let remote = &self.config.remote;

        if let Err(e) = self.git_cmd(workspace, &["fetch", remote, &default_branch]) {
            tracing::warn!(error = %e, "GitAdapter: fetch failed, continuing with local state");
        }

        let upstream = format!("{}/{}", remote, default_branch);
        tracing::info!(branch = name, base = %upstream, "GitAdapter: creating branch");
        match self.git_cmd(workspace, &["checkout", "-b", name, &upstream]) {
            Ok(_) => Ok(BranchResult {
                branch: name.to_string(),
                base: upstream,
                created: true,
            }),
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    "GitAdapter: could not branch from {}, branching from HEAD",
                    upstream
                );
                self.git_cmd(workspace, &["checkout", "-b", name])?;
                Ok(BranchResult {
                    branch: name.to_string(),
                    base: "HEAD".to_string(),
                    created: true,
                })
            }
        }
    }

    fn commit_changes(
        &self,
        workspace: &Workspace,
        message: &str,
        files: &[String],
    ) -> Result<CommitResult> {
        tracing::info!(files = files.len(), "GitAdapter: staging changes");

        // -A so that deletions are staged too.
        let mut staged = Vec::with_capacity(files.len());
        for file in files {
            match self.git_cmd(workspace, &["add", "-A", "--", file]) {
                Ok(_) => staged.push(file.clone()),
                Err(e) => tracing::warn!(file = %file, error = %e, "GitAdapter: failed to stage file"),
            }
        }

        // Everything below is limited to the task's own paths; anything else
        // already in the index stays staged and out of this commit.
        let paths: Vec<&str> = staged.iter().map(String::as_str).collect();
        let pending = if paths.is_empty() {
            String::new()
        } else {
            let mut args = vec!["diff", "--cached", "--name-only", "--"];
            args.extend(&paths);
            self.git_cmd(workspace, &args)?
        };
        if pending.is_empty() {
            tracing::info!("GitAdapter: nothing staged, skipping commit");
            return Ok(CommitResult {
                commit_id: None,
                staged,
                message: "No changes to commit".to_string(),
            });
        }

        let mut args = vec!["commit", "-m", message, "--"];
        args.extend(&paths);
        self.git_cmd(workspace, &args)?;
        let commit_id = self.git_cmd(workspace, &["rev-parse", "HEAD"])?;
        let short = commit_id.get(..8).unwrap_or(&commit_id).to_string();
        tracing::info!(commit = %commit_id, "GitAdapter: committed");

        Ok(CommitResult {
            commit_id: Some(commit_id),
            staged,
            message: format!("Committed as {}", short),
        })
    }

    fn name(&self) -> &str {
        "git"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;
    use std::process::Command;
    use tempfile::tempdir;

    fn init_git_repo(dir: &Path) {
        for args in [
            vec!["init"],
            vec!["config", "user.name", "Test User"],
            vec!["config", "user.email", "test@example.com"],
        ] {
            Command::new("git")
                .args(&args)
                .current_dir(dir)
                .output()
                .unwrap();
        }

        // Create initial commit
        std::fs::write(dir.join("README.md"), "# Test\n").unwrap();
        Command::new("git")
            .args(["add", "."])
            .current_dir(dir)
            .output()
            .unwrap();
        Command::new("git")
            .args(["commit", "-m", "Initial commit"])
            .current_dir(dir)
            .output()
            .unwrap();
    }

    fn adapter() -> GitAdapter {
        GitAdapter::new(CommandRunner::new(), GitConfig::default())
    }

    #[test]
    fn test_create_branch_without_remote_falls_back_to_head() {
        let dir = tempdir().unwrap();
        init_git_repo(dir.path());
        let ws = Workspace::new(dir.path());

        let result = adapter().create_branch(&ws, "agent/test-1234abcd").unwrap();
        assert!(result.created);
        assert_eq!(result.base, "HEAD");
        assert_eq!(
            adapter().current_branch(&ws).unwrap(),
            "agent/test-1234abcd"
        );
    }

    #[test]
    fn test_create_branch_reuses_existing_branch() {
        let dir = tempdir().unwrap();
        init_git_repo(dir.path());
        let ws = Workspace::new(dir.path());
        let git = adapter();

        git.create_branch(&ws, "agent/retry-1").unwrap();
        let again = git.create_branch(&ws, "agent/retry-1").unwrap();
        assert!(!again.created);
        assert_eq!(git.current_branch(&ws).unwrap(), "agent/retry-1");
    }

    #[test]
    fn test_commit_changes_commits_only_listed_files() {
        let dir = tempdir().unwrap();
        init_git_repo(dir.path());
        let ws = Workspace::new(dir.path());
        let git = adapter();
        git.create_branch(&ws, "agent/commit-1").unwrap();

        std::fs::write(dir.path().join("a.txt"), "a\n").unwrap();
        std::fs::write(dir.path().join("stray.txt"), "not part of the task\n").unwrap();

        let result = git
            .commit_changes(&ws, "Add a", &["a.txt".to_string()])
            .unwrap();
        let sha = result.commit_id.expect("commit should be created");
        assert_eq!(sha.len(), 40);

        let status = git
            .git_cmd(&ws, &["status", "--porcelain"])
            .unwrap();
        assert!(status.contains("?? stray.txt"));
        assert!(!status.contains("a.txt"));
    }

    #[test]
    fn test_commit_changes_with_nothing_staged_returns_null_sha() {
        let dir = tempdir().unwrap();
        init_git_repo(dir.path());
        let ws = Workspace::new(dir.path());
        let git = adapter();

        // README.md is unchanged since the initial commit.
        let result = git
            .commit_changes(&ws, "No-op", &["README.md".to_string()])
            .unwrap();
        assert!(result.commit_id.is_none());
    }

    #[test]
    fn test_commit_leaves_unrelated_staged_files_alone() {
        let dir = tempdir().unwrap();
        init_git_repo(dir.path());
        let ws = Workspace::new(dir.path());
        let git = adapter();

        std::fs::write(dir.path().join("unrelated.txt"), "mine\n").unwrap();
        git.git_cmd(&ws, &["add", "unrelated.txt"]).unwrap();
        std::fs::write(dir.path().join("a.txt"), "task\n").unwrap();

        let result = git
            .commit_changes(&ws, "Add a", &["a.txt".to_string()])
            .unwrap();
        assert!(result.commit_id.is_some());

        let committed = git
            .git_cmd(&ws, &["show", "--name-only", "--format=", "HEAD"])
            .unwrap();
        assert_eq!(committed, "a.txt");
        let still_staged = git
            .git_cmd(&ws, &["diff", "--cached", "--name-only"])
            .unwrap();
        assert_eq!(still_staged, "unrelated.txt");
    }

    #[test]
    fn test_only_unrelated_staged_files_means_no_commit() {
        let dir = tempdir().unwrap();
        init_git_repo(dir.path());
        let ws = Workspace::new(dir.path());
        let git = adapter();

        std::fs::write(dir.path().join("unrelated.txt"), "mine\n").unwrap();
        git.git_cmd(&ws, &["add", "unrelated.txt"]).unwrap();

        let result = git
            .commit_changes(&ws, "No-op", &["README.md".to_string()])
            .unwrap();
        assert!(result.commit_id.is_none());
        assert_eq!(git.git_cmd(&ws, &["rev-list", "--count", "HEAD"]).unwrap(), "1");
    }

    #[test]
    fn test_commit_changes_stages_deletions() {
        let dir = tempdir().unwrap();
        init_git_repo(dir.path());
        let ws = Workspace::new(dir.path());
        let git = adapter();

        std::fs::remove_file(dir.path().join("README.md")).unwrap();
        let result = git
            .commit_changes(&ws, "Remove readme", &["README.md".to_string()])
            .unwrap();
        assert!(result.commit_id.is_some());
        assert_eq!(result.staged, vec!["README.md".to_string()]);
    }

    #[test]
    fn test_unstageable_file_is_skipped_not_fatal() {
        let dir = tempdir().unwrap();
        init_git_repo(dir.path());
        let ws = Workspace::new(dir.path());
        let git = adapter();

        std::fs::write(dir.path().join("b.txt"), "b\n").unwrap();
        let result = git
            .commit_changes(
                &ws,
                "Add b",
                &["never-existed.txt".to_string(), "b.txt".to_string()],
            )
            .unwrap();
        assert_eq!(result.staged, vec!["b.txt".to_string()]);
        assert!(result.commit_id.is_some());
    }
}
