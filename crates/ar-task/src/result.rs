// result.rs — The single output artifact of one executor invocation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Outcome of one task run, written as JSON to stdout.
///
/// Persistence is the caller's job; the executor only builds it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TaskResult {
    pub success: bool,

    /// The branch created (or re-entered) for this task.
    pub branch: String,

    /// Null when nothing changed.
    pub commit_sha: Option<String>,

    /// True when every command in `commands_to_run` exited zero.
    pub tests_passed: bool,

    pub summary: String,

    /// Paths successfully touched, in processing order, without duplicates.
    pub files_changed: Vec<String>,

    pub loc_added: usize,
    pub loc_removed: usize,
    pub loc_changed: usize,

    #[serde(default)]
    pub artifacts: TaskArtifacts,

    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
    pub duration_ms: u64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct TaskArtifacts {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_path: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pr_url: Option<String>,

    /// Every accumulated error, joined.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl TaskResult {
    /// Process exit code for this result: 0 on success, 1 otherwise.
    pub fn exit_code(&self) -> i32 {
        if self.success {
            0
        } else {
            1
        }
    }
}
