// state.rs — Executor lifecycle.
//
// The executor moves strictly forward, with no retries inside one run:
//   Init → BranchCreated → FilesProcessed → Committed → CommandsRun → Done
//   (or Failed from any state)

use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TaskState {
    Init,
    BranchCreated,
    FilesProcessed,
    /// Reached even when there was nothing to commit.
    Committed,
    CommandsRun,
    Done,
    Failed,
}

impl fmt::Display for TaskState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaskState::Init => write!(f, "init"),
            TaskState::BranchCreated => write!(f, "branch_created"),
            TaskState::FilesProcessed => write!(f, "files_processed"),
            TaskState::Committed => write!(f, "committed"),
            TaskState::CommandsRun => write!(f, "commands_run"),
            TaskState::Done => write!(f, "done"),
            TaskState::Failed => write!(f, "failed"),
        }
    }
}

impl TaskState {
    /// Check whether moving from this state to `next` is valid.
    pub fn can_transition_to(&self, next: TaskState) -> bool {
        if next == TaskState::Failed {
            return !matches!(self, TaskState::Done | TaskState::Failed);
        }

        matches!(
            (self, next),
            (TaskState::Init, TaskState::BranchCreated)
                | (TaskState::BranchCreated, TaskState::FilesProcessed)
                | (TaskState::FilesProcessed, TaskState::Committed)
                | (TaskState::Committed, TaskState::CommandsRun)
                | (TaskState::CommandsRun, TaskState::Done)
        )
    }
}
