// executor.rs — Drive one task from payload to result.
//
// Steps, in order:
// 1. Derive the branch name and create it (failure aborts the task)
// 2. Create each files_to_create entry
// 3. Apply each files_to_modify entry
// 4. Delete each files_to_delete entry
// 5. Commit touched files as one commit (skipped when nothing was touched)
// 6. Run every commands_to_run entry, in order, even after a failure
// 7. Assemble the TaskResult
//
// Steps 2–4 and 6 never stop early: each failure is appended to the error
// list and the next item is attempted.

use std::time::Instant;

use ar_sandbox::CommandRunner;
use ar_submit::{adapter_for, branch_name, SubmitAdapter};
use ar_workspace::{FileDelta, MutationError, Workspace};
use chrono::Utc;

use crate::config::RunnerConfig;
use crate::error::TaskError;
use crate::payload::TaskPayload;
use crate::result::{TaskArtifacts, TaskResult};
use crate::run_log::RunLog;
use crate::state::TaskState;

/// Executes task payloads against one workspace.
pub struct TaskExecutor {
    workspace: Workspace,
    submit: Box<dyn SubmitAdapter>,
    runner: CommandRunner,
    branch_prefix: String,
    run_log: Option<RunLog>,
    state: TaskState,
}

/// Mutable tallies gathered while a task runs.
#[derive(Default)]
struct Progress {
    files_changed: Vec<String>,
    loc_added: usize,
    loc_removed: usize,
    errors: Vec<String>,
    commands_ok: bool,
}

impl Progress {
    fn record(&mut self, path: &str, delta: FileDelta) {
        if !self.files_changed.iter().any(|p| p == path) {
            self.files_changed.push(path.to_string());
        }
        self.loc_added += delta.lines_added;
        self.loc_removed += delta.lines_removed;
    }
}

impl TaskExecutor {
    pub fn new(
        workspace: Workspace,
        submit: Box<dyn SubmitAdapter>,
        runner: CommandRunner,
        branch_prefix: impl Into<String>,
    ) -> Self {
        Self {
            workspace,
            submit,
            runner,
            branch_prefix: branch_prefix.into(),
            run_log: None,
            state: TaskState::Init,
        }
    }

    /// Build an executor from the runner configuration.
    pub fn from_config(workspace: Workspace, config: &RunnerConfig) -> Result<Self, TaskError> {
        let runner = config.sandbox.runner();
        let submit = adapter_for(&config.submit, runner.clone())?;
        Ok(Self::new(
            workspace,
            submit,
            runner,
            config.submit.git.branch_prefix.clone(),
        ))
    }

    /// Attach a run log; its path is reported in `artifacts.log_path`.
    pub fn with_run_log(mut self, run_log: RunLog) -> Self {
        self.run_log = Some(run_log);
        self
    }

    pub fn state(&self) -> TaskState {
        self.state
    }

    /// Run the task. Always returns a result; failures are inside it.
    pub fn execute(&mut self, payload: &TaskPayload) -> TaskResult {
        let started_at = Utc::now();
        let clock = Instant::now();
        self.state = TaskState::Init;
        let branch = branch_name(&self.branch_prefix, &payload.task_key, &payload.task_id);

        tracing::info!(
            task_id = %payload.task_id,
            task_key = %payload.task_key,
            adapter = self.submit.name(),
            "starting task"
        );
        self.log(format!(
            "task {} ({}) starting on branch {}",
            payload.task_key, payload.task_id, branch
        ));

        // 1. Branch. The only step whose failure aborts the task.
        if let Err(e) = self.submit.create_branch(&self.workspace, &branch) {
            let message = format!("Failed to create branch {}: {}", branch, e);
            tracing::error!(branch = %branch, error = %e, "branch creation failed, aborting task");
            self.transition(TaskState::Failed);
            let progress = Progress::default();
            return self.finish(branch, None, progress, Some(message), started_at, clock);
        }
        self.transition(TaskState::BranchCreated);

        // 2–4. Files.
        let mut progress = Progress {
            commands_ok: true,
            ..Progress::default()
        };
        let spec = &payload.spec;

        for file in &spec.files_to_create {
            let outcome = self.workspace.create_file(&file.path, &file.content);
            self.settle_file("create", &file.path, outcome, &mut progress);
        }
        for file in &spec.files_to_modify {
            let outcome = self.workspace.modify_file(&file.path, &file.changes);
            self.settle_file("modify", &file.path, outcome, &mut progress);
        }
        for path in &spec.files_to_delete {
            let present = self.workspace.contains_file(path);
            let outcome = self.workspace.delete_file(path);
            if present || outcome.is_err() {
                self.settle_file("delete", path, outcome, &mut progress);
            } else {
                self.log(format!("delete {}: already absent", path));
            }
        }
        self.transition(TaskState::FilesProcessed);

        // 5. Commit.
        let mut commit_sha = None;
        if progress.files_changed.is_empty() {
            self.log("no files touched, skipping commit");
        } else {
            let message = commit_message(payload);
            match self
                .submit
                .commit_changes(&self.workspace, &message, &progress.files_changed)
            {
                Ok(commit) => {
                    self.log(format!(
                        "commit: {}",
                        commit.commit_id.as_deref().unwrap_or("nothing to commit")
                    ));
                    commit_sha = commit.commit_id;
                }
                Err(e) => {
                    tracing::warn!(error = %e, "commit failed");
                    let message = format!("Commit failed: {}", e);
                    self.log(&message);
                    progress.errors.push(message);
                }
            }
        }
        self.transition(TaskState::Committed);

        // 6. Commands.
        for command in &spec.commands_to_run {
            self.log(format!("running: {}", command));
            let outcome = self.runner.run(command, self.workspace.root(), None);
            match outcome.error() {
                None => {
                    tracing::info!(command = %command, duration_ms = outcome.duration_ms, "command passed");
                    self.log(format!("passed in {}ms: {}", outcome.duration_ms, command));
                }
                Some(err) => {
                    tracing::warn!(command = %command, error = %err, "command failed");
                    self.log(err.to_string());
                    progress.commands_ok = false;
                    progress.errors.push(err.to_string());
                }
            }
        }
        self.transition(TaskState::CommandsRun);

        let error = if progress.errors.is_empty() {
            None
        } else {
            Some(progress.errors.join("; "))
        };
        self.finish(branch, commit_sha, progress, error, started_at, clock)
    }

    fn settle_file(
        &mut self,
        op: &str,
        path: &str,
        outcome: Result<FileDelta, MutationError>,
        progress: &mut Progress,
    ) {
        match outcome {
            Ok(delta) => {
                self.log(format!(
                    "{} {}: +{} -{}",
                    op, path, delta.lines_added, delta.lines_removed
                ));
                progress.record(path, delta);
            }
            Err(e) => {
                tracing::warn!(op, path, error = %e, "file operation failed");
                let message = format!("Failed to {} {}: {}", op, path, e);
                self.log(&message);
                progress.errors.push(message);
            }
        }
    }

    fn finish(
        &mut self,
        branch: String,
        commit_sha: Option<String>,
        progress: Progress,
        error: Option<String>,
        started_at: chrono::DateTime<Utc>,
        clock: Instant,
    ) -> TaskResult {
        let success = error.is_none();
        let summary = match &error {
            None => {
                let net = progress.loc_added as i64 - progress.loc_removed as i64;
                format!(
                    "Changed {} file(s), net {:+} lines (+{} -{})",
                    progress.files_changed.len(),
                    net,
                    progress.loc_added,
                    progress.loc_removed
                )
            }
            Some(error) => error.clone(),
        };
        if success {
            self.transition(TaskState::Done);
        } else if self.state != TaskState::Failed {
            self.transition(TaskState::Failed);
        }
        self.log(format!("finished: {}", summary));

        let completed_at = Utc::now();
        let result = TaskResult {
            success,
            branch,
            commit_sha,
            tests_passed: progress.commands_ok,
            summary,
            loc_changed: progress.loc_added + progress.loc_removed,
            loc_added: progress.loc_added,
            loc_removed: progress.loc_removed,
            files_changed: progress.files_changed,
            artifacts: TaskArtifacts {
                log_path: self
                    .run_log
                    .as_ref()
                    .map(|log| log.path().display().to_string()),
                pr_url: None,
                error,
            },
            started_at,
            completed_at,
            duration_ms: u64::try_from(clock.elapsed().as_millis()).unwrap_or(u64::MAX),
        };
        tracing::info!(
            success = result.success,
            files = result.files_changed.len(),
            duration_ms = result.duration_ms,
            "task finished"
        );
        result
    }

    fn transition(&mut self, next: TaskState) {
        if !self.state.can_transition_to(next) {
            tracing::warn!(from = %self.state, to = %next, "unexpected state transition");
        }
        tracing::debug!(from = %self.state, to = %next, "state transition");
        self.log(format!("state: {} -> {}", self.state, next));
        self.state = next;
    }

    fn log(&mut self, message: impl AsRef<str>) {
        if let Some(run_log) = self.run_log.as_mut() {
            run_log.line(message);
        }
    }
}

/// Commit message: task name, description, and a Task-ID trailer.
pub fn commit_message(payload: &TaskPayload) -> String {
    let description = payload.spec.description.trim();
    if description.is_empty() {
        format!("{}\n\nTask-ID: {}", payload.task_name, payload.task_id)
    } else {
        format!(
            "{}\n\n{}\n\nTask-ID: {}",
            payload.task_name, description, payload.task_id
        )
    }
}
