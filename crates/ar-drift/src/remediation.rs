// remediation.rs — Turn drift records into prioritized task stubs.
//
// Pure mapping, one stub per actionable record:
//
//   missing_in_n8n        → deploy-workflow-<slug>         priority 60
//   content_mismatch      → sync-workflow-<slug>           priority 70
//   not_applied           → apply-migration-<slug>         priority 80
//   modified_after_apply  → investigate-migration-<slug>   priority 90
//
// missing_in_repo and missing_file need a human decision and produce no stub.
// Keys depend only on the artifact name, so the queue de-duplicates repeated
// runs against the same unresolved drift.

use std::io::Write;

use crate::error::DriftError;
use crate::report::{MigrationDrift, MigrationDriftKind, TaskCreated, WorkflowDrift, WorkflowDriftKind};

/// Queue table targeted by the enqueue statement.
pub const QUEUE_TABLE: &str = "agent_tasks";

/// Lower-case the name and turn whitespace runs into single hyphens.
pub fn task_slug(name: &str) -> String {
    name.split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join("-")
}

pub fn generate_tasks(workflows: &[WorkflowDrift], migrations: &[MigrationDrift]) -> Vec<TaskCreated> {
    let mut tasks = Vec::new();

    for w in workflows {
        let (verb, priority, action) = match w.kind {
            WorkflowDriftKind::MissingInN8n => ("deploy", 60, "Deploy"),
            WorkflowDriftKind::ContentMismatch => ("sync", 70, "Sync"),
            WorkflowDriftKind::Synced | WorkflowDriftKind::MissingInRepo => continue,
        };
        tasks.push(TaskCreated {
            task_key: format!("{}-workflow-{}", verb, task_slug(&w.name)),
            task_name: format!("{} workflow: {}", action, w.name),
            priority,
            description: describe(&w.name, w.file.as_deref(), &w.fingerprint, &w.detail),
        });
    }

    for m in migrations {
        let (verb, priority, action) = match m.kind {
            MigrationDriftKind::NotApplied => ("apply", 80, "Apply"),
            MigrationDriftKind::ModifiedAfterApply => ("investigate", 90, "Investigate"),
            MigrationDriftKind::Applied | MigrationDriftKind::MissingFile => continue,
        };
        tasks.push(TaskCreated {
            task_key: format!("{}-migration-{}", verb, task_slug(&m.name)),
            task_name: format!("{} migration: {}", action, m.name),
            priority,
            description: describe(&m.name, m.file.as_deref(), &m.fingerprint, &m.detail),
        });
    }

    tasks
}

fn describe(name: &str, file: Option<&str>, fingerprint: &str, detail: &str) -> String {
    match file {
        Some(file) => format!("{} ({}, fingerprint {}): {}", name, file, fingerprint, detail),
        None => format!("{} (fingerprint {}): {}", name, fingerprint, detail),
    }
}

// ── Sinks ──

/// Destination for remediation stubs.
pub trait TaskSink {
    fn submit(&mut self, task: &TaskCreated) -> Result<(), DriftError>;

    fn name(&self) -> &str;
}

/// Submit every task in order, stopping at the first sink failure.
pub fn submit_all(sink: &mut dyn TaskSink, tasks: &[TaskCreated]) -> Result<usize, DriftError> {
    for task in tasks {
        sink.submit(task)?;
    }
    tracing::info!(sink = sink.name(), count = tasks.len(), "remediation tasks submitted");
    Ok(tasks.len())
}

/// Dry-run sink: logs each stub and submits nothing.
#[derive(Debug, Default)]
pub struct DryRunSink {
    logged: usize,
}

impl DryRunSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn logged(&self) -> usize {
        self.logged
    }
}

impl TaskSink for DryRunSink {
    fn submit(&mut self, task: &TaskCreated) -> Result<(), DriftError> {
        tracing::info!(
            task_key = %task.task_key,
            priority = task.priority,
            "dry run: would enqueue remediation task"
        );
        self.logged += 1;
        Ok(())
    }

    fn name(&self) -> &str {
        "dry-run"
    }
}

/// Writes the equivalent enqueue statement for each stub.
///
/// There is no queue client yet; an operator or a follow-up job runs the
/// printed SQL. `ON CONFLICT` keeps reruns idempotent.
pub struct StatementSink<W: Write> {
    out: W,
}

impl<W: Write> StatementSink<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> TaskSink for StatementSink<W> {
    fn submit(&mut self, task: &TaskCreated) -> Result<(), DriftError> {
        writeln!(self.out, "{}", enqueue_statement(task)).map_err(|e| DriftError::SinkFailed {
            task_key: task.task_key.clone(),
            message: e.to_string(),
        })
    }

    fn name(&self) -> &str {
        "statement"
    }
}

pub fn enqueue_statement(task: &TaskCreated) -> String {
    format!(
        "INSERT INTO {} (task_key, task_name, priority, description, status) \
         VALUES ({}, {}, {}, {}, 'pending') ON CONFLICT (task_key) DO NOTHING;",
        QUEUE_TABLE,
        sql_quote(&task.task_key),
        sql_quote(&task.task_name),
        task.priority,
        sql_quote(&task.description),
    )
}

fn sql_quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}
