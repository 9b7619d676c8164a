// report.rs — The drift report: per-artifact records, remediation stubs, counts.

use std::fmt::Write as _;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ── Drift records ──

/// How a workflow definition compares to the deployed workflow of the same name.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowDriftKind {
    Synced,
    /// Declared in the repository, absent from the automation platform.
    #[serde(rename = "missing_in_n8n")]
    MissingInN8n,
    /// Deployed, but no definition file declares it.
    MissingInRepo,
    ContentMismatch,
}

/// How a migration file compares to the applied-migration history.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum MigrationDriftKind {
    Applied,
    NotApplied,
    /// Applied, but the file has changed since.
    ModifiedAfterApply,
    /// Recorded as applied, but the file is gone.
    MissingFile,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct WorkflowDrift {
    pub name: String,
    #[serde(rename = "status")]
    pub kind: WorkflowDriftKind,
    /// Fingerprint of the local file, or of the deployed side when there is no file.
    pub fingerprint: String,
    /// Repository-relative file, when one exists.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
    pub detail: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MigrationDrift {
    pub name: String,
    #[serde(rename = "status")]
    pub kind: MigrationDriftKind,
    pub fingerprint: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
    pub detail: String,
}

impl WorkflowDrift {
    pub fn is_drift(&self) -> bool {
        self.kind != WorkflowDriftKind::Synced
    }
}

impl MigrationDrift {
    pub fn is_drift(&self) -> bool {
        self.kind != MigrationDriftKind::Applied
    }
}

/// A remediation stub. Not a full task payload: the queue fills in the spec.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TaskCreated {
    /// Deterministic per artifact, so repeated runs de-duplicate in the queue.
    pub task_key: String,
    pub task_name: String,
    /// Higher is more urgent.
    pub priority: i64,
    pub description: String,
}

// ── Report ──

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct DriftSummary {
    pub workflows_total: usize,
    pub workflows_synced: usize,
    pub workflows_drifted: usize,
    pub migrations_total: usize,
    pub migrations_applied: usize,
    /// Migrations not yet applied.
    pub migrations_pending: usize,
    /// Migrations modified after apply, or applied with no file left.
    pub migrations_drifted: usize,
    pub tasks_created: usize,
}

impl DriftSummary {
    pub fn tally(
        workflows: &[WorkflowDrift],
        migrations: &[MigrationDrift],
        tasks: &[TaskCreated],
    ) -> Self {
        let count_mig = |kind: MigrationDriftKind| migrations.iter().filter(|m| m.kind == kind).count();
        let workflows_synced = workflows.iter().filter(|w| !w.is_drift()).count();
        Self {
            workflows_total: workflows.len(),
            workflows_synced,
            workflows_drifted: workflows.len() - workflows_synced,
            migrations_total: migrations.len(),
            migrations_applied: count_mig(MigrationDriftKind::Applied),
            migrations_pending: count_mig(MigrationDriftKind::NotApplied),
            migrations_drifted: count_mig(MigrationDriftKind::ModifiedAfterApply)
                + count_mig(MigrationDriftKind::MissingFile),
            tasks_created: tasks.len(),
        }
    }

    /// True when anything needs attention.
    pub fn needs_attention(&self) -> bool {
        self.workflows_drifted > 0 || self.migrations_pending > 0 || self.migrations_drifted > 0
    }
}

/// Output of one detector run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DriftReport {
    pub timestamp: DateTime<Utc>,
    pub dry_run: bool,
    pub workflows: Vec<WorkflowDrift>,
    pub migrations: Vec<MigrationDrift>,
    pub tasks_created: Vec<TaskCreated>,
    pub summary: DriftSummary,
}

impl DriftReport {
    pub fn new(
        dry_run: bool,
        workflows: Vec<WorkflowDrift>,
        migrations: Vec<MigrationDrift>,
        tasks_created: Vec<TaskCreated>,
    ) -> Self {
        let summary = DriftSummary::tally(&workflows, &migrations, &tasks_created);
        Self {
            timestamp: Utc::now(),
            dry_run,
            workflows,
            migrations,
            tasks_created,
            summary,
        }
    }

    /// 0 when clean, 1 when any drift or pending migration was found.
    pub fn exit_code(&self) -> i32 {
        if self.summary.needs_attention() {
            1
        } else {
            0
        }
    }

    /// Plain-text summary for stdout.
    pub fn render_summary(&self) -> String {
        let s = &self.summary;
        let mut out = String::new();
        let mode = if self.dry_run { " (dry run)" } else { "" };
        let _ = writeln!(out, "Drift report {}{}", self.timestamp.to_rfc3339(), mode);
        let _ = writeln!(
            out,
            "  workflows:  {} total, {} synced, {} drifted",
            s.workflows_total, s.workflows_synced, s.workflows_drifted
        );
        let _ = writeln!(
            out,
            "  migrations: {} total, {} applied, {} pending, {} drifted",
            s.migrations_total, s.migrations_applied, s.migrations_pending, s.migrations_drifted
        );
        for w in self.workflows.iter().filter(|w| w.is_drift()) {
            let _ = writeln!(out, "  [workflow]  {}: {}", w.name, w.detail);
        }
        for m in self.migrations.iter().filter(|m| m.is_drift()) {
            let _ = writeln!(out, "  [migration] {}: {}", m.name, m.detail);
        }
        let _ = writeln!(out, "  remediation tasks: {}", s.tasks_created);
        for t in &self.tasks_created {
            let _ = writeln!(out, "    - {} (priority {})", t.task_key, t.priority);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn workflow(name: &str, kind: WorkflowDriftKind) -> WorkflowDrift {
        WorkflowDrift {
            name: name.to_string(),
            kind,
            fingerprint: "abcd".to_string(),
            file: None,
            detail: String::new(),
        }
    }

    fn migration(name: &str, kind: MigrationDriftKind) -> MigrationDrift {
        MigrationDrift {
            name: name.to_string(),
            kind,
            fingerprint: "abcd".to_string(),
            file: None,
            detail: String::new(),
        }
    }

    #[test]
    fn kinds_serialize_as_snake_case_status() {
        let json = serde_json::to_value(workflow("w", WorkflowDriftKind::MissingInN8n)).unwrap();
        assert_eq!(json["status"], "missing_in_n8n");
        let json = serde_json::to_value(migration("m", MigrationDriftKind::ModifiedAfterApply)).unwrap();
        assert_eq!(json["status"], "modified_after_apply");
        assert!(json.get("file").is_none());
    }

    #[test]
    fn summary_counts_each_bucket() {
        let report = DriftReport::new(
            true,
            vec![
                workflow("a", WorkflowDriftKind::Synced),
                workflow("b", WorkflowDriftKind::ContentMismatch),
                workflow("c", WorkflowDriftKind::MissingInRepo),
            ],
            vec![
                migration("1", MigrationDriftKind::Applied),
                migration("2", MigrationDriftKind::NotApplied),
                migration("3", MigrationDriftKind::ModifiedAfterApply),
                migration("4", MigrationDriftKind::MissingFile),
            ],
            vec![],
        );
        assert_eq!(
            report.summary,
            DriftSummary {
                workflows_total: 3,
                workflows_synced: 1,
                workflows_drifted: 2,
                migrations_total: 4,
                migrations_applied: 1,
                migrations_pending: 1,
                migrations_drifted: 2,
                tasks_created: 0,
            }
        );
        assert_eq!(report.exit_code(), 1);
    }

    #[test]
    fn clean_report_exits_zero() {
        let report = DriftReport::new(
            false,
            vec![workflow("a", WorkflowDriftKind::Synced)],
            vec![migration("1", MigrationDriftKind::Applied)],
            vec![],
        );
        assert_eq!(report.exit_code(), 0);
        assert!(report.render_summary().contains("1 total, 1 synced, 0 drifted"));
    }

    #[test]
    fn pending_migration_alone_needs_attention() {
        let report = DriftReport::new(
            false,
            vec![],
            vec![migration("1", MigrationDriftKind::NotApplied)],
            vec![],
        );
        assert_eq!(report.exit_code(), 1);
    }
}
