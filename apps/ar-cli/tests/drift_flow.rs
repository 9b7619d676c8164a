// drift_flow.rs — End-to-end reconciliation runs over a scratch repository.

use std::fs;
use std::path::Path;

use ar_cli::commands::drift::{execute, execute_with, DriftArgs};
use ar_drift::{DeployedState, DriftReport, MigrationDriftKind, WorkflowDriftKind};
use tempfile::TempDir;

fn write(root: &Path, rel: &str, content: &str) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

/// A fresh environment: nothing deployed, no migration history.
struct NothingDeployed;

impl DeployedState for NothingDeployed {
    fn deployed_workflow(&self, _name: &str) -> Option<String> {
        None
    }

    fn deployed_workflow_names(&self) -> Vec<String> {
        Vec::new()
    }

    fn applied_migration(&self, _name: &str) -> Option<String> {
        None
    }

    fn applied_migration_names(&self) -> Vec<String> {
        Vec::new()
    }
}

#[test]
fn three_migrations_and_no_workflows_are_clean() {
    let dir = TempDir::new().unwrap();
    fs::create_dir_all(dir.path().join("n8n/workflows")).unwrap();
    write(dir.path(), "supabase/migrations/20240101000000_init.sql", "create table a();\n");
    write(dir.path(), "supabase/migrations/20240102000000_users.sql", "create table b();\n");
    write(dir.path(), "supabase/migrations/20240103000000_jobs.sql", "create table c();\n");

    let mut out = Vec::new();
    let outcome = execute(&DriftArgs::for_root(dir.path(), true), &mut out).unwrap();

    assert_eq!(outcome.exit_code(), 0);
    assert_eq!(outcome.report.summary.migrations_total, 3);
    assert_eq!(outcome.report.summary.migrations_pending, 0);
    assert!(outcome.report.tasks_created.is_empty());

    let saved: DriftReport =
        serde_json::from_str(&fs::read_to_string(&outcome.report_path).unwrap()).unwrap();
    assert!(saved.dry_run);
    assert_eq!(saved.migrations.len(), 3);
    assert!(saved.migrations.iter().all(|m| m.fingerprint.len() == 16));

    let text = String::from_utf8(out).unwrap();
    assert!(text.contains("3 total, 3 applied, 0 pending, 0 drifted"));
}

#[test]
fn config_redirects_directories_and_report() {
    let dir = TempDir::new().unwrap();
    write(
        dir.path(),
        ".runner/runner.toml",
        "[drift]\nworkflows_dir = \"flows\"\nreports_dir = \"out/reports\"\nfingerprint_len = 8\n",
    );
    write(dir.path(), "flows/intake.json", r#"{"name": "Lead Intake"}"#);

    let mut out = Vec::new();
    let outcome = execute(&DriftArgs::for_root(dir.path(), false), &mut out).unwrap();

    assert_eq!(outcome.exit_code(), 0);
    assert_eq!(outcome.report.workflows[0].name, "Lead Intake");
    assert_eq!(outcome.report.workflows[0].fingerprint.len(), 8);
    assert!(outcome
        .report_path
        .starts_with(dir.path().canonicalize().unwrap().join("out/reports")));
    // Nothing to remediate, so no enqueue statements follow the summary.
    assert!(!String::from_utf8(out).unwrap().contains("INSERT INTO"));
}

#[test]
fn artifact_directories_are_left_untouched() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "n8n/workflows/a.json", "{}");
    write(dir.path(), "supabase/migrations/001.sql", "select 1;");

    let mut out = Vec::new();
    execute(&DriftArgs::for_root(dir.path(), true), &mut out).unwrap();

    assert_eq!(fs::read_to_string(dir.path().join("n8n/workflows/a.json")).unwrap(), "{}");
    assert_eq!(fs::read_dir(dir.path().join("n8n/workflows")).unwrap().count(), 1);
    assert_eq!(fs::read_dir(dir.path().join("supabase/migrations")).unwrap().count(), 1);
}

#[test]
fn live_run_prints_enqueue_statements_after_the_summary() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "n8n/workflows/intake.json", r#"{"name": "Lead Intake"}"#);
    write(dir.path(), "supabase/migrations/20240101000000_init.sql", "create table a();\n");

    let mut out = Vec::new();
    let outcome = execute_with(
        &DriftArgs::for_root(dir.path(), false),
        Some(&NothingDeployed),
        &mut out,
    )
    .unwrap();

    assert_eq!(outcome.exit_code(), 1);
    assert!(!outcome.report.dry_run);
    assert_eq!(outcome.report.workflows[0].kind, WorkflowDriftKind::MissingInN8n);
    assert_eq!(outcome.report.migrations[0].kind, MigrationDriftKind::NotApplied);
    assert_eq!(outcome.report.tasks_created.len(), 2);

    let text = String::from_utf8(out).unwrap();
    let statements: Vec<&str> = text
        .lines()
        .filter(|l| l.starts_with("INSERT INTO agent_tasks"))
        .collect();
    assert_eq!(statements.len(), 2);
    assert!(statements
        .iter()
        .all(|l| l.ends_with("ON CONFLICT (task_key) DO NOTHING;")));
    let summary_end = text.find("remediation tasks: 2").unwrap();
    assert!(summary_end < text.find("INSERT INTO").unwrap());

    let saved: DriftReport =
        serde_json::from_str(&fs::read_to_string(&outcome.report_path).unwrap()).unwrap();
    assert!(!saved.dry_run);
    assert_eq!(saved.tasks_created.len(), 2);
}
