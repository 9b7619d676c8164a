// drift.rs — One reconciliation cycle: scan, classify, report, remediate.
//
// Remediation stubs go to the dry-run sink (logged only) with --dry-run, and
// otherwise to the statement sink, which prints the enqueue SQL after the
// summary.

use std::io::Write;
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;

use ar_drift::{
    submit_all, write_report, DeployedState, DriftConfig, DriftDetector, DriftReport, DryRunSink,
    StatementSink,
};
use ar_task::CONFIG_RELATIVE_PATH;

/// Exit code for a run that could not complete.
pub const FAILURE_EXIT_CODE: u8 = 2;

/// Compare declared workflows and migrations with deployed state.
#[derive(Parser, Debug, Clone)]
#[command(name = "ar-drift", version, about)]
pub struct DriftArgs {
    /// Log remediation tasks instead of emitting enqueue statements.
    #[arg(long)]
    pub dry_run: bool,

    /// Repository root holding the artifact directories.
    #[arg(long, default_value = ".")]
    pub root: PathBuf,

    /// Config file (defaults to <root>/.runner/runner.toml).
    #[arg(long)]
    pub config: Option<PathBuf>,
}

impl DriftArgs {
    pub fn for_root(root: impl Into<PathBuf>, dry_run: bool) -> Self {
        Self {
            dry_run,
            root: root.into(),
            config: None,
        }
    }
}

#[derive(Debug)]
pub struct DriftOutcome {
    pub report: DriftReport,
    pub report_path: PathBuf,
}

impl DriftOutcome {
    /// 0 when clean, 1 when drift or pending migrations were found.
    pub fn exit_code(&self) -> u8 {
        u8::try_from(self.report.exit_code()).unwrap_or(FAILURE_EXIT_CODE)
    }
}

/// Run against the deployed-state backend selected by config.
pub fn execute(args: &DriftArgs, out: &mut dyn Write) -> anyhow::Result<DriftOutcome> {
    execute_with(args, None, out)
}

/// Run against `deployed` when given, otherwise the configured backend.
pub fn execute_with(
    args: &DriftArgs,
    deployed: Option<&dyn DeployedState>,
    out: &mut dyn Write,
) -> anyhow::Result<DriftOutcome> {
    let root = args
        .root
        .canonicalize()
        .with_context(|| format!("repository root {} not found", args.root.display()))?;
    let config_path = args
        .config
        .clone()
        .unwrap_or_else(|| root.join(CONFIG_RELATIVE_PATH));
    let config = DriftConfig::load_or_default(&config_path)
        .with_context(|| format!("failed to load {}", config_path.display()))?;

    let detector = DriftDetector::new(&root, config);
    let report = match deployed {
        Some(deployed) => {
            let scan = detector.scan().context("drift detection failed")?;
            detector.report(&scan, deployed, args.dry_run)
        }
        None => detector.run(args.dry_run).context("drift detection failed")?,
    };
    let report_path = write_report(&report, &root.join(&detector.config().reports_dir))?;

    write!(out, "{}", report.render_summary())?;
    writeln!(out, "  report: {}", report_path.display())?;

    if args.dry_run {
        submit_all(&mut DryRunSink::new(), &report.tasks_created)?;
    } else {
        let mut sink = StatementSink::new(&mut *out);
        submit_all(&mut sink, &report.tasks_created)?;
    }
    out.flush()?;

    Ok(DriftOutcome {
        report,
        report_path,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn empty_repository_is_clean() {
        let dir = tempdir().unwrap();
        let mut out = Vec::new();
        let outcome = execute(&DriftArgs::for_root(dir.path(), true), &mut out).unwrap();
        assert_eq!(outcome.exit_code(), 0);
        assert!(outcome.report_path.starts_with(dir.path().canonicalize().unwrap().join("logs")));
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("(dry run)"));
        assert!(text.contains("remediation tasks: 0"));
    }

    #[test]
    fn exit_code_follows_the_report() {
        let dir = tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("supabase/migrations")).unwrap();
        std::fs::write(dir.path().join("supabase/migrations/001.sql"), "select 1;").unwrap();
        let mut out = Vec::new();
        let outcome = execute(&DriftArgs::for_root(dir.path(), true), &mut out).unwrap();
        assert_eq!(i32::from(outcome.exit_code()), outcome.report.exit_code());
    }

    #[test]
    fn unreadable_config_fails_the_run() {
        let dir = tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join(".runner")).unwrap();
        std::fs::write(dir.path().join(".runner/runner.toml"), "[drift\n").unwrap();
        let mut out = Vec::new();
        assert!(execute(&DriftArgs::for_root(dir.path(), false), &mut out).is_err());
    }
}
