// detector.rs — Scan declared artifacts and classify them against deployed state.
//
// Two independent scans:
// - workflow definitions: `*.json`, named by their JSON `name` field, else file stem
// - migrations: `*.sql`, named by file stem, in lexicographic order
//
// A missing directory is an empty scan. Nothing under the root is ever written
// except the report in `reports_dir`.

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::config::DriftConfig;
use crate::deployed::{deployed_state_for, DeployedState};
use crate::error::DriftError;
use crate::hasher::fingerprint;
use crate::remediation::generate_tasks;
use crate::report::{
    DriftReport, MigrationDrift, MigrationDriftKind, WorkflowDrift, WorkflowDriftKind,
};

/// One declared artifact found on disk.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LocalArtifact {
    pub name: String,
    /// Path relative to the repository root.
    pub file: String,
    pub fingerprint: String,
}

/// Everything the local side declares.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct LocalScan {
    pub workflows: Vec<LocalArtifact>,
    pub migrations: Vec<LocalArtifact>,
}

pub struct DriftDetector {
    root: PathBuf,
    config: DriftConfig,
}

impl DriftDetector {
    pub fn new(root: impl Into<PathBuf>, config: DriftConfig) -> Self {
        Self {
            root: root.into(),
            config,
        }
    }

    pub fn config(&self) -> &DriftConfig {
        &self.config
    }

    /// Hash every declared artifact under the root.
    pub fn scan(&self) -> Result<LocalScan, DriftError> {
        let mut workflows = list_files(&self.root.join(&self.config.workflows_dir), "json")?
            .into_iter()
            .map(|path| {
                let data = read(&path)?;
                let name = workflow_name(&data).unwrap_or_else(|| file_stem(&path));
                Ok(self.artifact(name, &path, &data))
            })
            .collect::<Result<Vec<_>, DriftError>>()?;
        disambiguate_names(&mut workflows);

        let migrations = list_files(&self.root.join(&self.config.migrations_dir), "sql")?
            .into_iter()
            .map(|path| {
                let data = read(&path)?;
                Ok(self.artifact(file_stem(&path), &path, &data))
            })
            .collect::<Result<Vec<_>, DriftError>>()?;

        tracing::info!(
            workflows = workflows.len(),
            migrations = migrations.len(),
            "scanned declared artifacts"
        );
        Ok(LocalScan {
            workflows,
            migrations,
        })
    }

    /// Full run against the configured deployed-state backend.
    pub fn run(&self, dry_run: bool) -> Result<DriftReport, DriftError> {
        let scan = self.scan()?;
        let deployed = deployed_state_for(&self.config.deployed, &scan);
        Ok(self.report(&scan, deployed.as_ref(), dry_run))
    }

    /// Classify a scan and build the report, remediation stubs included.
    pub fn report(&self, scan: &LocalScan, deployed: &dyn DeployedState, dry_run: bool) -> DriftReport {
        let workflows = classify_workflows(scan, deployed);
        let migrations = classify_migrations(scan, deployed);
        let tasks = generate_tasks(&workflows, &migrations);
        DriftReport::new(dry_run, workflows, migrations, tasks)
    }

    fn artifact(&self, name: String, path: &Path, data: &[u8]) -> LocalArtifact {
        LocalArtifact {
            name,
            file: path
                .strip_prefix(&self.root)
                .unwrap_or(path)
                .display()
                .to_string(),
            fingerprint: fingerprint(data, self.config.fingerprint_len),
        }
    }
}

pub fn classify_workflows(scan: &LocalScan, deployed: &dyn DeployedState) -> Vec<WorkflowDrift> {
    let mut out = Vec::with_capacity(scan.workflows.len());
    let mut declared = BTreeSet::new();

    for local in &scan.workflows {
        declared.insert(local.name.as_str());
        let (kind, detail) = match deployed.deployed_workflow(&local.name) {
            None => (
                WorkflowDriftKind::MissingInN8n,
                "not deployed to the automation platform".to_string(),
            ),
            Some(remote) if remote == local.fingerprint => {
                (WorkflowDriftKind::Synced, "matches deployed workflow".to_string())
            }
            Some(remote) => (
                WorkflowDriftKind::ContentMismatch,
                format!("deployed fingerprint {} differs from repository", remote),
            ),
        };
        out.push(WorkflowDrift {
            name: local.name.clone(),
            kind,
            fingerprint: local.fingerprint.clone(),
            file: Some(local.file.clone()),
            detail,
        });
    }

    for name in deployed.deployed_workflow_names() {
        if declared.contains(name.as_str()) {
            continue;
        }
        out.push(WorkflowDrift {
            fingerprint: deployed.deployed_workflow(&name).unwrap_or_default(),
            name,
            kind: WorkflowDriftKind::MissingInRepo,
            file: None,
            detail: "deployed but not declared in the repository".to_string(),
        });
    }

    let drifted = out.iter().filter(|w| w.is_drift()).count();
    if drifted > 0 {
        tracing::warn!(drifted, "workflow drift detected");
    }
    out
}

pub fn classify_migrations(scan: &LocalScan, deployed: &dyn DeployedState) -> Vec<MigrationDrift> {
    let mut out = Vec::with_capacity(scan.migrations.len());
    let mut declared = BTreeSet::new();

    for local in &scan.migrations {
        declared.insert(local.name.as_str());
        let (kind, detail) = match deployed.applied_migration(&local.name) {
            None => (
                MigrationDriftKind::NotApplied,
                "not in the applied-migration history".to_string(),
            ),
            Some(applied) if applied == local.fingerprint => {
                (MigrationDriftKind::Applied, "applied".to_string())
            }
            Some(applied) => (
                MigrationDriftKind::ModifiedAfterApply,
                format!("file changed after apply (applied fingerprint {})", applied),
            ),
        };
        out.push(MigrationDrift {
            name: local.name.clone(),
            kind,
            fingerprint: local.fingerprint.clone(),
            file: Some(local.file.clone()),
            detail,
        });
    }

    for name in deployed.applied_migration_names() {
        if declared.contains(name.as_str()) {
            continue;
        }
        out.push(MigrationDrift {
            fingerprint: deployed.applied_migration(&name).unwrap_or_default(),
            name,
            kind: MigrationDriftKind::MissingFile,
            file: None,
            detail: "recorded as applied but the file is missing".to_string(),
        });
    }
    out
}

/// Write the report as pretty JSON to `<reports_dir>/drift-report-<timestamp>.json`.
pub fn write_report(report: &DriftReport, reports_dir: &Path) -> Result<PathBuf, DriftError> {
    fs::create_dir_all(reports_dir).map_err(|source| DriftError::ReportWriteFailed {
        path: reports_dir.to_path_buf(),
        source,
    })?;
    let path = reports_dir.join(format!(
        "drift-report-{}.json",
        report.timestamp.format("%Y%m%dT%H%M%S")
    ));
    let json = serde_json::to_string_pretty(report)?;
    fs::write(&path, json).map_err(|source| DriftError::ReportWriteFailed {
        path: path.clone(),
        source,
    })?;
    tracing::info!(path = %path.display(), "drift report written");
    Ok(path)
}

fn list_files(dir: &Path, extension: &str) -> Result<Vec<PathBuf>, DriftError> {
    if !dir.is_dir() {
        tracing::debug!(dir = %dir.display(), "artifact directory missing, nothing to scan");
        return Ok(Vec::new());
    }
    let entries = fs::read_dir(dir).map_err(|source| DriftError::ScanFailed {
        path: dir.to_path_buf(),
        source,
    })?;

    let mut files = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|source| DriftError::ScanFailed {
            path: dir.to_path_buf(),
            source,
        })?;
        let path = entry.path();
        if path.is_file() && path.extension().and_then(|e| e.to_str()) == Some(extension) {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}
/// Workflow names key the deployed lookup, so two files declaring the same
/// name each get their file stem appended.
fn disambiguate_names(artifacts: &mut [LocalArtifact]) {
    let mut counts: BTreeMap<String, usize> = BTreeMap::new();
    for artifact in artifacts.iter() {
        *counts.entry(artifact.name.clone()).or_default() += 1;
    }
    for artifact in artifacts.iter_mut() {
        if counts.get(&artifact.name).copied().unwrap_or(0) > 1 {
            let stem = file_stem(Path::new(&artifact.file));
            tracing::warn!(
                name = %artifact.name,
                file = %artifact.file,
                "duplicate workflow name, qualifying with file stem"
            );
            artifact.name = format!("{} ({})", artifact.name, stem);
        }
    }
}

fn read(path: &Path) -> Result<Vec<u8>, DriftError> {
    fs::read(path).map_err(|source| DriftError::ReadFailed {
        path: path.to_path_buf(),
        source,
    })
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn workflow_name(data: &[u8]) -> Option<String> {
    let value: serde_json::Value = match serde_json::from_slice(data) {
        Ok(value) => value,
        Err(e) => {
            tracing::debug!(error = %e, "workflow file is not valid JSON, naming by file stem");
            return None;
        }
    };
    value
        .get("name")
        .and_then(|n| n.as_str())
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .map(str::to_string)
}
