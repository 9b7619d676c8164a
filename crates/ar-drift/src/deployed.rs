// deployed.rs — What the live systems hold, behind a trait.
//
// The detector never talks to the automation platform or the database
// directly; it asks a DeployedState. Fingerprints returned here must come from
// `hasher::fingerprint` with the same length as the local scan.

use std::collections::BTreeMap;

use crate::config::DeployedStateConfig;
use crate::detector::LocalScan;

/// Read-only view of deployed workflows and the applied-migration history.
pub trait DeployedState {
    /// Fingerprint of the deployed workflow with this name, or None if not deployed.
    fn deployed_workflow(&self, name: &str) -> Option<String>;

    /// Every deployed workflow name, sorted.
    fn deployed_workflow_names(&self) -> Vec<String>;

    /// Fingerprint recorded when this migration was applied, or None if never applied.
    fn applied_migration(&self, name: &str) -> Option<String>;

    /// Every applied migration name, sorted.
    fn applied_migration_names(&self) -> Vec<String>;
}

/// Stand-in for the live integration: mirrors the local scan, so every
/// workflow is `synced` and every migration `applied`.
#[derive(Debug, Clone, Default)]
pub struct StubDeployedState {
    workflows: BTreeMap<String, String>,
    migrations: BTreeMap<String, String>,
}

impl StubDeployedState {
    pub fn mirroring(scan: &LocalScan) -> Self {
        let collect = |items: &[crate::detector::LocalArtifact]| {
            items
                .iter()
                .map(|a| (a.name.clone(), a.fingerprint.clone()))
                .collect::<BTreeMap<_, _>>()
        };
        Self {
            workflows: collect(&scan.workflows),
            migrations: collect(&scan.migrations),
        }
    }
}

impl DeployedState for StubDeployedState {
    fn deployed_workflow(&self, name: &str) -> Option<String> {
        self.workflows.get(name).cloned()
    }

    fn deployed_workflow_names(&self) -> Vec<String> {
        self.workflows.keys().cloned().collect()
    }

    fn applied_migration(&self, name: &str) -> Option<String> {
        self.migrations.get(name).cloned()
    }

    fn applied_migration_names(&self) -> Vec<String> {
        self.migrations.keys().cloned().collect()
    }
}

/// Pick the deployed-state backend for this run.
///
/// Only the stub exists today. A configured live endpoint is logged so the
/// operator can see it is not yet consulted.
pub fn deployed_state_for(config: &DeployedStateConfig, scan: &LocalScan) -> Box<dyn DeployedState> {
    if config.is_configured() {
        tracing::warn!(
            workflows_endpoint = ?config.workflows_endpoint,
            migrations_database = config.migrations_database_url.is_some(),
            "live deployed-state integration is not available, falling back to stub"
        );
    } else {
        tracing::info!("no deployed-state integration configured, using stub");
    }
    Box::new(StubDeployedState::mirroring(scan))
}
