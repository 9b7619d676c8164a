// config.rs — The `[drift]` section of .runner/runner.toml.
//
// Lives in the same file as the runner config; other tables are ignored.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::DriftError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DriftConfig {
    /// Workflow definitions (`*.json`), relative to the repository root.
    #[serde(default = "default_workflows_dir")]
    pub workflows_dir: PathBuf,

    /// Migration files (`*.sql`), relative to the repository root.
    #[serde(default = "default_migrations_dir")]
    pub migrations_dir: PathBuf,

    /// Where drift reports are written, relative to the repository root.
    #[serde(default = "default_reports_dir")]
    pub reports_dir: PathBuf,

    /// Hex characters kept from each SHA-256 fingerprint.
    #[serde(default = "default_fingerprint_len")]
    pub fingerprint_len: usize,

    #[serde(default)]
    pub deployed: DeployedStateConfig,
}

/// Connection settings for the live deployed-state integration.
///
/// Nothing here has a default. Timeout and retry behaviour of the live
/// platform is unknown, so both are left for the operator to set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeployedStateConfig {
    /// Automation platform API that lists deployed workflows by name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workflows_endpoint: Option<String>,

    /// Database holding the applied-migration history table.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub migrations_database_url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_timeout_secs: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_retries: Option<u32>,
}

impl DeployedStateConfig {
    /// True when any live endpoint has been configured.
    pub fn is_configured(&self) -> bool {
        self.workflows_endpoint.is_some() || self.migrations_database_url.is_some()
    }
}

impl Default for DriftConfig {
    fn default() -> Self {
        Self {
            workflows_dir: default_workflows_dir(),
            migrations_dir: default_migrations_dir(),
            reports_dir: default_reports_dir(),
            fingerprint_len: default_fingerprint_len(),
            deployed: DeployedStateConfig::default(),
        }
    }
}

fn default_workflows_dir() -> PathBuf {
    PathBuf::from("n8n/workflows")
}

fn default_migrations_dir() -> PathBuf {
    PathBuf::from("supabase/migrations")
}

fn default_reports_dir() -> PathBuf {
    PathBuf::from("logs")
}

fn default_fingerprint_len() -> usize {
    16
}

#[derive(Deserialize)]
struct ConfigFile {
    #[serde(default)]
    drift: DriftConfig,
}

impl DriftConfig {
    /// Load the `[drift]` table from a TOML file.
    pub fn load(path: &Path) -> Result<Self, DriftError> {
        let content = std::fs::read_to_string(path).map_err(|source| DriftError::ReadFailed {
            path: path.to_path_buf(),
            source,
        })?;
        let file: ConfigFile = toml::from_str(&content).map_err(|e| DriftError::Config {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        Ok(file.drift)
    }

    /// Load config, returning defaults if the file doesn't exist.
    pub fn load_or_default(path: &Path) -> Result<Self, DriftError> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no runner config, using drift defaults");
            return Ok(Self::default());
        }
        Self::load(path)
    }
}
