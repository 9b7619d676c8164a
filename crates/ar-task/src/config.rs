// config.rs — Runner configuration loaded from .runner/runner.toml.
//
// Every section is optional; a missing file means all defaults. Sections
// belong to the crate that consumes them (`[submit]` → ar-submit,
// `[sandbox]` → ar-sandbox); unknown tables such as `[drift]` are ignored here.

use std::path::{Path, PathBuf};

use ar_sandbox::SandboxConfig;
use ar_submit::SubmitConfig;
use serde::{Deserialize, Serialize};

use crate::error::TaskError;

/// Config file location relative to the repository root.
pub const CONFIG_RELATIVE_PATH: &str = ".runner/runner.toml";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunnerConfig {
    #[serde(default)]
    pub submit: SubmitConfig,

    #[serde(default)]
    pub sandbox: SandboxConfig,

    /// Where per-task run logs go, relative to the repository root.
    #[serde(default = "default_logs_dir")]
    pub logs_dir: PathBuf,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            submit: SubmitConfig::default(),
            sandbox: SandboxConfig::default(),
            logs_dir: default_logs_dir(),
        }
    }
}

fn default_logs_dir() -> PathBuf {
    PathBuf::from("logs")
}

impl RunnerConfig {
    /// Load config from a TOML file.
    pub fn load(path: &Path) -> Result<Self, TaskError> {
        let content = std::fs::read_to_string(path).map_err(|source| TaskError::IoError {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|e| TaskError::Config {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Load config, returning defaults if the file doesn't exist.
    ///
    /// A file that exists but does not parse is still an error.
    pub fn load_or_default(path: &Path) -> Result<Self, TaskError> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no runner config, using defaults");
            return Ok(Self::default());
        }
        Self::load(path)
    }
}
