//! Submit configuration structures

use serde::{Deserialize, Serialize};

/// Submit adapter configuration (`[submit]` in .runner/runner.toml)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmitConfig {
    /// Adapter type: "git" or "none"
    #[serde(default = "default_adapter")]
    pub adapter: String,

    /// Git-specific configuration
    #[serde(default)]
    pub git: GitConfig,
}

impl Default for SubmitConfig {
    fn default() -> Self {
        Self {
            adapter: default_adapter(),
            git: GitConfig::default(),
        }
    }
}

/// Git adapter configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GitConfig {
    /// Branch namespace prefix (e.g., "agent/")
    #[serde(default = "default_branch_prefix")]
    pub branch_prefix: String,

    /// Default branch used when the remote HEAD cannot be resolved
    #[serde(default = "default_fallback_branch")]
    pub fallback_branch: String,

    /// Git remote name
    #[serde(default = "default_remote")]
    pub remote: String,
}

impl Default for GitConfig {
    fn default() -> Self {
        Self {
            branch_prefix: default_branch_prefix(),
            fallback_branch: default_fallback_branch(),
            remote: default_remote(),
        }
    }
}

// Serde default functions
fn default_adapter() -> String {
    "git".to_string()
}

fn default_branch_prefix() -> String {
    "agent/".to_string()
}

fn default_fallback_branch() -> String {
    "main".to_string()
}

fn default_remote() -> String {
    "origin".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_toml_fills_defaults() {
        let config: SubmitConfig = toml::from_str(
            r#"
            [git]
            branch_prefix = "bot/"
            "#,
        )
        .unwrap();
        assert_eq!(config.adapter, "git");
        assert_eq!(config.git.branch_prefix, "bot/");
        assert_eq!(config.git.fallback_branch, "main");
        assert_eq!(config.git.remote, "origin");
    }
}
