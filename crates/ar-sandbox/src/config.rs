//! Command runner configuration (`[sandbox]` in .runner/runner.toml)

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::runner::{CommandRunner, DEFAULT_OUTPUT_LIMIT_BYTES, DEFAULT_TIMEOUT};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SandboxConfig {
    /// Wall-clock budget per command, in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Cap on captured bytes per output stream
    #[serde(default = "default_output_limit_bytes")]
    pub output_limit_bytes: usize,

    /// Shell used for `commands_to_run` (invoked as `<shell> -c <command>`)
    #[serde(default = "default_shell")]
    pub shell: String,
}

impl Default for SandboxConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            output_limit_bytes: default_output_limit_bytes(),
            shell: default_shell(),
        }
    }
}

impl SandboxConfig {
    /// Build a runner with these settings.
    pub fn runner(&self) -> CommandRunner {
        CommandRunner::new()
            .with_timeout(Duration::from_secs(self.timeout_secs))
            .with_output_limit(self.output_limit_bytes)
            .with_shell(self.shell.clone())
    }
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT.as_secs()
}

fn default_output_limit_bytes() -> usize {
    DEFAULT_OUTPUT_LIMIT_BYTES
}

fn default_shell() -> String {
    "sh".to_string()
}
