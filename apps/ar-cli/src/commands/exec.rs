// exec.rs — Execute one task payload and produce its JSON result.
//
// The payload is parsed before anything else happens. Malformed input is
// rejected with an error object and no side effects; everything after that
// point ends in a TaskResult, whatever went wrong inside the task.

use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Parser;
use serde_json::json;

use ar_task::{RunLog, RunnerConfig, TaskError, TaskExecutor, TaskPayload, TaskResult, CONFIG_RELATIVE_PATH};
use ar_workspace::Workspace;

/// Execute one agent task against a repository checkout.
#[derive(Parser, Debug, Clone)]
#[command(name = "ar-exec", version, about)]
pub struct ExecArgs {
    /// Task payload JSON file; reads stdin when omitted or `-`.
    pub payload: Option<PathBuf>,

    /// Repository root the task operates on.
    #[arg(long, default_value = ".")]
    pub root: PathBuf,

    /// Config file (defaults to <root>/.runner/runner.toml).
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Per-command timeout, overriding the config.
    #[arg(long)]
    pub timeout_secs: Option<u64>,
}

impl ExecArgs {
    /// Arguments for running against `root` with everything else defaulted.
    pub fn for_root(root: impl Into<PathBuf>) -> Self {
        Self {
            payload: None,
            root: root.into(),
            config: None,
            timeout_secs: None,
        }
    }
}

/// What `ar-exec` prints.
#[derive(Debug)]
pub enum ExecOutput {
    /// The task ran (successfully or not).
    Completed(TaskResult),
    /// The payload was rejected before any mutation.
    Rejected(String),
}

impl ExecOutput {
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            ExecOutput::Completed(result) => {
                serde_json::to_value(result).unwrap_or_else(|e| error_json(&e.to_string()))
            }
            ExecOutput::Rejected(message) => error_json(message),
        }
    }

    pub fn exit_code(&self) -> u8 {
        match self {
            ExecOutput::Completed(result) if result.success => 0,
            _ => 1,
        }
    }
}

pub fn error_json(message: &str) -> serde_json::Value {
    json!({ "success": false, "error": message })
}

/// Read the payload from a file, or from stdin for `None` / `-`.
pub fn read_payload(path: Option<&Path>) -> anyhow::Result<String> {
    match path {
        Some(path) if path != Path::new("-") => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read payload {}", path.display())),
        _ => {
            let mut input = String::new();
            std::io::stdin()
                .read_to_string(&mut input)
                .context("failed to read payload from stdin")?;
            Ok(input)
        }
    }
}

/// Parse `input` and run it. `Err` only for setup failures (bad config, bad root).
pub fn execute(args: &ExecArgs, input: &str) -> anyhow::Result<ExecOutput> {
    let payload = match TaskPayload::from_json(input) {
        Ok(payload) => payload,
        Err(e @ TaskError::MalformedInput(_)) => {
            tracing::error!(error = %e, "rejecting task payload");
            return Ok(ExecOutput::Rejected(e.to_string()));
        }
        Err(e) => return Err(e.into()),
    };

    let root = args
        .root
        .canonicalize()
        .with_context(|| format!("repository root {} not found", args.root.display()))?;
    let config_path = args
        .config
        .clone()
        .unwrap_or_else(|| root.join(CONFIG_RELATIVE_PATH));
    let mut config = RunnerConfig::load_or_default(&config_path)
        .with_context(|| format!("failed to load {}", config_path.display()))?;
    if let Some(secs) = args.timeout_secs {
        config.sandbox.timeout_secs = secs;
    }

    let workspace = Workspace::new(&root);
    let mut executor = TaskExecutor::from_config(workspace, &config)
        .context("failed to set up task executor")?;
    match RunLog::create(&root.join(&config.logs_dir), &payload.task_key) {
        Ok(log) => executor = executor.with_run_log(log),
        Err(e) => tracing::warn!(error = %e, "run log unavailable, continuing without it"),
    }

    Ok(ExecOutput::Completed(executor.execute(&payload)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn malformed_payload_is_rejected_without_side_effects() {
        let dir = tempdir().unwrap();
        let output = execute(&ExecArgs::for_root(dir.path()), r#"{"task_id": "1"}"#).unwrap();
        assert!(matches!(output, ExecOutput::Rejected(_)));
        assert_eq!(output.exit_code(), 1);
        assert_eq!(output.to_json()["success"], false);
        assert!(output.to_json()["error"]
            .as_str()
            .unwrap()
            .starts_with("malformed task input"));
        assert!(!dir.path().join("logs").exists());
    }

    #[test]
    fn missing_root_is_a_setup_error() {
        let args = ExecArgs::for_root("/definitely/not/a/repo");
        let input = r#"{"task_id":"1","task_key":"k","task_name":"n","spec":{}}"#;
        assert!(execute(&args, input).is_err());
    }

    #[test]
    fn read_payload_from_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("task.json");
        std::fs::write(&path, "{}").unwrap();
        assert_eq!(read_payload(Some(&path)).unwrap(), "{}");
        assert!(read_payload(Some(&dir.path().join("missing.json"))).is_err());
    }
}
