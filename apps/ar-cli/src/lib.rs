//! # ar-cli
//!
//! Entry points for the agent runner. Two binaries share this library:
//! - `ar-exec [PAYLOAD]` — execute one task payload (file or stdin), print the
//!   `TaskResult` JSON on stdout, exit 0 on success and 1 otherwise
//! - `ar-drift [--dry-run]` — reconcile declared artifacts, write a drift
//!   report, print a summary, exit 0 (clean), 1 (drift) or 2 (failure)
//!
//! stdout carries only results; all logging goes to stderr.

pub mod commands;

use tracing_subscriber::filter::ParseError;
use tracing_subscriber::EnvFilter;

/// Directives used when `RUST_LOG` is unset or empty.
pub const DEFAULT_LOG_DIRECTIVES: &str =
    "ar_cli=info,ar_drift=info,ar_policy=info,ar_sandbox=info,ar_submit=info,ar_task=info,ar_workspace=info";

/// Filter from a `RUST_LOG` value, which replaces the defaults entirely when set.
pub fn log_filter(rust_log: Option<&str>) -> Result<EnvFilter, ParseError> {
    match rust_log.map(str::trim).filter(|v| !v.is_empty()) {
        Some(directives) => EnvFilter::try_new(directives),
        None => EnvFilter::try_new(DEFAULT_LOG_DIRECTIVES),
    }
}

/// Log to stderr at `info` for the runner crates, overridable with `RUST_LOG`.
pub fn init_tracing() -> anyhow::Result<()> {
    let rust_log = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    let (filter, rejected) = match log_filter(rust_log.as_deref()) {
        Ok(filter) => (filter, None),
        Err(e) => (log_filter(None)?, Some(e)),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .try_init()
        .map_err(|e| anyhow::anyhow!(e))?;
    if let Some(e) = rejected {
        tracing::warn!(error = %e, "ignoring invalid RUST_LOG, using default directives");
    }
    Ok(())
}
