//! # ar-drift
//!
//! Reconciles declared artifacts in the repository (workflow definitions and
//! database migrations) against their deployed counterparts, and turns each
//! divergence into a prioritized remediation task stub.
//!
//! The detector is read-only: it hashes local files and asks a
//! [`DeployedState`] what the live side holds. The shipped
//! [`StubDeployedState`] mirrors the local scan, so every artifact is reported
//! as `synced` / `applied` until a live integration is wired in.

pub mod config;
pub mod deployed;
pub mod detector;
pub mod error;
pub mod hasher;
pub mod remediation;
pub mod report;

pub use config::{DeployedStateConfig, DriftConfig};
pub use deployed::{deployed_state_for, DeployedState, StubDeployedState};
pub use detector::{
    classify_migrations, classify_workflows, write_report, DriftDetector, LocalArtifact, LocalScan,
};
pub use error::DriftError;
pub use hasher::{fingerprint, hash_bytes};
pub use remediation::{
    enqueue_statement, generate_tasks, submit_all, task_slug, DryRunSink, StatementSink, TaskSink,
};
pub use report::{
    DriftReport, DriftSummary, MigrationDrift, MigrationDriftKind, TaskCreated, WorkflowDrift,
    WorkflowDriftKind,
};
