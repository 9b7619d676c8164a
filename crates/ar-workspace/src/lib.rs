//! # ar-workspace
//!
//! Workspace handle and guarded file mutation engine for the agent runner.
//!
//! A [`Workspace`] is an explicit value naming the repository root every
//! operation resolves against. Nothing in this crate consults the process
//! working directory. Mutations go through three operations, each checked
//! against the guardrail before touching the filesystem:
//!
//! - [`Workspace::create_file`] — write a new file (parents created as needed)
//! - [`Workspace::modify_file`] — apply an ordered list of [`FileChange`]s
//! - [`Workspace::delete_file`] — remove a file; a missing file is a no-op
//!
//! Line accounting counts non-blank lines before and after a mutation. It is
//! a net delta, not a diff: rewriting every line of a file while keeping the
//! line count constant reports zero added and zero removed.

pub mod change;
pub mod error;
pub mod mutation;
pub mod workspace;

pub use change::{count_non_blank_lines, FileChange, LineBuffer};
pub use error::MutationError;
pub use mutation::{FileDelta, MAX_FILE_SIZE};
pub use workspace::Workspace;
