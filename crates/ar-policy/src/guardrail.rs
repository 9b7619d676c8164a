// guardrail.rs — Pure path guardrail.
//
// Every mutation request passes through `evaluate()` which checks, in order:
//
// 1. Is the path empty? → Blocked
// 2. Is the path absolute? → Blocked
// 3. Does any segment equal ".."? → Blocked
// 4. Does any directory segment name a protected directory? → Blocked
// 5. Does the file name match a sensitive-file pattern? → Blocked
// 6. Otherwise → Allowed
//
// Matching is case-sensitive and works on '/'-separated segments; backslashes
// are treated as separators so Windows-style task paths are judged the same way.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::GuardrailError;

/// Directory names that may never be written below.
///
/// Dependency caches, version-control metadata and secret stores.
pub const BLOCKED_DIRS: &[&str] = &[
    "node_modules",
    ".venv",
    ".git",
    ".svn",
    ".hg",
    "secrets",
    ".secrets",
    ".ssh",
    ".gnupg",
    ".aws",
];

/// File suffixes for private keys and certificates.
pub const BLOCKED_SUFFIXES: &[&str] = &[".pem", ".key", ".p12", ".pfx", ".crt", ".keystore", ".jks"];

/// File names (or stems, for names with an extension) that hold credentials.
pub const BLOCKED_FILE_NAMES: &[&str] = &[
    "credentials",
    "secrets",
    "secret",
    "id_rsa",
    "id_ecdsa",
    "id_ed25519",
    ".npmrc",
    ".netrc",
    ".pgpass",
];

/// Why a path was blocked.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BlockReason {
    Empty,
    Absolute,
    Traversal,
    ProtectedDirectory { dir: String },
    SensitiveFile { pattern: String },
}

impl fmt::Display for BlockReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BlockReason::Empty => write!(f, "empty path"),
            BlockReason::Absolute => write!(f, "absolute path"),
            BlockReason::Traversal => write!(f, "path traversal"),
            BlockReason::ProtectedDirectory { dir } => write!(f, "protected directory '{}'", dir),
            BlockReason::SensitiveFile { pattern } => {
                write!(f, "sensitive file pattern '{}'", pattern)
            }
        }
    }
}

/// The outcome of a guardrail evaluation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "verdict", rename_all = "snake_case")]
pub enum GuardrailVerdict {
    Allowed,
    Blocked { reason: BlockReason },
}

impl GuardrailVerdict {
    pub fn is_blocked(&self) -> bool {
        matches!(self, GuardrailVerdict::Blocked { .. })
    }
}

/// Evaluate a repository-relative path against the guardrail rules.
pub fn evaluate(path: &str) -> GuardrailVerdict {
    let normalized = path.replace('\\', "/");

    if normalized.trim().is_empty() {
        return blocked(BlockReason::Empty);
    }

    if normalized.starts_with('/') || has_drive_prefix(&normalized) {
        return blocked(BlockReason::Absolute);
    }

    let segments: Vec<&str> = normalized
        .split('/')
        .filter(|s| !s.is_empty() && *s != ".")
        .collect();

    if segments.iter().any(|s| *s == "..") {
        return blocked(BlockReason::Traversal);
    }

    let Some((file_name, dirs)) = segments.split_last() else {
        return blocked(BlockReason::Empty);
    };

    // A path naming a protected directory itself is as blocked as anything under it.
    for segment in dirs.iter().chain(std::iter::once(file_name)) {
        if let Some(dir) = BLOCKED_DIRS.iter().find(|d| *d == segment) {
            return blocked(BlockReason::ProtectedDirectory {
                dir: dir.to_string(),
            });
        }
    }

    if let Some(pattern) = sensitive_file_pattern(file_name) {
        return blocked(BlockReason::SensitiveFile { pattern });
    }

    GuardrailVerdict::Allowed
}

/// Returns true if mutating `path` is forbidden.
pub fn is_path_blocked(path: &str) -> bool {
    evaluate(path).is_blocked()
}

/// Like [`evaluate`], but as a `Result` for `?`-style callers.
pub fn check_path(path: &str) -> Result<(), GuardrailError> {
    match evaluate(path) {
        GuardrailVerdict::Allowed => Ok(()),
        GuardrailVerdict::Blocked { reason } => {
            tracing::warn!(path, %reason, "guardrail blocked path");
            Err(GuardrailError::BlockedPath {
                path: path.to_string(),
                reason,
            })
        }
    }
}

fn blocked(reason: BlockReason) -> GuardrailVerdict {
    GuardrailVerdict::Blocked { reason }
}

fn has_drive_prefix(path: &str) -> bool {
    let bytes = path.as_bytes();
    bytes.len() >= 2 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':'
}

fn sensitive_file_pattern(file_name: &str) -> Option<String> {
    // .env, .env.local, .env.production, ...
    if file_name == ".env" || file_name.starts_with(".env.") {
        return Some(".env*".to_string());
    }

    if let Some(suffix) = BLOCKED_SUFFIXES.iter().find(|s| file_name.ends_with(*s)) {
        return Some(format!("*{}", suffix));
    }

    let stem = match file_name.find('.') {
        Some(0) | None => file_name,
        Some(pos) => &file_name[..pos],
    };
    BLOCKED_FILE_NAMES
        .iter()
        .find(|n| **n == file_name || **n == stem)
        .map(|n| n.to_string())
}
