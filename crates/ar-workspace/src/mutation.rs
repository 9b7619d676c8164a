// mutation.rs — Guarded create/modify/delete on workspace files.
//
// Each operation is independent: it checks the guardrail for its own path,
// performs its own I/O and reports its own line delta. Callers decide what a
// failure means for the rest of the task.

use std::fs;
use std::io::ErrorKind;

use serde::{Deserialize, Serialize};

use crate::change::{count_non_blank_lines, FileChange, LineBuffer};
use crate::error::MutationError;
use crate::workspace::Workspace;

/// Size ceiling for content written by `create_file` (1 MiB).
pub const MAX_FILE_SIZE: usize = 1024 * 1024;

/// Lines added and removed by one file operation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileDelta {
    pub lines_added: usize,
    pub lines_removed: usize,
}

impl FileDelta {
    /// Net delta between non-blank line counts before and after.
    fn between(before: usize, after: usize) -> Self {
        Self {
            lines_added: after.saturating_sub(before),
            lines_removed: before.saturating_sub(after),
        }
    }
}

impl Workspace {
    /// Create (or overwrite) a file with `content`.
    ///
    /// Parent directories are created as needed. Reports the number of
    /// non-blank lines in `content` as added.
    pub fn create_file(&self, path: &str, content: &str) -> Result<FileDelta, MutationError> {
        let full_path = self.resolve(path)?;

        if content.len() > MAX_FILE_SIZE {
            return Err(MutationError::FileTooLarge {
                path: path.to_string(),
                size: content.len(),
                limit: MAX_FILE_SIZE,
            });
        }

        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent).map_err(|source| MutationError::IoError {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        fs::write(&full_path, content).map_err(|source| MutationError::IoError {
            path: full_path.clone(),
            source,
        })?;

        let delta = FileDelta {
            lines_added: count_non_blank_lines(content),
            lines_removed: 0,
        };
        tracing::info!(path, lines_added = delta.lines_added, "created file");
        Ok(delta)
    }

    /// Apply `changes` in order to an existing file.
    ///
    /// The reported delta compares non-blank line counts before and after, so
    /// an edit that rewrites lines without changing their count reports zero.
    pub fn modify_file(
        &self,
        path: &str,
        changes: &[FileChange],
    ) -> Result<FileDelta, MutationError> {
        let full_path = self.resolve(path)?;

        let original = match fs::read_to_string(&full_path) {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(MutationError::FileNotFound {
                    path: path.to_string(),
                })
            }
            Err(source) => {
                return Err(MutationError::IoError {
                    path: full_path,
                    source,
                })
            }
        };

        let mut buffer = LineBuffer::from_text(&original);
        buffer.apply_all(changes);
        let updated = buffer.to_text();

        fs::write(&full_path, &updated).map_err(|source| MutationError::IoError {
            path: full_path.clone(),
            source,
        })?;

        let delta = FileDelta::between(
            count_non_blank_lines(&original),
            count_non_blank_lines(&updated),
        );
        tracing::info!(
            path,
            changes = changes.len(),
            lines_added = delta.lines_added,
            lines_removed = delta.lines_removed,
            "modified file"
        );
        Ok(delta)
    }

    /// Delete a file. Deleting a file that does not exist succeeds with a zero delta.
    pub fn delete_file(&self, path: &str) -> Result<FileDelta, MutationError> {
        let full_path = self.resolve(path)?;

        let content = match fs::read(&full_path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::info!(path, "file already absent, nothing to delete");
                return Ok(FileDelta::default());
            }
            Err(source) => {
                return Err(MutationError::IoError {
                    path: full_path,
                    source,
                })
            }
        };

        fs::remove_file(&full_path).map_err(|source| MutationError::IoError {
            path: full_path.clone(),
            source,
        })?;

        let delta = FileDelta {
            lines_added: 0,
            lines_removed: count_non_blank_lines(&String::from_utf8_lossy(&content)),
        };
        tracing::info!(path, lines_removed = delta.lines_removed, "deleted file");
        Ok(delta)
    }
}
