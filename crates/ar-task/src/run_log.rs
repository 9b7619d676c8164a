// run_log.rs — Per-task step log.
//
// Each invocation appends timestamped lines to
// `<logs_dir>/<task_key>-<YYYYMMDDTHHMMSS>.log`. The log is an operator aid;
// failing to write it never fails the task.

use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::Utc;

use crate::error::TaskError;

pub struct RunLog {
    path: PathBuf,
    file: File,
}

impl RunLog {
    /// Create a fresh log file for `task_key` under `logs_dir`.
    pub fn create(logs_dir: &Path, task_key: &str) -> Result<Self, TaskError> {
        fs::create_dir_all(logs_dir).map_err(|source| TaskError::IoError {
            path: logs_dir.to_path_buf(),
            source,
        })?;
        let stamp = Utc::now().format("%Y%m%dT%H%M%S");
        let path = logs_dir.join(format!("{}-{}.log", file_safe(task_key), stamp));
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|source| TaskError::IoError {
                path: path.clone(),
                source,
            })?;
        Ok(Self { path, file })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one line. Write failures are logged and otherwise ignored.
    pub fn line(&mut self, message: impl AsRef<str>) {
        let stamp = Utc::now().to_rfc3339();
        if let Err(e) = writeln!(self.file, "[{}] {}", stamp, message.as_ref()) {
            tracing::warn!(path = %self.path.display(), error = %e, "failed to write run log");
        }
    }
}

fn file_safe(key: &str) -> String {
    let cleaned: String = key
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '-'
            }
        })
        .collect();
    if cleaned.is_empty() {
        "task".to_string()
    } else {
        cleaned
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn writes_timestamped_lines_under_logs_dir() {
        let dir = tempdir().unwrap();
        let logs = dir.path().join("logs");
        let mut log = RunLog::create(&logs, "fix/login bug").unwrap();
        log.line("state: init");
        log.line("state: done");

        let name = log.path().file_name().unwrap().to_string_lossy().to_string();
        assert!(name.starts_with("fix-login-bug-"));
        assert!(name.ends_with(".log"));

        let text = fs::read_to_string(log.path()).unwrap();
        assert_eq!(text.lines().count(), 2);
        assert!(text.lines().all(|l| l.starts_with('[')));
    }
}
