// change.rs — Line-oriented edit commands for modifying a file in place.
//
// A FileToModify carries an ordered list of FileChange values. They are a
// sequential text transform, not a patch format: each change is applied to
// the in-memory LineBuffer produced by the previous one.

use serde::{Deserialize, Serialize};

/// One edit applied to a file's content.
///
/// Serializes as `{"type": "replace", "search": "...", "content": "..."}` etc.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FileChange {
    /// Replace the first exact occurrence of `search` with `content`.
    Replace { search: String, content: String },

    /// Insert `content` as a new line at index `line`.
    ///
    /// The index is clamped to `[0, len]`: negative values insert at the top,
    /// values past the end append.
    Insert { line: i64, content: String },

    /// Drop every line containing `search`.
    Delete { search: String },

    /// Add `content` as a new final line.
    Append { content: String },
}

impl FileChange {
    /// Short name of the operation, for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            FileChange::Replace { .. } => "replace",
            FileChange::Insert { .. } => "insert",
            FileChange::Delete { .. } => "delete",
            FileChange::Append { .. } => "append",
        }
    }
}

/// A file's content held as a line array.
///
/// Lines are split on `\n` only, so `\r` stays part of the line and CRLF
/// files round-trip unchanged. A trailing newline is remembered separately.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineBuffer {
    lines: Vec<String>,
    trailing_newline: bool,
}

impl LineBuffer {
    pub fn from_text(text: &str) -> Self {
        if text.is_empty() {
            return Self {
                lines: Vec::new(),
                trailing_newline: false,
            };
        }
        let trailing_newline = text.ends_with('\n');
        let body = text.strip_suffix('\n').unwrap_or(text);
        Self {
            lines: body.split('\n').map(str::to_string).collect(),
            trailing_newline,
        }
    }

    pub fn to_text(&self) -> String {
        let mut text = self.lines.join("\n");
        if self.trailing_newline && !self.lines.is_empty() {
            text.push('\n');
        }
        text
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Apply one change in place.
    pub fn apply(&mut self, change: &FileChange) {
        match change {
            FileChange::Replace { search, content } => self.replace_first(search, content),
            FileChange::Insert { line, content } => {
                let index = clamp_index(*line, self.lines.len());
                if index as i64 != *line {
                    tracing::debug!(requested = line, clamped = index, "insert index clamped");
                }
                let new_lines = split_content(content);
                self.lines.splice(index..index, new_lines);
            }
            FileChange::Delete { search } => {
                // Every line contains the empty string; an empty search deletes nothing.
                if search.is_empty() {
                    return;
                }
                self.lines.retain(|l| !l.contains(search.as_str()));
            }
            FileChange::Append { content } => {
                self.lines.extend(split_content(content));
            }
        }
    }

    /// Apply changes in order, each seeing the output of the previous.
    pub fn apply_all(&mut self, changes: &[FileChange]) {
        for change in changes {
            self.apply(change);
        }
    }

    fn replace_first(&mut self, search: &str, content: &str) {
        if search.is_empty() {
            return;
        }
        let text = self.to_text();
        if !text.contains(search) {
            tracing::debug!(search, "replace target not found, content unchanged");
            return;
        }
        *self = LineBuffer::from_text(&text.replacen(search, content, 1));
    }
}

/// Count lines that contain anything other than whitespace.
pub fn count_non_blank_lines(text: &str) -> usize {
    text.lines().filter(|l| !l.trim().is_empty()).count()
}

fn clamp_index(line: i64, len: usize) -> usize {
    if line <= 0 {
        0
    } else {
        usize::try_from(line).map_or(len, |l| l.min(len))
    }
}

fn split_content(content: &str) -> Vec<String> {
    let body = content.strip_suffix('\n').unwrap_or(content);
    body.split('\n').map(str::to_string).collect()
}
