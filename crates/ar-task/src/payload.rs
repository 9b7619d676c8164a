// payload.rs — The declarative task handed to the executor.
//
// A TaskPayload is constructed externally (by the task queue), parsed once,
// and never mutated by the executor.

use ar_workspace::FileChange;
use serde::{Deserialize, Serialize};

use crate::error::TaskError;

/// Input to one executor invocation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TaskPayload {
    /// Opaque unique identifier; its first 8 characters name the branch.
    pub task_id: String,

    /// Short stable slug (e.g., "add-webhook-retry").
    pub task_key: String,

    /// Human label, used as the commit subject.
    pub task_name: String,

    pub spec: TaskSpec,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required_autonomy_level: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attempt_count: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub worker_id: Option<String>,
}

/// The instruction set: which files to touch and which commands to run.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct TaskSpec {
    /// Free text, included in the commit message.
    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub files_to_create: Vec<FileToCreate>,

    #[serde(default)]
    pub files_to_modify: Vec<FileToModify>,

    #[serde(default)]
    pub files_to_delete: Vec<String>,

    #[serde(default)]
    pub commands_to_run: Vec<String>,

    /// Informational only; never verified.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected_outcomes: Option<serde_json::Value>,

    /// Informational only; never executed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rollback_instructions: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FileToCreate {
    pub path: String,
    pub content: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FileToModify {
    pub path: String,
    #[serde(default)]
    pub changes: Vec<FileChange>,
}

impl TaskPayload {
    /// Parse and validate a payload from JSON text.
    ///
    /// Missing or blank `task_id`, `task_key` or `task_name`, or a missing
    /// `spec`, is `MalformedInput`.
    pub fn from_json(text: &str) -> Result<Self, TaskError> {
        let payload: TaskPayload =
            serde_json::from_str(text).map_err(|e| TaskError::MalformedInput(e.to_string()))?;
        payload.validate()?;
        Ok(payload)
    }

    fn validate(&self) -> Result<(), TaskError> {
        for (field, value) in [
            ("task_id", &self.task_id),
            ("task_key", &self.task_key),
            ("task_name", &self.task_name),
        ] {
            if value.trim().is_empty() {
                return Err(TaskError::MalformedInput(format!(
                    "required field `{}` is empty",
                    field
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_full_payload() {
        let json = r#"{
            "task_id": "9b1deb4d-3b7d-4bad-9bdd-2b0d7b3dcb6d",
            "task_key": "add-readme-badge",
            "task_name": "Add README badge",
            "priority": 50,
            "attempt_count": 1,
            "worker_id": "worker-7",
            "spec": {
                "description": "Add a CI badge",
                "files_to_create": [{"path": "docs/a.md", "content": "hi\n"}],
                "files_to_modify": [{
                    "path": "README.md",
                    "changes": [{"type": "insert", "line": 1, "content": "![ci](badge.svg)"}]
                }],
                "files_to_delete": ["old.md"],
                "commands_to_run": ["true"],
                "expected_outcomes": ["badge renders"],
                "rollback_instructions": "revert the commit"
            }
        }"#;
        let payload = TaskPayload::from_json(json).unwrap();
        assert_eq!(payload.task_key, "add-readme-badge");
        assert_eq!(payload.priority, Some(50));
        assert_eq!(payload.spec.files_to_create.len(), 1);
        assert_eq!(
            payload.spec.files_to_modify[0].changes[0],
            FileChange::Insert {
                line: 1,
                content: "![ci](badge.svg)".to_string()
            }
        );
        assert_eq!(payload.spec.files_to_delete, vec!["old.md".to_string()]);
    }

    #[test]
    fn spec_lists_default_to_empty() {
        let payload =
            TaskPayload::from_json(r#"{"task_id":"1","task_key":"k","task_name":"n","spec":{}}"#)
                .unwrap();
        assert!(payload.spec.files_to_create.is_empty());
        assert!(payload.spec.commands_to_run.is_empty());
        assert_eq!(payload.spec.description, "");
    }

    #[test]
    fn missing_spec_is_malformed() {
        let err = TaskPayload::from_json(r#"{"task_id":"1","task_key":"k","task_name":"n"}"#)
            .unwrap_err();
        assert!(matches!(err, TaskError::MalformedInput(msg) if msg.contains("spec")));
    }

    #[test]
    fn blank_required_field_is_malformed() {
        let err = TaskPayload::from_json(
            r#"{"task_id":"1","task_key":"  ","task_name":"n","spec":{}}"#,
        )
        .unwrap_err();
        assert!(matches!(err, TaskError::MalformedInput(msg) if msg.contains("task_key")));
    }

    #[test]
    fn unknown_change_type_is_malformed() {
        let err = TaskPayload::from_json(
            r#"{"task_id":"1","task_key":"k","task_name":"n","spec":{
                "files_to_modify":[{"path":"a","changes":[{"type":"rename","to":"b"}]}]
            }}"#,
        )
        .unwrap_err();
        assert!(matches!(err, TaskError::MalformedInput(_)));
    }

    #[test]
    fn invalid_json_is_malformed() {
        assert!(matches!(
            TaskPayload::from_json("{not json"),
            Err(TaskError::MalformedInput(_))
        ));
    }
}
