use super::stored_entity::{deserialize_id, deserialize_optional_id, StoredEntity};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub start_date: String,
    #[serde(default)]
    pub end_date: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub priority: String,
    #[serde(
        default,
        deserialize_with = "deserialize_optional_id",
        skip_serializing_if = "Option::is_none"
    )]
    pub project_id: Option<String>,
}

impl Task {
    pub fn from_draft(id: String, project_id: &str, draft: &TaskDraft) -> Self {
        Self {
            id,
            name: draft.name.clone(),
            description: draft.description.clone(),
            start_date: draft.start_date.clone(),
            end_date: draft.end_date.clone(),
            status: draft.status.clone(),
            priority: draft.priority.clone(),
            project_id: Some(project_id.to_string()),
        }
    }

    pub fn apply(&mut self, draft: &TaskDraft) {
        self.name = draft.name.clone();
        self.description = draft.description.clone();
        self.start_date = draft.start_date.clone();
        self.end_date = draft.end_date.clone();
        self.status = draft.status.clone();
        self.priority = draft.priority.clone();
    }
}

impl StoredEntity for Task {
    const COLLECTION: &'static str = "tasks";

    fn id(&self) -> &str {
        &self.id
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskDraft {
    pub name: String,
    pub description: String,
    pub start_date: String,
    pub end_date: String,
    pub status: String,
    pub priority: String,
}

impl TaskDraft {
    pub fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("Task name cannot be empty".to_string());
        }
        if !self.start_date.is_empty() && !self.end_date.is_empty() && self.end_date < self.start_date
        {
            return Err("Task end date must not precede its start date".to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_payload_with_numeric_project_id() {
        let task: Task = serde_json::from_str(
            r#"{"id":"42","name":"Draft report","status":"pending","priority":"low","projectId":7}"#,
        )
        .unwrap();
        assert_eq!(task.project_id.as_deref(), Some("7"));
        assert_eq!(task.description, "");
    }

    #[test]
    fn draft_rejects_inverted_dates() {
        let draft = TaskDraft {
            name: "Draft report".into(),
            start_date: "2024-01-01T10:00".into(),
            end_date: "2024-01-01T09:00".into(),
            ..TaskDraft::default()
        };
        assert!(draft.validate().is_err());
    }
}
