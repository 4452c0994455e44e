//! Core types for broodje

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Task ID type, assigned by the task store
pub type TaskId = String;

/// Models a recipe may be generated with
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum RecipeModel {
    #[serde(rename = "gpt-3.5-turbo")]
    Gpt35Turbo,
    #[serde(rename = "gpt-4o")]
    Gpt4o,
}

impl RecipeModel {
    /// Default for background submissions
    pub const ASYNC_DEFAULT: RecipeModel = RecipeModel::Gpt4o;

    /// Default for the synchronous endpoint
    pub const SYNC_DEFAULT: RecipeModel = RecipeModel::Gpt35Turbo;

    pub const ALL: [RecipeModel; 2] = [RecipeModel::Gpt35Turbo, RecipeModel::Gpt4o];

    pub fn as_str(&self) -> &'static str {
        match self {
            RecipeModel::Gpt35Turbo => "gpt-3.5-turbo",
            RecipeModel::Gpt4o => "gpt-4o",
        }
    }

    /// Look up an allowed model by its identifier.
    pub fn parse(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|m| m.as_str() == id)
    }

    /// Resolve a requested model against the allow-list.
    ///
    /// Returns the model to use and whether the request had to fall back.
    /// A missing request is not considered a fallback.
    pub fn resolve(requested: Option<&str>, default: RecipeModel) -> (Self, bool) {
        match requested {
            None => (default, false),
            Some(id) => match Self::parse(id) {
                Some(model) => (model, false),
                None => (default, true),
            },
        }
    }
}

impl fmt::Display for RecipeModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lifecycle state of a task record
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    Pending,
    Processing,
    Completed,
    Failed,
}

/// Persisted state of one recipe-generation request
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TaskRecord {
    pub task_id: TaskId,
    pub idea: String,
    pub model: RecipeModel,
    pub status: TaskStatus,
    #[serde(default)]
    pub recipe: Option<String>,
    #[serde(default)]
    pub estimated_cost: Option<f64>,
    #[serde(default)]
    pub error_message: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// The part of a task record the status endpoint reports
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TaskState {
    pub task_id: TaskId,
    pub status: TaskStatus,
    #[serde(default)]
    pub recipe: Option<String>,
    #[serde(default)]
    pub estimated_cost: Option<f64>,
    #[serde(default)]
    pub error_message: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl TaskState {
    /// Columns to select when only the state is needed
    pub const COLUMNS: &'static str = "task_id,status,recipe,estimated_cost,error_message,created_at";
}

impl From<TaskRecord> for TaskState {
    fn from(record: TaskRecord) -> Self {
        Self {
            task_id: record.task_id,
            status: record.status,
            recipe: record.recipe,
            estimated_cost: record.estimated_cost,
            error_message: record.error_message,
            created_at: record.created_at,
        }
    }
}

/// Insert shape for a new task; the store assigns the id
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct NewTask {
    pub idea: String,
    pub model: RecipeModel,
    pub status: TaskStatus,
}

impl NewTask {
    pub fn pending(idea: impl Into<String>, model: RecipeModel) -> Self {
        Self {
            idea: idea.into(),
            model,
            status: TaskStatus::Pending,
        }
    }
}

/// Partial update of a task record. `None` fields are left untouched.
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct TaskUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<TaskStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recipe: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub estimated_cost: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

impl TaskUpdate {
    pub fn processing() -> Self {
        Self {
            status: Some(TaskStatus::Processing),
            ..Default::default()
        }
    }

    pub fn completed(recipe: impl Into<String>) -> Self {
        Self {
            status: Some(TaskStatus::Completed),
            recipe: Some(recipe.into()),
            ..Default::default()
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            status: Some(TaskStatus::Failed),
            error_message: Some(message.into()),
            ..Default::default()
        }
    }

    /// Apply this update to a record in place
    pub fn apply(&self, record: &mut TaskRecord) {
        if let Some(status) = self.status {
            record.status = status;
        }
        if let Some(recipe) = &self.recipe {
            record.recipe = Some(recipe.clone());
        }
        if let Some(cost) = self.estimated_cost {
            record.estimated_cost = Some(cost);
        }
        if let Some(message) = &self.error_message {
            record.error_message = Some(message.clone());
        }
    }
}

/// Body handed to the background worker
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TriggerPayload {
    pub task_id: TaskId,
    pub idea: String,
    pub model: RecipeModel,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_falls_back_on_unknown_model() {
        assert_eq!(
            RecipeModel::resolve(Some("gpt-5-ultra"), RecipeModel::ASYNC_DEFAULT),
            (RecipeModel::Gpt4o, true)
        );
        assert_eq!(
            RecipeModel::resolve(Some("gpt-3.5-turbo"), RecipeModel::ASYNC_DEFAULT),
            (RecipeModel::Gpt35Turbo, false)
        );
        assert_eq!(
            RecipeModel::resolve(None, RecipeModel::SYNC_DEFAULT),
            (RecipeModel::Gpt35Turbo, false)
        );
    }

    #[test]
    fn model_serializes_as_identifier() {
        let json = serde_json::to_string(&RecipeModel::Gpt35Turbo).unwrap();
        assert_eq!(json, "\"gpt-3.5-turbo\"");
        let model: RecipeModel = serde_json::from_str("\"gpt-4o\"").unwrap();
        assert_eq!(model, RecipeModel::Gpt4o);
    }

    #[test]
    fn update_only_touches_set_fields() {
        let mut record = TaskRecord {
            task_id: "t1".into(),
            idea: "kaas".into(),
            model: RecipeModel::Gpt4o,
            status: TaskStatus::Processing,
            recipe: None,
            estimated_cost: Some(2.5),
            error_message: None,
            created_at: None,
        };

        TaskUpdate::completed("Broodje kaas").apply(&mut record);

        assert_eq!(record.status, TaskStatus::Completed);
        assert_eq!(record.recipe.as_deref(), Some("Broodje kaas"));
        assert_eq!(record.estimated_cost, Some(2.5));
        assert!(record.error_message.is_none());
    }

    #[test]
    fn update_serializes_without_unset_fields() {
        let json = serde_json::to_value(TaskUpdate::failed("boom")).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "status": "failed", "error_message": "boom" })
        );
    }
}
