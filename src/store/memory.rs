//! In-process task store

use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use uuid::Uuid;

use crate::types::{NewTask, TaskRecord, TaskState, TaskUpdate};
use crate::{Error, Result};

use super::TaskStore;

/// Task store backed by a concurrent map. Records do not survive a restart.
#[derive(Default)]
pub struct MemoryTaskStore {
    tasks: DashMap<String, TaskRecord>,
}

impl MemoryTaskStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}

#[async_trait]
impl TaskStore for MemoryTaskStore {
    async fn insert(&self, task: NewTask) -> Result<TaskRecord> {
        let record = TaskRecord {
            task_id: Uuid::new_v4().to_string(),
            idea: task.idea,
            model: task.model,
            status: task.status,
            recipe: None,
            estimated_cost: None,
            error_message: None,
            created_at: Some(Utc::now()),
        };
        self.tasks.insert(record.task_id.clone(), record.clone());
        Ok(record)
    }

    async fn get(&self, task_id: &str) -> Result<Option<TaskRecord>> {
        Ok(self.tasks.get(task_id).map(|entry| entry.value().clone()))
    }

    async fn state(&self, task_id: &str) -> Result<Option<TaskState>> {
        Ok(self.get(task_id).await?.map(TaskState::from))
    }

    async fn update(&self, task_id: &str, update: TaskUpdate) -> Result<()> {
        let mut entry = self
            .tasks
            .get_mut(task_id)
            .ok_or_else(|| Error::store(format!("task {} not found", task_id)))?;
        update.apply(entry.value_mut());
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{RecipeModel, TaskStatus};

    #[tokio::test]
    async fn insert_assigns_unique_ids() {
        let store = MemoryTaskStore::new();
        let a = store
            .insert(NewTask::pending("kaas", RecipeModel::Gpt4o))
            .await
            .unwrap();
        let b = store
            .insert(NewTask::pending("ham", RecipeModel::Gpt4o))
            .await
            .unwrap();

        assert_ne!(a.task_id, b.task_id);
        assert_eq!(a.status, TaskStatus::Pending);
        assert!(a.created_at.is_some());
        assert_eq!(store.len(), 2);
    }

    #[tokio::test]
    async fn update_then_get() {
        let store = MemoryTaskStore::new();
        let task = store
            .insert(NewTask::pending("kaas", RecipeModel::Gpt35Turbo))
            .await
            .unwrap();

        store
            .update(&task.task_id, TaskUpdate::failed("no luck"))
            .await
            .unwrap();

        let stored = store.get(&task.task_id).await.unwrap().unwrap();
        assert_eq!(stored.status, TaskStatus::Failed);
        assert_eq!(stored.error_message.as_deref(), Some("no luck"));
    }

    #[tokio::test]
    async fn state_reflects_latest_update() {
        let store = MemoryTaskStore::new();
        let task = store
            .insert(NewTask::pending("kaas", RecipeModel::Gpt4o))
            .await
            .unwrap();

        store
            .update(&task.task_id, TaskUpdate::completed("Broodje kaas"))
            .await
            .unwrap();

        let state = store.state(&task.task_id).await.unwrap().unwrap();
        assert_eq!(state.task_id, task.task_id);
        assert_eq!(state.status, TaskStatus::Completed);
        assert_eq!(state.recipe.as_deref(), Some("Broodje kaas"));
        assert!(store.state("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn unknown_task() {
        let store = MemoryTaskStore::new();
        assert!(store.get("missing").await.unwrap().is_none());
        assert!(store
            .update("missing", TaskUpdate::processing())
            .await
            .is_err());
    }
}
