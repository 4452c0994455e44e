//! Task store abstraction layer
//!
//! Provides a unified interface for the in-memory store and the hosted
//! Supabase (PostgREST) datastore.

use std::time::Duration;

use async_trait::async_trait;

use crate::types::{NewTask, TaskRecord, TaskState, TaskUpdate};
use crate::Result;

pub mod memory;
pub mod supabase;

pub use memory::MemoryTaskStore;
pub use supabase::SupabaseTaskStore;

/// Task store trait
#[async_trait]
pub trait TaskStore: Send + Sync {
    /// Insert a new task and return the stored record, including its id
    async fn insert(&self, task: NewTask) -> Result<TaskRecord>;

    /// Fetch a task by id; `None` if no such task exists
    async fn get(&self, task_id: &str) -> Result<Option<TaskRecord>>;

    /// Fetch only the lifecycle fields of a task; `None` if no such task exists
    async fn state(&self, task_id: &str) -> Result<Option<TaskState>>;

    /// Apply a partial update to a task
    async fn update(&self, task_id: &str, update: TaskUpdate) -> Result<()>;

    /// Short backend name for logs and health output
    fn backend_name(&self) -> &'static str;
}

/// Store configuration
#[derive(Debug, Clone, PartialEq)]
pub enum StoreConfig {
    Memory,
    Supabase {
        url: String,
        key: String,
        table: String,
        timeout: Duration,
    },
}

/// Create task store from config
pub fn create_store(config: StoreConfig) -> Result<Box<dyn TaskStore>> {
    match config {
        StoreConfig::Memory => Ok(Box::new(MemoryTaskStore::new())),
        StoreConfig::Supabase {
            url,
            key,
            table,
            timeout,
        } => {
            let store = SupabaseTaskStore::new(url, key, table, timeout)?;
            Ok(Box::new(store))
        }
    }
}
