//! In-process background worker
//!
//! Does what the external background function does for a triggered task:
//! mark it processing, ask the LLM for a recipe, record the outcome.

use std::sync::Arc;

use crate::llm::LanguageModel;
use crate::prompt::{clean_recipe, recipe_prompt};
use crate::store::TaskStore;
use crate::types::{TaskUpdate, TriggerPayload};

/// Process one triggered task to completion.
///
/// Failures are recorded on the task rather than returned; store update
/// failures can only be logged.
pub async fn process_task(
    store: Arc<dyn TaskStore>,
    llm: Arc<dyn LanguageModel>,
    payload: TriggerPayload,
) {
    let task_id = payload.task_id.as_str();
    tracing::info!(%task_id, model = %payload.model, "Processing task");

    update_task(store.as_ref(), task_id, TaskUpdate::processing()).await;

    let prompt = recipe_prompt(&payload.idea);
    let update = match llm.complete(payload.model, &prompt).await {
        Ok(completion) => {
            tracing::info!(%task_id, "LLM call succeeded");
            TaskUpdate::completed(clean_recipe(&completion.text))
        }
        Err(err) => {
            tracing::error!(%task_id, error = %err, "LLM call failed");
            TaskUpdate::failed(format!("Failed during LLM call: {}", err))
        }
    };

    update_task(store.as_ref(), task_id, update).await;
}

async fn update_task(store: &dyn TaskStore, task_id: &str, update: TaskUpdate) {
    let status = update.status;
    if let Err(err) = store.update(task_id, update).await {
        tracing::error!(%task_id, ?status, error = %err, "Failed to update task");
    }
}
