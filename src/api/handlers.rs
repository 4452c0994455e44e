//! API handlers

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::api::{ApiError, AppState};
use crate::prompt::{clean_recipe, recipe_prompt};
use crate::trigger::TriggerOutcome;
use crate::types::{NewTask, RecipeModel, TaskId, TaskStatus, TaskUpdate, TriggerPayload};
use crate::{worker, Error};

/// Health check with system status
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        store: state.store.backend_name().to_string(),
        llm_configured: state.llm.is_some(),
        worker_enabled: state.worker_enabled,
    })
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub store: String,
    pub llm_configured: bool,
    pub worker_enabled: bool,
}

/// Request body for both generation endpoints
///
/// Fields stay untyped so a wrongly typed `idea` or `model` is judged by the
/// validation rules instead of failing the whole body.
#[derive(Debug, Default, Deserialize)]
pub struct GenerateRequest {
    pub idea: Option<Value>,
    pub model: Option<Value>,
}

impl GenerateRequest {
    /// Validate the body and resolve the model against the allow-list.
    fn validate(
        payload: Result<Json<GenerateRequest>, JsonRejection>,
        default_model: RecipeModel,
    ) -> Result<(String, RecipeModel), ApiError> {
        let Json(request) = payload.map_err(|rejection| {
            tracing::debug!(error = %rejection, "Rejected request body");
            ApiError::bad_request("Invalid JSON data")
        })?;

        let idea = request
            .idea
            .as_ref()
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|idea| !idea.is_empty())
            .ok_or_else(|| ApiError::bad_request("No idea provided"))?
            .to_string();

        let (model, fell_back) = match &request.model {
            None | Some(Value::Null) => (default_model, false),
            Some(Value::String(id)) => RecipeModel::resolve(Some(id), default_model),
            Some(_) => (default_model, true),
        };
        if fell_back {
            tracing::warn!(
                requested = ?request.model,
                %model,
                "Unsupported model requested, using default"
            );
        }

        Ok((idea, model))
    }
}

/// Start an asynchronous recipe generation
///
/// Creates a pending task, hands it to the background worker and returns the
/// task id with `202 Accepted`.
pub async fn generate_start(
    State(state): State<AppState>,
    payload: Result<Json<GenerateRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<GenerateStartResponse>), ApiError> {
    let (idea, model) = GenerateRequest::validate(payload, RecipeModel::ASYNC_DEFAULT)?;

    tracing::info!(%idea, %model, "Inserting task");
    let task = state
        .store
        .insert(NewTask::pending(idea, model))
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Failed to insert task");
            ApiError::internal(format!(
                "Failed to create task record in database: {}",
                e
            ))
        })?;

    let task_id = task.task_id;
    tracing::info!(%task_id, "Task record created");

    let payload = TriggerPayload {
        task_id: task_id.clone(),
        idea: task.idea,
        model: task.model,
    };

    let failure = match state.trigger.trigger(&payload).await {
        Ok(TriggerOutcome::Accepted) => None,
        Ok(TriggerOutcome::Rejected { status, body }) => {
            tracing::warn!(%task_id, status = status.as_u16(), %body, "Background trigger rejected");
            Some((
                format!(
                    "Failed to trigger background function (HTTP {})",
                    status.as_u16()
                ),
                format!(
                    "Failed to trigger background generation task (HTTP {})",
                    status.as_u16()
                ),
            ))
        }
        Err(err) => {
            let detail = match err {
                Error::Trigger(msg) => msg,
                other => other.to_string(),
            };
            tracing::warn!(%task_id, error = %detail, "Background trigger failed");
            Some((
                format!("Network error triggering background function: {}", detail),
                format!(
                    "Network error triggering background generation task: {}",
                    detail
                ),
            ))
        }
    };

    if let Some((task_message, response_message)) = failure {
        if let Err(e) = state
            .store
            .update(&task_id, TaskUpdate::failed(task_message))
            .await
        {
            tracing::error!(%task_id, error = %e, "Failed to mark task as failed");
        }
        return Err(ApiError::internal(response_message));
    }

    tracing::info!(%task_id, "Background worker triggered");
    Ok((StatusCode::ACCEPTED, Json(GenerateStartResponse { task_id })))
}

#[derive(Debug, Serialize, Deserialize)]
pub struct GenerateStartResponse {
    pub task_id: TaskId,
}

/// Poll the state of an asynchronous generation
pub async fn generate_status(
    State(state): State<AppState>,
    Path(task_id): Path<String>,
) -> Result<Json<TaskStatusResponse>, ApiError> {
    let task = state.store.state(&task_id).await.map_err(|e| {
        tracing::error!(%task_id, error = %e, "Failed to query task");
        ApiError::internal(format!("Database query failed: {}", e)).with_task_status("error")
    })?;

    let task = task.ok_or_else(|| {
        ApiError::not_found("Task ID not found in database").with_task_status("not_found")
    })?;

    Ok(Json(TaskStatusResponse {
        task_id: task.task_id,
        status: task.status,
        recipe: task.recipe,
        estimated_cost: task.estimated_cost,
        error: task.error_message,
        created_at: task.created_at,
    }))
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TaskStatusResponse {
    pub task_id: TaskId,
    pub status: TaskStatus,
    pub recipe: Option<String>,
    pub estimated_cost: Option<f64>,
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

/// Generate a recipe synchronously
pub async fn generate_sync(
    State(state): State<AppState>,
    payload: Result<Json<GenerateRequest>, JsonRejection>,
) -> Result<Json<RecipeResponse>, ApiError> {
    let llm = state
        .llm
        .clone()
        .ok_or_else(|| ApiError::internal("LLM client not initialized. Check API key."))?;

    let (idea, model) = GenerateRequest::validate(payload, RecipeModel::SYNC_DEFAULT)?;

    let completion = llm
        .complete(model, &recipe_prompt(&idea))
        .await
        .map_err(|e| {
            tracing::error!(%model, error = %e, "Synchronous generation failed");
            ApiError::internal("Failed to generate recipe (sync)")
        })?;

    Ok(Json(RecipeResponse {
        recipe: clean_recipe(&completion.text),
        estimated_cost: None,
    }))
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RecipeResponse {
    pub recipe: String,
    pub estimated_cost: Option<f64>,
}

/// Body sent by the trigger to the background worker endpoint
#[derive(Debug, Default, Deserialize)]
pub struct BackgroundRequest {
    pub task_id: Option<String>,
    pub idea: Option<String>,
    pub model: Option<String>,
}

/// Background worker entry point
///
/// Accepts the job and processes it on a separate task, like a serverless
/// background function would.
pub async fn background_generate(
    State(state): State<AppState>,
    payload: Result<Json<BackgroundRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<GenerateStartResponse>), ApiError> {
    let Json(request) = payload.map_err(|_| ApiError::bad_request("Invalid request body"))?;

    let non_empty = |v: Option<String>| v.filter(|s| !s.trim().is_empty());
    let (Some(task_id), Some(idea), Some(model)) = (
        non_empty(request.task_id),
        non_empty(request.idea),
        non_empty(request.model),
    ) else {
        return Err(ApiError::bad_request("Missing required fields"));
    };

    let llm = state
        .llm
        .clone()
        .ok_or_else(|| ApiError::internal("Background worker clients not initialized."))?;

    let (model, fell_back) = RecipeModel::resolve(Some(&model), RecipeModel::ASYNC_DEFAULT);
    if fell_back {
        tracing::warn!(%task_id, %model, "Unsupported model in trigger payload, using default");
    }

    let payload = TriggerPayload {
        task_id: task_id.clone(),
        idea,
        model,
    };
    tokio::spawn(worker::process_task(state.store.clone(), llm, payload));

    Ok((StatusCode::ACCEPTED, Json(GenerateStartResponse { task_id })))
}
