//! Shared doubles and helpers for router tests

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use broodje::api::{create_router, AppState};
use broodje::llm::{Completion, LanguageModel};
use broodje::store::{MemoryTaskStore, TaskStore};
use broodje::trigger::{BackgroundTrigger, TriggerOutcome};
use broodje::types::{NewTask, RecipeModel, TaskRecord, TaskState, TaskUpdate, TriggerPayload};
use broodje::{Error, Result};
use http_body_util::BodyExt;
use reqwest::StatusCode as ReqwestStatus;
use tower::ServiceExt;

/// What the recording trigger answers
#[derive(Clone)]
pub enum TriggerReply {
    Accept,
    Reject(u16),
    Unreachable,
}

/// Trigger that records every payload it receives
pub struct RecordingTrigger {
    reply: TriggerReply,
    pub calls: Mutex<Vec<TriggerPayload>>,
}

impl RecordingTrigger {
    pub fn new(reply: TriggerReply) -> Arc<Self> {
        Arc::new(Self {
            reply,
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> Vec<TriggerPayload> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl BackgroundTrigger for RecordingTrigger {
    async fn trigger(&self, payload: &TriggerPayload) -> Result<TriggerOutcome> {
        self.calls.lock().unwrap().push(payload.clone());
        match self.reply {
            TriggerReply::Accept => Ok(TriggerOutcome::Accepted),
            TriggerReply::Reject(code) => Ok(TriggerOutcome::Rejected {
                status: ReqwestStatus::from_u16(code).unwrap(),
                body: "nope".into(),
            }),
            TriggerReply::Unreachable => Err(Error::trigger("connection refused")),
        }
    }
}

/// LLM that answers every prompt with the same text, or fails
pub struct ScriptedModel {
    reply: std::result::Result<String, String>,
    pub models: Mutex<Vec<RecipeModel>>,
}

impl ScriptedModel {
    pub fn answering(text: &str) -> Arc<Self> {
        Arc::new(Self {
            reply: Ok(text.to_string()),
            models: Mutex::new(Vec::new()),
        })
    }

    pub fn failing(message: &str) -> Arc<Self> {
        Arc::new(Self {
            reply: Err(message.to_string()),
            models: Mutex::new(Vec::new()),
        })
    }
}

#[async_trait]
impl LanguageModel for ScriptedModel {
    async fn complete(&self, model: RecipeModel, _prompt: &str) -> Result<Completion> {
        self.models.lock().unwrap().push(model);
        match &self.reply {
            Ok(text) => Ok(Completion {
                text: text.clone(),
                usage: None,
            }),
            Err(msg) => Err(Error::llm(msg.clone())),
        }
    }
}

/// Store whose every operation fails
pub struct BrokenStore;

#[async_trait]
impl TaskStore for BrokenStore {
    async fn insert(&self, _task: NewTask) -> Result<TaskRecord> {
        Err(Error::store("database unavailable"))
    }

    async fn get(&self, _task_id: &str) -> Result<Option<TaskRecord>> {
        Err(Error::store("database unavailable"))
    }

    async fn state(&self, _task_id: &str) -> Result<Option<TaskState>> {
        Err(Error::store("database unavailable"))
    }

    async fn update(&self, _task_id: &str, _update: TaskUpdate) -> Result<()> {
        Err(Error::store("database unavailable"))
    }

    fn backend_name(&self) -> &'static str {
        "broken"
    }
}

/// Store that accepts inserts and reads but refuses every update
#[derive(Default)]
pub struct ReadOnlyStore {
    inner: MemoryTaskStore,
}

#[async_trait]
impl TaskStore for ReadOnlyStore {
    async fn insert(&self, task: NewTask) -> Result<TaskRecord> {
        self.inner.insert(task).await
    }

    async fn get(&self, task_id: &str) -> Result<Option<TaskRecord>> {
        self.inner.get(task_id).await
    }

    async fn state(&self, task_id: &str) -> Result<Option<TaskState>> {
        self.inner.state(task_id).await
    }

    async fn update(&self, _task_id: &str, _update: TaskUpdate) -> Result<()> {
        Err(Error::store("update rejected"))
    }

    fn backend_name(&self) -> &'static str {
        "read-only"
    }
}

pub struct TestApp {
    pub router: Router,
    pub store: Arc<MemoryTaskStore>,
    pub trigger: Arc<RecordingTrigger>,
}

pub fn app(reply: TriggerReply, llm: Option<Arc<ScriptedModel>>) -> TestApp {
    let store = Arc::new(MemoryTaskStore::new());
    let trigger = RecordingTrigger::new(reply);

    let mut state = AppState::new(store.clone(), trigger.clone());
    if let Some(llm) = llm {
        state = state.with_llm(llm);
    }

    TestApp {
        router: create_router(state.with_worker(true)),
        store,
        trigger,
    }
}

pub async fn send(
    router: &Router,
    method: &str,
    uri: &str,
    body: Option<String>,
) -> (StatusCode, serde_json::Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(body) => {
            builder = builder.header("content-type", "application/json");
            Body::from(body)
        }
        None => Body::empty(),
    };

    let response = router
        .clone()
        .oneshot(builder.body(body).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = if bytes.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or_else(|_| {
            panic!("non-JSON body: {}", String::from_utf8_lossy(&bytes))
        })
    };
    (status, json)
}

pub async fn post_json(
    router: &Router,
    uri: &str,
    body: serde_json::Value,
) -> (StatusCode, serde_json::Value) {
    send(router, "POST", uri, Some(body.to_string())).await
}
