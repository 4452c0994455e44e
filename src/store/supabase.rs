//! Supabase task store, spoken to through its PostgREST interface

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{RequestBuilder, Response};

use crate::types::{NewTask, TaskRecord, TaskState, TaskUpdate};
use crate::{Error, Result};

use super::TaskStore;

pub const DEFAULT_TABLE: &str = "async_tasks";

/// Supabase task store
pub struct SupabaseTaskStore {
    http: reqwest::Client,
    table_url: String,
    key: String,
}

impl SupabaseTaskStore {
    pub fn new(
        url: impl Into<String>,
        key: impl Into<String>,
        table: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let url = url.into();
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            table_url: format!("{}/rest/v1/{}", url.trim_end_matches('/'), table.into()),
            key: key.into(),
        })
    }

    fn authorized(&self, req: RequestBuilder) -> RequestBuilder {
        req.header("apikey", &self.key).bearer_auth(&self.key)
    }

    fn task_filter(task_id: &str) -> [(&'static str, String); 1] {
        [("task_id", format!("eq.{}", task_id))]
    }

    async fn check(resp: Response, op: &str) -> Result<Response> {
        if resp.status().is_success() {
            return Ok(resp);
        }
        let status = resp.status();
        let text = resp.text().await.unwrap_or_default();
        Err(Error::store(format!(
            "Supabase {} failed ({}): {}",
            op, status, text
        )))
    }
}

#[async_trait]
impl TaskStore for SupabaseTaskStore {
    async fn insert(&self, task: NewTask) -> Result<TaskRecord> {
        let resp = self
            .authorized(self.http.post(&self.table_url))
            .header("Prefer", "return=representation")
            .json(&task)
            .send()
            .await?;

        let rows: Vec<TaskRecord> = Self::check(resp, "insert").await?.json().await?;

        rows.into_iter()
            .next()
            .ok_or_else(|| Error::store("Supabase insert returned no rows"))
    }

    async fn get(&self, task_id: &str) -> Result<Option<TaskRecord>> {
        let resp = self
            .authorized(self.http.get(&self.table_url))
            .query(&Self::task_filter(task_id))
            .query(&[("select", "*")])
            .send()
            .await?;

        let rows: Vec<TaskRecord> = Self::check(resp, "select").await?.json().await?;

        Ok(rows.into_iter().next())
    }

    async fn state(&self, task_id: &str) -> Result<Option<TaskState>> {
        let resp = self
            .authorized(self.http.get(&self.table_url))
            .query(&Self::task_filter(task_id))
            .query(&[("select", TaskState::COLUMNS)])
            .send()
            .await?;

        let rows: Vec<TaskState> = Self::check(resp, "select").await?.json().await?;

        Ok(rows.into_iter().next())
    }

    async fn update(&self, task_id: &str, update: TaskUpdate) -> Result<()> {
        let resp = self
            .authorized(self.http.patch(&self.table_url))
            .query(&Self::task_filter(task_id))
            .header("Prefer", "return=minimal")
            .json(&update)
            .send()
            .await?;

        Self::check(resp, "update").await?;
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "supabase"
    }
}
