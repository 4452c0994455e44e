//! Background worker trigger
//!
//! A trigger hands a freshly created task to the background worker. It only
//! waits for the worker platform to accept the job, never for the result.

use async_trait::async_trait;
use reqwest::StatusCode;

use crate::types::TriggerPayload;
use crate::Result;

pub mod http;

pub use http::HttpTrigger;

/// How the worker platform answered a trigger request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TriggerOutcome {
    Accepted,
    Rejected { status: StatusCode, body: String },
}

#[async_trait]
pub trait BackgroundTrigger: Send + Sync {
    /// Fire the trigger. Transport failures are errors; any answer from the
    /// platform is an outcome.
    async fn trigger(&self, payload: &TriggerPayload) -> Result<TriggerOutcome>;
}
