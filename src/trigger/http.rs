//! HTTP trigger for serverless background functions

use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;

use crate::types::TriggerPayload;
use crate::{Error, Result};

use super::{BackgroundTrigger, TriggerOutcome};

/// POSTs the task payload to a background function URL.
///
/// Only `202 Accepted` counts as a successful hand-off.
pub struct HttpTrigger {
    http: reqwest::Client,
    url: String,
}

impl HttpTrigger {
    pub fn new(url: impl Into<String>, connect_timeout: Duration, timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder()
            .connect_timeout(connect_timeout)
            .timeout(timeout)
            .build()?;
        Ok(Self {
            http,
            url: url.into(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl BackgroundTrigger for HttpTrigger {
    async fn trigger(&self, payload: &TriggerPayload) -> Result<TriggerOutcome> {
        let resp = self
            .http
            .post(&self.url)
            .json(payload)
            .send()
            .await
            .map_err(|e| Error::trigger(e.to_string()))?;

        let status = resp.status();
        if status == StatusCode::ACCEPTED {
            return Ok(TriggerOutcome::Accepted);
        }

        let body = resp.text().await.unwrap_or_default();
        Ok(TriggerOutcome::Rejected { status, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::RecipeModel;
    use mockito::Matcher;
    use serde_json::json;

    fn payload() -> TriggerPayload {
        TriggerPayload {
            task_id: "t-1".into(),
            idea: "pindakaas met sambal".into(),
            model: RecipeModel::Gpt4o,
        }
    }

    fn trigger(url: String) -> HttpTrigger {
        HttpTrigger::new(url, Duration::from_millis(500), Duration::from_secs(2)).unwrap()
    }

    #[tokio::test]
    async fn accepted_on_202() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/background")
            .match_body(Matcher::Json(json!({
                "task_id": "t-1",
                "idea": "pindakaas met sambal",
                "model": "gpt-4o"
            })))
            .with_status(202)
            .create_async()
            .await;

        let outcome = trigger(format!("{}/background", server.url()))
            .trigger(&payload())
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(outcome, TriggerOutcome::Accepted);
    }

    #[tokio::test]
    async fn other_success_codes_are_rejections() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/background")
            .with_status(200)
            .with_body("done already?")
            .create_async()
            .await;

        let outcome = trigger(format!("{}/background", server.url()))
            .trigger(&payload())
            .await
            .unwrap();

        assert_eq!(
            outcome,
            TriggerOutcome::Rejected {
                status: StatusCode::OK,
                body: "done already?".into()
            }
        );
    }

    #[tokio::test]
    async fn unreachable_worker_is_an_error() {
        // Nothing listens on port 9 of the loopback interface.
        let err = trigger("http://127.0.0.1:9/background".into())
            .trigger(&payload())
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Trigger(_)));
    }
}
