//! API server state

use std::sync::Arc;

use crate::llm::LanguageModel;
use crate::store::TaskStore;
use crate::trigger::BackgroundTrigger;

/// API server state
#[derive(Clone)]
pub struct AppState {
    /// Task records
    pub store: Arc<dyn TaskStore>,

    /// Hands new tasks to the background worker
    pub trigger: Arc<dyn BackgroundTrigger>,

    /// LLM client; `None` when no API key is configured
    pub llm: Option<Arc<dyn LanguageModel>>,

    /// Whether this node also serves the background worker endpoint
    pub worker_enabled: bool,
}

impl AppState {
    pub fn new(store: Arc<dyn TaskStore>, trigger: Arc<dyn BackgroundTrigger>) -> Self {
        Self {
            store,
            trigger,
            llm: None,
            worker_enabled: false,
        }
    }

    pub fn with_llm(mut self, llm: Arc<dyn LanguageModel>) -> Self {
        self.llm = Some(llm);
        self
    }

    pub fn with_worker(mut self, enabled: bool) -> Self {
        self.worker_enabled = enabled;
        self
    }
}
