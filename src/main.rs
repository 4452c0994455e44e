//! Broodje server binary

use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use broodje::api::{create_router, AppState};
use broodje::config::{AppConfig, LogFormat};
use broodje::llm::{LanguageModel, OpenAiClient};
use broodje::store::{create_store, TaskStore};
use broodje::trigger::{BackgroundTrigger, HttpTrigger};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::load().context("failed to load configuration")?;

    init_tracing(&config)?;

    let store_config = config
        .store_runtime()
        .context("invalid store configuration")?;
    let store: Arc<dyn TaskStore> = Arc::from(create_store(store_config)?);
    tracing::info!(backend = store.backend_name(), "Task store initialised");

    let trigger = HttpTrigger::new(
        config.trigger.url.clone(),
        config.trigger.connect_timeout(),
        config.trigger.timeout(),
    )
    .context("failed to build background trigger client")?;
    tracing::info!(url = trigger.url(), "Background trigger configured");
    let trigger: Arc<dyn BackgroundTrigger> = Arc::new(trigger);

    let mut state = AppState::new(store, trigger).with_worker(config.worker.enabled);

    match build_llm(&config)? {
        Some(llm) => state = state.with_llm(llm),
        None => tracing::warn!(
            "No LLM API key configured (OPENAI_API_KEY); synchronous generation and the worker are unavailable"
        ),
    }

    let router = create_router(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind to {}", addr))?;
    tracing::info!(%addr, worker = config.worker.enabled, "Listening for HTTP traffic");

    axum::serve(listener, router).await?;

    Ok(())
}

fn build_llm(config: &AppConfig) -> anyhow::Result<Option<Arc<dyn LanguageModel>>> {
    let Some(api_key) = config.llm.api_key.clone() else {
        return Ok(None);
    };

    let client = OpenAiClient::new(api_key, config.llm.base_url.clone(), config.llm.timeout())
        .context("failed to build LLM client")?;
    tracing::info!(base_url = %config.llm.base_url, "LLM client initialised");

    Ok(Some(Arc::new(client)))
}

fn init_tracing(config: &AppConfig) -> anyhow::Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.logging.level.clone()))
        .unwrap_or_else(|_| EnvFilter::new("broodje=info"));

    let registry = tracing_subscriber::registry().with(env_filter);

    match config.logging.format {
        LogFormat::Json => {
            registry
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
        LogFormat::Text => {
            registry.with(tracing_subscriber::fmt::layer()).init();
        }
    }

    Ok(())
}
