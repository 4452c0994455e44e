//! HTTP API server

use axum::{
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

pub mod error;
pub mod handlers;
pub mod state;

pub use error::ApiError;
pub use state::AppState;

/// Build the API router using the provided application state
pub fn create_router(state: AppState) -> Router {
    let mut api = Router::new()
        .route("/generate-start", post(handlers::generate_start))
        .route("/generate-status/:task_id", get(handlers::generate_status))
        .route("/generate", post(handlers::generate_sync));

    if state.worker_enabled {
        api = api.route("/background/generate", post(handlers::background_generate));
    }

    Router::new()
        .route("/health", get(handlers::health))
        .nest("/api", api)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}
