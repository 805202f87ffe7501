//! HTTP router setup.

use crate::handlers;
use crate::middleware;
use crate::state::AppState;
use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Create the application router.
pub fn create(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route("/ready", get(handlers::ready))
        .route("/metrics", get(handlers::metrics))
        .route("/v1/policies", get(handlers::policies))
        .route("/v1/plans", get(handlers::plans))
        .route("/v1/breakdown", post(handlers::breakdown))
        .route("/v1/earnings", post(handlers::earnings))
        .layer(axum::middleware::from_fn(middleware::inject_request_id))
        .layer(TraceLayer::new_for_http())
        // Dashboard is served from a different origin.
        .layer(CorsLayer::permissive())
        .with_state(state)
}
