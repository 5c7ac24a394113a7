//! HTTP router construction.

use std::sync::Arc;

use axum::middleware;
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;

use crate::api;
use crate::metrics::track_requests;
use crate::state::AppState;

/// Build the complete application router with all routes and middleware.
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(api::health))
        .route("/metrics", get(api::metrics))
        .route("/v1/register", post(api::register))
        .route("/v1/indicator-documents", get(api::indicator_documents))
        .route("/v1/alert-rules", get(api::alert_rules))
        .route("/v1/dashboards", get(api::dashboards))
        // Only matched routes pass through the counter; the fallback counts itself.
        .route_layer(middleware::from_fn_with_state(state.clone(), track_requests))
        .fallback(api::not_found)
        .layer(CorsLayer::permissive())
        .with_state(state)
}
