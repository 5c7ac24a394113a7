//! Request counters exposed on `/metrics` in Prometheus text format.

use std::sync::Arc;

use axum::extract::{MatchedPath, Request, State};
use axum::middleware::Next;
use axum::response::Response;
use prometheus::{Encoder, IntCounterVec, Opts, Registry, TextEncoder};

use crate::state::AppState;

/// Route label for requests that matched no route.
pub const INVALID_PATH: &str = "invalid path";

const REQUESTS_METRIC: &str = "registry_http_requests";

/// Counts requests by route and response status.
#[derive(Clone)]
pub struct RequestMetrics {
    requests: IntCounterVec,
}

impl RequestMetrics {
    /// Create the counters and register them on `registry`.
    pub fn register(registry: &Registry) -> Result<Self, prometheus::Error> {
        let requests = IntCounterVec::new(
            Opts::new(REQUESTS_METRIC, "HTTP requests by matched route and status"),
            &["route", "status"],
        )?;
        registry.register(Box::new(requests.clone()))?;
        Ok(Self { requests })
    }

    pub fn record(&self, route: &str, status: u16) {
        self.requests
            .with_label_values(&[route, &status.to_string()])
            .inc();
    }

    pub fn count(&self, route: &str, status: u16) -> u64 {
        self.requests
            .with_label_values(&[route, &status.to_string()])
            .get()
    }
}

/// Encode everything gathered by `registry` in the text exposition format.
pub fn encode(registry: &Registry) -> Result<String, prometheus::Error> {
    let encoder = TextEncoder::new();
    let mut buffer = Vec::new();
    encoder.encode(&registry.gather(), &mut buffer)?;
    Ok(String::from_utf8_lossy(&buffer).to_string())
}

/// Route-layer middleware: counts every request that matched a route.
/// Unmatched requests are counted by the fallback handler.
pub async fn track_requests(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Response {
    let route = request
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_string())
        .unwrap_or_else(|| INVALID_PATH.to_string());

    let response = next.run(request).await;
    state.metrics.record(&route, response.status().as_u16());
    response
}
