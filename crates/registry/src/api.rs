//! HTTP handlers.

use std::collections::BTreeMap;
use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::{Query, State};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use serde::Serialize;
use tracing::{info, warn};

use indicator_protocol::render::Dashboard;
use indicator_protocol::{read_document, Document, DocumentKey, ReadOptions};

use crate::metrics::{encode, INVALID_PATH};
use crate::state::AppState;

const YAML_CONTENT_TYPE: &str = "application/yaml";
const PROMETHEUS_CONTENT_TYPE: &str = "text/plain; version=0.0.4";

// ── Health ────────────────────────────────────────────────────────

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub documents: usize,
    pub patches: usize,
}

pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        documents: state.store.len(),
        patches: state.store.patches().len(),
    })
}

// ── Registration ──────────────────────────────────────────────────

/// `POST /v1/register`: the body is a YAML indicator document. Query
/// parameters, when present, replace the document's metadata.
pub async fn register(
    State(state): State<Arc<AppState>>,
    Query(params): Query<BTreeMap<String, String>>,
    body: Bytes,
) -> Result<StatusCode, (StatusCode, String)> {
    let options = if params.is_empty() {
        ReadOptions::default()
    } else {
        ReadOptions::default().override_metadata(params)
    };

    let document = read_document(&body, &options).map_err(|e| {
        warn!(error = %e, "rejected indicator document");
        (StatusCode::BAD_REQUEST, e.to_string())
    })?;

    let key = DocumentKey::for_document(&document);
    let outcome = state.store.upsert_with(key.clone(), body.to_vec(), options);
    info!(
        key = %key,
        product = %document.product.name,
        version = %document.product.version,
        ?outcome,
        "registered indicator document"
    );
    Ok(StatusCode::OK)
}

// ── Rendered views ────────────────────────────────────────────────

#[derive(Serialize)]
pub struct DocumentResponse {
    pub key: String,
    #[serde(flatten)]
    pub document: Document,
}

/// `GET /v1/indicator-documents`: every stored document with patches applied.
pub async fn indicator_documents(State(state): State<Arc<AppState>>) -> Json<Vec<DocumentResponse>> {
    let documents = state
        .store
        .documents()
        .into_iter()
        .map(|(key, document)| DocumentResponse {
            key: key.to_string(),
            document,
        })
        .collect();
    Json(documents)
}

pub async fn alert_rules(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, YAML_CONTENT_TYPE)],
        state.store.alert_rules(),
    )
}

/// `GET /v1/dashboards`: dashboard JSON keyed by file name.
pub async fn dashboards(State(state): State<Arc<AppState>>) -> Json<BTreeMap<String, Dashboard>> {
    let dashboards = state
        .store
        .dashboards()
        .into_iter()
        .map(|artifact| (artifact.filename, artifact.dashboard))
        .collect();
    Json(dashboards)
}

// ── Metrics & fallback ────────────────────────────────────────────

pub async fn metrics(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let body = encode(&state.registry).map_err(|e| {
        warn!(error = %e, "failed to encode metrics");
        (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
    })?;
    Ok(([(header::CONTENT_TYPE, PROMETHEUS_CONTENT_TYPE)], body))
}

pub async fn not_found(State(state): State<Arc<AppState>>) -> StatusCode {
    state.metrics.record(INVALID_PATH, StatusCode::NOT_FOUND.as_u16());
    StatusCode::NOT_FOUND
}
