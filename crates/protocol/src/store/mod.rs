//! Aggregation store: raw documents plus an ordered patch set, rendered on demand.
//!
//! Documents are kept as raw bytes and re-read on every render so patch
//! changes apply to everything already registered. Per-document failures
//! are logged and omitted; a render never fails as a whole.

mod key;

use std::collections::BTreeMap;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use serde::Serialize;
use tracing::{debug, warn};

use crate::error::Result;
use crate::patch::apply_patches;
use crate::read::{read_document, ReadOptions};
use crate::render::{
    alert_group, dashboard_filename, AlertRuleDocument, Dashboard, DashboardRenderer, Renderer,
};
use crate::schema::{Document, Patch};

pub use key::DocumentKey;

/// Returned when the store falls back to an empty rule set.
pub const EMPTY_ALERT_RULES: &str = "groups: []\n";

/// Whether an upsert added a new key or replaced an existing document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Upsert {
    Created,
    Replaced,
}

/// A rendered dashboard and the file name it should be published under.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardArtifact {
    pub key: DocumentKey,
    pub filename: String,
    pub dashboard: Dashboard,
}

#[derive(Debug, Clone)]
struct StoredDocument {
    raw: Vec<u8>,
    options: ReadOptions,
}

#[derive(Debug, Default)]
struct StoreState {
    documents: BTreeMap<DocumentKey, StoredDocument>,
    patches: Vec<Patch>,
}

impl StoreState {
    fn patched(&self, key: &DocumentKey, stored: &StoredDocument) -> Result<Document> {
        let patched = apply_patches(&self.patches, &stored.raw)?;
        let document = read_document(&patched, &stored.options)?;
        debug!(key = %key, "rendered document");
        Ok(document)
    }
}

/// Thread-safe document and patch registry.
#[derive(Debug, Default)]
pub struct AggregationStore {
    state: RwLock<StoreState>,
}

impl AggregationStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> RwLockReadGuard<'_, StoreState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, StoreState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    // ── Mutation ────────────────────────────────────────────────────

    /// Insert or wholesale-replace the document stored under `key`.
    pub fn upsert(&self, key: DocumentKey, raw: impl Into<Vec<u8>>) -> Upsert {
        self.upsert_with(key, raw, ReadOptions::default())
    }

    /// Like [`upsert`](Self::upsert), with the read options used every time
    /// the document is rendered.
    pub fn upsert_with(
        &self,
        key: DocumentKey,
        raw: impl Into<Vec<u8>>,
        options: ReadOptions,
    ) -> Upsert {
        let stored = StoredDocument {
            raw: raw.into(),
            options,
        };
        let previous = self.write().documents.insert(key.clone(), stored);
        let outcome = if previous.is_some() {
            Upsert::Replaced
        } else {
            Upsert::Created
        };
        debug!(key = %key, ?outcome, "upserted document");
        outcome
    }

    /// Remove `key`; returns `false` when it was not stored.
    pub fn delete(&self, key: &DocumentKey) -> bool {
        let removed = self.write().documents.remove(key).is_some();
        if removed {
            debug!(key = %key, "deleted document");
        }
        removed
    }

    /// Replace the whole patch set.
    pub fn replace_patches(&self, patches: Vec<Patch>) {
        let count = patches.len();
        self.write().patches = patches;
        debug!(count, "replaced patch set");
    }

    /// Append a patch after the existing ones.
    pub fn push_patch(&self, patch: Patch) {
        self.write().patches.push(patch);
    }

    // ── Inspection ──────────────────────────────────────────────────

    pub fn contains(&self, key: &DocumentKey) -> bool {
        self.read().documents.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.read().documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().documents.is_empty()
    }

    pub fn keys(&self) -> Vec<DocumentKey> {
        self.read().documents.keys().cloned().collect()
    }

    pub fn patches(&self) -> Vec<Patch> {
        self.read().patches.clone()
    }

    /// The unpatched bytes stored under `key`.
    pub fn raw(&self, key: &DocumentKey) -> Option<Vec<u8>> {
        self.read().documents.get(key).map(|d| d.raw.clone())
    }

    // ── Rendering ───────────────────────────────────────────────────

    /// The patched, validated document under `key`.
    pub fn document(&self, key: &DocumentKey) -> Option<Result<Document>> {
        let state = self.read();
        state
            .documents
            .get(key)
            .map(|stored| state.patched(key, stored))
    }

    /// Every document that patches and validates cleanly, in key order.
    pub fn documents(&self) -> Vec<(DocumentKey, Document)> {
        self.render_with(&|document: &Document| -> Result<Document> { Ok(document.clone()) })
    }

    /// Run `renderer` over every patched document in key order, skipping
    /// documents that fail to patch, validate or render.
    pub fn render_with<R: Renderer>(&self, renderer: &R) -> Vec<(DocumentKey, R::Output)> {
        let state = self.read();
        state
            .documents
            .iter()
            .filter_map(|(key, stored)| {
                let rendered = state
                    .patched(key, stored)
                    .and_then(|document| renderer.render(&document));
                match rendered {
                    Ok(output) => Some((key.clone(), output)),
                    Err(e) => {
                        warn!(key = %key, error = %e, "skipping document that failed to render");
                        None
                    }
                }
            })
            .collect()
    }

    /// Render a single document. `None` when `key` is not stored.
    pub fn render_one<R: Renderer>(
        &self,
        key: &DocumentKey,
        renderer: &R,
    ) -> Option<Result<R::Output>> {
        self.document(key)
            .map(|document| document.and_then(|d| renderer.render(&d)))
    }

    /// One alert group per document, named `namespace/name`.
    pub fn alert_rule_document(&self) -> AlertRuleDocument {
        let groups = self
            .render_with(&|document: &Document| -> Result<_> { Ok(alert_group(document)) })
            .into_iter()
            .map(|(key, mut group)| {
                group.name = key.to_string();
                group
            })
            .collect();
        AlertRuleDocument { groups }
    }

    /// Merged Prometheus rule file. Falls back to [`EMPTY_ALERT_RULES`]
    /// when serialization fails.
    pub fn alert_rules(&self) -> String {
        match self.alert_rule_document().to_yaml() {
            Ok(yaml) => yaml,
            Err(e) => {
                warn!(error = %e, "could not serialize alert rules");
                EMPTY_ALERT_RULES.to_string()
            }
        }
    }

    /// One dashboard artifact per document.
    pub fn dashboards(&self) -> Vec<DashboardArtifact> {
        self.render_with(&|document: &Document| -> Result<_> {
            Ok((dashboard_filename(document)?, DashboardRenderer.render(document)?))
        })
        .into_iter()
        .map(|(key, (filename, dashboard))| DashboardArtifact {
            key,
            filename,
            dashboard,
        })
        .collect()
    }
}
