//! Event-driven reconciliation of indicator resources into external artifacts.
//!
//! A resource source (an orchestrator watch, a directory, a test) delivers
//! typed [`ResourceEvent`]s; controllers keep an [`AggregationStore`] and a
//! sink of rendered artifacts in step with them.
//!
//! [`AggregationStore`]: crate::AggregationStore

mod alerts;
mod dashboards;

use std::collections::BTreeMap;

use crate::error::Result;
use crate::read::{read_document, ReadOptions};
use crate::store::DocumentKey;

pub use alerts::{AlertRulesController, AlertRulesSink};
pub use dashboards::{ArtifactSink, DashboardController, DASHBOARD_DATA_KEY, DASHBOARD_LABEL};

/// A named indicator document as delivered by a resource source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndicatorResource {
    pub namespace: String,
    pub name: String,
    pub spec: Vec<u8>,
}

impl IndicatorResource {
    pub fn new(namespace: impl Into<String>, name: impl Into<String>, spec: impl Into<Vec<u8>>) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
            spec: spec.into(),
        }
    }

    pub fn key(&self) -> DocumentKey {
        DocumentKey::new(self.namespace.clone(), self.name.clone())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourceEvent {
    Added(IndicatorResource),
    Updated {
        old: IndicatorResource,
        new: IndicatorResource,
    },
    Deleted(IndicatorResource),
}

/// A rendered object pushed to an [`ArtifactSink`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub name: String,
    pub labels: BTreeMap<String, String>,
    pub data: BTreeMap<String, String>,
}

pub trait Reconciler {
    fn on_add(&self, resource: &IndicatorResource) -> Result<()>;

    fn on_update(&self, old: &IndicatorResource, new: &IndicatorResource) -> Result<()>;

    fn on_delete(&self, resource: &IndicatorResource) -> Result<()>;

    fn handle(&self, event: &ResourceEvent) -> Result<()> {
        match event {
            ResourceEvent::Added(resource) => self.on_add(resource),
            ResourceEvent::Updated { old, new } => self.on_update(old, new),
            ResourceEvent::Deleted(resource) => self.on_delete(resource),
        }
    }
}

/// Same identity and equal parsed documents. Byte differences such as
/// comments, key order or formatting do not count as changes.
pub(crate) fn unchanged(old: &IndicatorResource, new: &IndicatorResource) -> bool {
    if old.key() != new.key() {
        return false;
    }
    let options = ReadOptions::default();
    match (read_document(&old.spec, &options), read_document(&new.spec, &options)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}
