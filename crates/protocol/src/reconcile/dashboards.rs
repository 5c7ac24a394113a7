//! Dashboard artifacts: one per indicator resource.

use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::{debug, info};

use super::{unchanged, Artifact, IndicatorResource, Reconciler};
use crate::error::{ProtocolError, Result};
use crate::read::{read_document, ReadOptions};
use crate::render::{artifact_name, DashboardRenderer};
use crate::store::AggregationStore;

/// Label marking an artifact as a dashboard for discovery sidecars.
pub const DASHBOARD_LABEL: &str = "grafana_dashboard";
/// Data key holding the dashboard JSON.
pub const DASHBOARD_DATA_KEY: &str = "dashboard.json";

/// Storage for named artifacts.
pub trait ArtifactSink {
    fn get(&self, name: &str) -> Result<Option<Artifact>>;

    fn create(&self, artifact: Artifact) -> Result<()>;

    fn update(&self, artifact: Artifact) -> Result<()>;

    fn delete(&self, name: &str) -> Result<()>;
}

/// Publishes each resource's patched dashboard as an artifact.
pub struct DashboardController<S> {
    store: Arc<AggregationStore>,
    sink: S,
}

impl<S: ArtifactSink> DashboardController<S> {
    pub fn new(store: Arc<AggregationStore>, sink: S) -> Self {
        Self { store, sink }
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    fn publish(&self, resource: &IndicatorResource) -> Result<()> {
        read_document(&resource.spec, &ReadOptions::default())?;
        let key = resource.key();
        self.store.upsert(key.clone(), resource.spec.clone());

        let dashboard = self
            .store
            .render_one(&key, &DashboardRenderer)
            .ok_or_else(|| ProtocolError::Sink(format!("document '{}' vanished before rendering", key)))??;

        let artifact = Artifact {
            name: artifact_name(&resource.name),
            labels: BTreeMap::from([(DASHBOARD_LABEL.to_string(), "true".to_string())]),
            data: BTreeMap::from([(
                DASHBOARD_DATA_KEY.to_string(),
                serde_json::to_string(&dashboard)?,
            )]),
        };

        let name = artifact.name.clone();
        if self.sink.get(&name)?.is_some() {
            self.sink.update(artifact)?;
            info!(key = %key, artifact = %name, "updated dashboard artifact");
        } else {
            self.sink.create(artifact)?;
            info!(key = %key, artifact = %name, "created dashboard artifact");
        }
        Ok(())
    }
}

impl<S: ArtifactSink> Reconciler for DashboardController<S> {
    fn on_add(&self, resource: &IndicatorResource) -> Result<()> {
        self.publish(resource)
    }

    fn on_update(&self, old: &IndicatorResource, new: &IndicatorResource) -> Result<()> {
        if unchanged(old, new) {
            debug!(key = %new.key(), "dashboard resource unchanged, skipping");
            return Ok(());
        }
        self.publish(new)
    }

    fn on_delete(&self, resource: &IndicatorResource) -> Result<()> {
        let key = resource.key();
        self.store.delete(&key);

        let name = artifact_name(&resource.name);
        if self.sink.get(&name)?.is_some() {
            self.sink.delete(&name)?;
            info!(key = %key, artifact = %name, "deleted dashboard artifact");
        }
        Ok(())
    }
}
