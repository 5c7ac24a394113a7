//! Alert rules: a single merged object rewritten on every change.

use std::sync::Arc;

use tracing::{debug, info};

use super::{unchanged, IndicatorResource, Reconciler};
use crate::error::Result;
use crate::read::{read_document, ReadOptions};
use crate::store::AggregationStore;

/// Destination of the merged rule file.
pub trait AlertRulesSink {
    fn replace(&self, rules: &str) -> Result<()>;
}

pub struct AlertRulesController<S> {
    store: Arc<AggregationStore>,
    sink: S,
}

impl<S: AlertRulesSink> AlertRulesController<S> {
    pub fn new(store: Arc<AggregationStore>, sink: S) -> Self {
        Self { store, sink }
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    fn publish(&self) -> Result<()> {
        let rules = self.store.alert_rules();
        self.sink.replace(&rules)?;
        info!(documents = self.store.len(), "replaced alert rules");
        Ok(())
    }
}

impl<S: AlertRulesSink> Reconciler for AlertRulesController<S> {
    fn on_add(&self, resource: &IndicatorResource) -> Result<()> {
        read_document(&resource.spec, &ReadOptions::default())?;
        self.store.upsert(resource.key(), resource.spec.clone());
        self.publish()
    }

    fn on_update(&self, old: &IndicatorResource, new: &IndicatorResource) -> Result<()> {
        if unchanged(old, new) {
            debug!(key = %new.key(), "alert resource unchanged, skipping");
            return Ok(());
        }
        self.on_add(new)
    }

    fn on_delete(&self, resource: &IndicatorResource) -> Result<()> {
        self.store.delete(&resource.key());
        self.publish()
    }
}
