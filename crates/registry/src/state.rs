use std::sync::Arc;

use indicator_protocol::AggregationStore;
use prometheus::Registry;

use crate::metrics::RequestMetrics;

pub struct AppState {
    pub store: Arc<AggregationStore>,
    pub registry: Registry,
    pub metrics: RequestMetrics,
}

impl AppState {
    pub fn new(store: Arc<AggregationStore>) -> Result<Self, prometheus::Error> {
        let registry = Registry::new();
        let metrics = RequestMetrics::register(&registry)?;
        Ok(Self {
            store,
            registry,
            metrics,
        })
    }
}
