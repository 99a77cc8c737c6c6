//! Shared state handed to the HTTP handlers.
//!
//! Handlers only read: the snapshot store and the exporter's own metrics.
//! Writing the store is the refresh task's job.

use std::sync::Arc;

use crate::obs::ExporterMetrics;
use crate::store::SnapshotStore;

#[derive(Clone)]
pub struct AppState {
    store: Arc<dyn SnapshotStore>,
    metrics: Arc<ExporterMetrics>,
}

impl AppState {
    pub fn new(store: Arc<dyn SnapshotStore>, metrics: Arc<ExporterMetrics>) -> Self {
        Self { store, metrics }
    }

    pub fn store(&self) -> &Arc<dyn SnapshotStore> {
        &self.store
    }

    pub fn metrics(&self) -> &Arc<ExporterMetrics> {
        &self.metrics
    }
}
