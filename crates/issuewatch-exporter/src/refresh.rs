//! The refresh task run on every tick: produce, then publish.

use std::sync::Arc;

use tokio::time::Instant;
use tracing::{debug, warn};

use issuewatch_core::TickOutcome;

use crate::obs::ExporterMetrics;
use crate::source::SnapshotSource;
use crate::store::SnapshotStore;

#[derive(Clone)]
pub struct Refresher {
    source: Arc<dyn SnapshotSource>,
    store: Arc<dyn SnapshotStore>,
    metrics: Arc<ExporterMetrics>,
}

impl Refresher {
    pub fn new(
        source: Arc<dyn SnapshotSource>,
        store: Arc<dyn SnapshotStore>,
        metrics: Arc<ExporterMetrics>,
    ) -> Self {
        Self { source, store, metrics }
    }

    /// One refresh. The store is only written after the source produced a
    /// complete snapshot; any failure leaves the previous one in place.
    pub async fn tick(&self) -> TickOutcome {
        let started = Instant::now();
        let source = self.source.name();
        debug!(source, "refresh started");

        let result = match self.source.produce().await {
            Ok(snapshot) => {
                if snapshot.is_empty() {
                    warn!(source, "source rendered an empty snapshot");
                }
                let bytes = snapshot.len();
                self.store.write(snapshot).await.map(|_| bytes)
            }
            Err(e) => Err(e),
        };

        let took = started.elapsed();
        let outcome = match result {
            Ok(bytes) => TickOutcome::Updated { bytes, took },
            Err(reason) => TickOutcome::Failed { reason, took },
        };
        self.metrics.record(&outcome);
        outcome
    }
}
