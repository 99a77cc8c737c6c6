//! Process wiring: store + source + scheduler + HTTP listener.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::net::TcpListener;
use tokio::sync::watch;
use tracing::{error, info};

use issuewatch_core::{IssueWatchError, Result};

use crate::app_state::AppState;
use crate::config::ExporterConfig;
use crate::obs::ExporterMetrics;
use crate::refresh::Refresher;
use crate::router;
use crate::scheduler::Scheduler;
use crate::source::{SentrySource, SnapshotSource};
use crate::store::{self, SnapshotStore};

/// A wired exporter, ready to serve.
pub struct Exporter {
    state: AppState,
    refresher: Refresher,
    interval: Duration,
}

impl Exporter {
    pub fn new(
        source: Arc<dyn SnapshotSource>,
        store: Arc<dyn SnapshotStore>,
        interval: Duration,
    ) -> Self {
        let metrics = Arc::new(ExporterMetrics::new());
        let state = AppState::new(Arc::clone(&store), Arc::clone(&metrics));
        let refresher = Refresher::new(source, store, metrics);
        Self { state, refresher, interval }
    }

    pub fn state(&self) -> AppState {
        self.state.clone()
    }

    /// Serve on `listener` with the scheduler running beside it until
    /// `shutdown` resolves.
    pub async fn serve<S>(self, listener: TcpListener, shutdown: S) -> Result<()>
    where
        S: Future<Output = ()> + Send + 'static,
    {
        let (stop_tx, stop_rx) = watch::channel(false);

        let refresher = self.refresher;
        let scheduler = Scheduler::new(self.interval);
        let scheduler_handle = tokio::spawn(async move {
            scheduler
                .run(
                    move || {
                        let r = refresher.clone();
                        async move { r.tick().await }
                    },
                    stop_rx,
                )
                .await
        });

        let app = router::build_router(self.state);
        let served = axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                shutdown.await;
                info!("shutdown signal received");
                let _ = stop_tx.send(true);
            })
            .await;

        match scheduler_handle.await {
            Ok(Ok(ticks)) => info!(ticks, "refresh loop finished"),
            Ok(Err(e)) => return Err(e),
            Err(e) => return Err(IssueWatchError::Internal(format!("scheduler task failed: {e}"))),
        }

        served.map_err(|e| IssueWatchError::io("http server", e))
    }
}

/// Run the exporter described by `cfg` until Ctrl-C / SIGTERM.
pub async fn run(cfg: ExporterConfig) -> Result<()> {
    cfg.validate()?;
    let listen = cfg.server.listen_addr()?;

    let store = store::from_config(&cfg.store).await?;
    let source: Arc<dyn SnapshotSource> = Arc::new(SentrySource::new(cfg.sentry.clone())?);
    info!(
        source = source.name(),
        org = %cfg.sentry.org,
        store = store.describe(),
        interval_secs = cfg.refresh.interval_secs,
        "exporter configured"
    );

    let exporter = Exporter::new(source, store, cfg.refresh.interval());

    let listener = TcpListener::bind(listen).await.map_err(|e| {
        error!(%listen, error = %e, "failed to bind");
        IssueWatchError::io(format!("bind {listen}"), e)
    })?;
    info!(%listen, "issuewatch-exporter listening");

    exporter.serve(listener, shutdown_signal()).await?;
    info!("exporter stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "failed to install Ctrl-C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
}
