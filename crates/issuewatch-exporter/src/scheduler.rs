//! Fixed-cadence driver for the refresh task.
//!
//! Runs on its own tokio task. The first tick fires immediately; later ticks
//! follow `Schedule::advance`, so long ticks skip missed boundaries instead of
//! bursting. Tick failures are logged and never stop the loop. A `true` on
//! the shutdown channel (or dropping its sender) stops it, also mid-tick.

use std::error::Error as StdError;
use std::future::Future;
use std::time::Duration;

use tokio::sync::watch;
use tokio::time::Instant;
use tracing::{debug, error, info};

use issuewatch_core::{Result, Schedule, TickOutcome};

pub struct Scheduler {
    interval: Duration,
}

impl Scheduler {
    pub fn new(interval: Duration) -> Self {
        Self { interval }
    }

    /// Drive `task` until shutdown. Returns the number of completed ticks.
    pub async fn run<F, Fut>(&self, mut task: F, mut shutdown: watch::Receiver<bool>) -> Result<u64>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = TickOutcome>,
    {
        let mut schedule = Schedule::new(self.interval, Instant::now().into_std())?;
        let mut ticks = 0u64;
        info!(interval_secs = self.interval.as_secs(), "scheduler started");

        loop {
            if *shutdown.borrow() {
                break;
            }

            tokio::select! {
                _ = tokio::time::sleep_until(Instant::from_std(schedule.next_fire())) => {}
                _ = stop_requested(&mut shutdown) => break,
            }

            let outcome = tokio::select! {
                outcome = task() => outcome,
                _ = stop_requested(&mut shutdown) => {
                    info!("scheduler stopped during a tick; previous snapshot kept");
                    break;
                }
            };
            ticks += 1;
            log_outcome(ticks, &outcome);

            let adv = schedule.advance(Instant::now().into_std());
            if adv.skipped > 0 {
                debug!(skipped = adv.skipped, "tick overran the interval; skipping missed boundaries");
            }
        }

        info!(ticks, "scheduler stopped");
        Ok(ticks)
    }
}

/// Resolves once the channel holds `true` or its sender is gone. Other
/// updates are consumed and ignored.
async fn stop_requested(shutdown: &mut watch::Receiver<bool>) {
    loop {
        if shutdown.changed().await.is_err() {
            return;
        }
        if *shutdown.borrow_and_update() {
            return;
        }
    }
}

fn log_outcome(tick: u64, outcome: &TickOutcome) {
    match outcome {
        TickOutcome::Updated { bytes, took } => {
            info!(tick, bytes, took_ms = took.as_millis() as u64, "snapshot refreshed");
        }
        TickOutcome::Failed { reason, took } => {
            error!(
                tick,
                kind = reason.kind().as_str(),
                error = %reason,
                chain = %error_chain(reason),
                took_ms = took.as_millis() as u64,
                "refresh failed; keeping previous snapshot"
            );
        }
    }
}

/// `err: cause: cause` rendering of an error and its sources.
pub fn error_chain(err: &(dyn StdError + 'static)) -> String {
    let mut out = err.to_string();
    let mut cur = err.source();
    while let Some(e) = cur {
        out.push_str(": ");
        out.push_str(&e.to_string());
        cur = e.source();
    }
    out
}
