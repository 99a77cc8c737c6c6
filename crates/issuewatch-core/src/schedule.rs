//! Fixed-period schedule with drift correction.
//!
//! After every tick the next fire time is moved forward from the *previous*
//! fire time by whole intervals until it lies strictly after the tick's end.
//! Execution time therefore never shifts the phase, and an overrun that
//! spans several boundaries yields a single execution at the next future
//! boundary instead of a burst of catch-up runs.

use std::time::{Duration, Instant};

use crate::error::{IssueWatchError, Result};

/// Result of moving the schedule past a finished tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Advance {
    pub next_fire: Instant,
    /// Interval boundaries that passed while the tick was running.
    pub skipped: u32,
}

#[derive(Debug, Clone)]
pub struct Schedule {
    interval: Duration,
    next_fire: Instant,
}

impl Schedule {
    /// Schedule whose first fire is `first_fire` (usually "now").
    pub fn new(interval: Duration, first_fire: Instant) -> Result<Self> {
        if interval.is_zero() {
            return Err(IssueWatchError::Config("schedule interval must be non-zero".into()));
        }
        Ok(Self { interval, next_fire: first_fire })
    }

    pub fn next_fire(&self) -> Instant {
        self.next_fire
    }

    /// Move past a tick that finished at `now`.
    pub fn advance(&mut self, now: Instant) -> Advance {
        let behind = now.saturating_duration_since(self.next_fire);
        let missed = behind.as_nanos() / self.interval.as_nanos();
        let steps = u32::try_from(missed.saturating_add(1)).unwrap_or(u32::MAX);

        self.next_fire += self.interval * steps;
        Advance { next_fire: self.next_fire, skipped: steps - 1 }
    }
}
