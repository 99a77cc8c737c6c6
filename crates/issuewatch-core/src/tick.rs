use std::time::Duration;

use crate::error::IssueWatchError;

/// Result of one scheduled refresh.
///
/// A failed tick leaves the published snapshot untouched; the scheduler logs
/// the reason and keeps going.
#[derive(Debug)]
pub enum TickOutcome {
    Updated { bytes: usize, took: Duration },
    Failed { reason: IssueWatchError, took: Duration },
}

impl TickOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, TickOutcome::Updated { .. })
    }

    pub fn took(&self) -> Duration {
        match self {
            TickOutcome::Updated { took, .. } | TickOutcome::Failed { took, .. } => *took,
        }
    }

    /// Label value for the outcome (`updated` / `failed`).
    pub fn label(&self) -> &'static str {
        match self {
            TickOutcome::Updated { .. } => "updated",
            TickOutcome::Failed { .. } => "failed",
        }
    }
}
