//! issuewatch core: runtime-free primitives shared by the exporter.
//!
//! This crate defines the error surface, the opaque `Snapshot` payload, the
//! drift-correcting `Schedule` arithmetic and the per-tick `TickOutcome`. It
//! carries no async runtime or HTTP dependencies so the timing rules can be
//! tested without a clock.
//!
//! # Defensive guarantees
//! Panics, `unwrap`, and `expect` are compile-denied here.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod error;
pub mod schedule;
pub mod snapshot;
pub mod tick;

pub use error::{BoxError, ErrorKind, IssueWatchError, Result};
pub use schedule::{Advance, Schedule};
pub use snapshot::Snapshot;
pub use tick::TickOutcome;
