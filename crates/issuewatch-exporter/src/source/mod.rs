//! Snapshot producers.
//!
//! The refresh task only needs "fetch and render current metrics as text";
//! everything about the upstream API lives behind `SnapshotSource`.

pub mod render;
pub mod sentry;

use async_trait::async_trait;
use issuewatch_core::{Result, Snapshot};

pub use sentry::{SentryApi, SentrySource};

#[async_trait]
pub trait SnapshotSource: Send + Sync {
    fn name(&self) -> &'static str;
    async fn produce(&self) -> Result<Snapshot>;
}
