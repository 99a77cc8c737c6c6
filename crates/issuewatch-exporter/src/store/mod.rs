//! Snapshot stores.
//!
//! A store holds at most one snapshot. `write` replaces it atomically from the
//! reader's point of view; `read` returns the latest complete snapshot or
//! `None` if nothing was written since process start. There is deliberately
//! no way to clear a store.

pub mod file;
pub mod memory;

use std::sync::Arc;

use async_trait::async_trait;
use issuewatch_core::{Result, Snapshot};

use crate::config::{StoreKind, StoreSection};

pub use file::FileStore;
pub use memory::MemoryStore;

#[async_trait]
pub trait SnapshotStore: Send + Sync {
    fn describe(&self) -> &'static str;
    async fn write(&self, snapshot: Snapshot) -> Result<()>;
    async fn read(&self) -> Result<Option<Snapshot>>;
}

/// Build the store selected by config.
pub async fn from_config(cfg: &StoreSection) -> Result<Arc<dyn SnapshotStore>> {
    Ok(match cfg.kind {
        StoreKind::Memory => Arc::new(MemoryStore::new()),
        StoreKind::File => Arc::new(FileStore::open(cfg.path.clone()).await?),
    })
}
