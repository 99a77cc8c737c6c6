use std::sync::RwLock;

use async_trait::async_trait;
use issuewatch_core::{IssueWatchError, Result, Snapshot};

use super::SnapshotStore;

/// In-process slot. The lock is only held for a reference swap or clone, so
/// readers never wait on a refresh in progress.
#[derive(Default)]
pub struct MemoryStore {
    slot: RwLock<Option<Snapshot>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SnapshotStore for MemoryStore {
    fn describe(&self) -> &'static str {
        "memory"
    }

    async fn write(&self, snapshot: Snapshot) -> Result<()> {
        let mut slot = self
            .slot
            .write()
            .map_err(|_| IssueWatchError::Internal("snapshot lock poisoned".into()))?;
        *slot = Some(snapshot);
        Ok(())
    }

    async fn read(&self) -> Result<Option<Snapshot>> {
        let slot = self
            .slot
            .read()
            .map_err(|_| IssueWatchError::Internal("snapshot lock poisoned".into()))?;
        Ok(slot.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn absent_until_first_write() {
        let store = MemoryStore::new();
        assert!(store.read().await.unwrap().is_none());

        store.write(Snapshot::from("a 1\n")).await.unwrap();
        assert_eq!(store.read().await.unwrap(), Some(Snapshot::from("a 1\n")));

        store.write(Snapshot::from("a 2\n")).await.unwrap();
        assert_eq!(store.read().await.unwrap(), Some(Snapshot::from("a 2\n")));
    }
}
