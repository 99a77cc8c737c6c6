use std::io::ErrorKind as IoKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use issuewatch_core::{IssueWatchError, Result, Snapshot};

use super::SnapshotStore;

/// Persisted store: each write lands in a sibling temp file which is then
/// renamed over the target, so a reader opens either the old file or the new
/// one. Only the exporter process touches the file.
pub struct FileStore {
    path: PathBuf,
    tmp_path: PathBuf,
}

impl FileStore {
    /// Open a store at `path`, discarding any file left by a previous process.
    pub async fn open(path: PathBuf) -> Result<Self> {
        let tmp_path = tmp_sibling(&path);
        for p in [&path, &tmp_path] {
            match tokio::fs::remove_file(p).await {
                Ok(()) => tracing::debug!(path = %p.display(), "removed stale snapshot file"),
                Err(e) if e.kind() == IoKind::NotFound => {}
                Err(e) => {
                    return Err(IssueWatchError::io(
                        format!("cannot reset snapshot file {}", p.display()),
                        e,
                    ))
                }
            }
        }
        Ok(Self { path, tmp_path })
    }
}

fn tmp_sibling(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

#[async_trait]
impl SnapshotStore for FileStore {
    fn describe(&self) -> &'static str {
        "file"
    }

    async fn write(&self, snapshot: Snapshot) -> Result<()> {
        tokio::fs::write(&self.tmp_path, snapshot.as_bytes())
            .await
            .map_err(|e| IssueWatchError::io(format!("write {}", self.tmp_path.display()), e))?;
        tokio::fs::rename(&self.tmp_path, &self.path)
            .await
            .map_err(|e| IssueWatchError::io(format!("rename to {}", self.path.display()), e))?;
        Ok(())
    }

    async fn read(&self) -> Result<Option<Snapshot>> {
        match tokio::fs::read(&self.path).await {
            Ok(body) => Ok(Some(Snapshot::from(body))),
            Err(e) if e.kind() == IoKind::NotFound => Ok(None),
            Err(e) => Err(IssueWatchError::io(format!("read {}", self.path.display()), e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn open_discards_previous_process_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("snap.prom");
        std::fs::write(&path, "old 1\n").unwrap();

        let store = FileStore::open(path.clone()).await.unwrap();
        assert!(store.read().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn write_replaces_and_leaves_no_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::open(dir.path().join("snap.prom")).await.unwrap();

        store.write(Snapshot::from("x 1\n")).await.unwrap();
        store.write(Snapshot::from("x 2\n")).await.unwrap();

        assert_eq!(store.read().await.unwrap(), Some(Snapshot::from("x 2\n")));
        assert!(!dir.path().join("snap.prom.tmp").exists());
    }

    #[tokio::test]
    async fn unreadable_target_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("snap.prom");
        let store = FileStore::open(path.clone()).await.unwrap();

        // a directory at the target path cannot be read as a file
        std::fs::create_dir(&path).unwrap();
        let err = store.read().await.unwrap_err();
        assert_eq!(err.kind(), issuewatch_core::ErrorKind::Io);
    }
}
