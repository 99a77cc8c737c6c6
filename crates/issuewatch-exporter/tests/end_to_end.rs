#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

use issuewatch_core::{IssueWatchError, Result, Snapshot};
use issuewatch_exporter::server::Exporter;
use issuewatch_exporter::source::SnapshotSource;
use issuewatch_exporter::store::MemoryStore;

/// Fails on the first call, then renders a counter.
struct FlakySource {
    calls: AtomicU64,
}

#[async_trait]
impl SnapshotSource for FlakySource {
    fn name(&self) -> &'static str {
        "flaky"
    }

    async fn produce(&self) -> Result<Snapshot> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst);
        if n == 0 {
            return Err(IssueWatchError::upstream("first call fails"));
        }
        Ok(Snapshot::from(format!("refresh_calls {n}\n")))
    }
}

/// Succeeds once, then never returns again.
struct StallingSource {
    calls: Arc<AtomicU64>,
}

#[async_trait]
impl SnapshotSource for StallingSource {
    fn name(&self) -> &'static str {
        "stalling"
    }

    async fn produce(&self) -> Result<Snapshot> {
        if self.calls.fetch_add(1, Ordering::SeqCst) == 0 {
            return Ok(Snapshot::from("sentry_projects{org=\"acme\"} 1\n"));
        }
        std::future::pending().await
    }
}

async fn start(
    source: Arc<dyn SnapshotSource>,
) -> (SocketAddr, oneshot::Sender<()>, JoinHandle<Result<()>>) {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let exporter = Exporter::new(source, Arc::new(MemoryStore::new()), Duration::from_secs(1));

    let (stop_tx, stop_rx) = oneshot::channel::<()>();
    let server = tokio::spawn(exporter.serve(listener, async move {
        let _ = stop_rx.await;
    }));
    (addr, stop_tx, server)
}

#[tokio::test]
async fn serves_latest_snapshot_while_refreshing() {
    let (addr, stop_tx, server) = start(Arc::new(FlakySource { calls: AtomicU64::new(0) })).await;
    let client = reqwest::Client::new();
    let url = format!("http://{addr}/metrics/");

    // the immediate first tick failed: nothing published yet
    let resp = client.get(&url).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
    assert!(resp.bytes().await.unwrap().is_empty());

    // second tick lands about one interval later
    let mut body = None;
    for _ in 0..40 {
        tokio::time::sleep(Duration::from_millis(100)).await;
        let resp = client.get(&url).send().await.unwrap();
        if resp.status() == StatusCode::OK {
            body = Some(resp.bytes().await.unwrap());
            break;
        }
    }
    let body = body.expect("snapshot never published");
    assert!(body.starts_with(b"refresh_calls "));

    let own = client
        .get(format!("http://{addr}/metrics/exporter"))
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(own.contains("issuewatch_refresh_failures_total{kind=\"UPSTREAM\"} 1"));

    drop(client);
    stop_tx.send(()).unwrap();
    server.await.unwrap().unwrap();
}

#[tokio::test]
async fn hanging_refresh_does_not_block_readers() {
    let calls = Arc::new(AtomicU64::new(0));
    let (addr, stop_tx, server) = start(Arc::new(StallingSource { calls: calls.clone() })).await;
    let client = reqwest::Client::new();
    let url = format!("http://{addr}/metrics/");

    let mut first = None;
    for _ in 0..20 {
        let resp = client.get(&url).send().await.unwrap();
        if resp.status() == StatusCode::OK {
            first = Some(resp.bytes().await.unwrap());
            break;
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    let first = first.expect("first snapshot never published");

    // wait until the second refresh is in flight and stuck
    for _ in 0..40 {
        if calls.load(Ordering::SeqCst) >= 2 {
            break;
        }
        tokio::time::sleep(Duration::from_millis(100)).await;
    }
    assert!(calls.load(Ordering::SeqCst) >= 2, "second refresh never started");

    let resp = tokio::time::timeout(Duration::from_millis(500), client.get(&url).send())
        .await
        .expect("reader blocked behind the hanging refresh")
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.bytes().await.unwrap(), first);

    drop(client);
    stop_tx.send(()).unwrap();
    server.await.unwrap().unwrap();
}
