//! Test harness: a real collector on an ephemeral port.

use rfnet_collector::{AppState, CollectorConfig, SubscriberRegistry};
use rfnet_persistence::SqliteStore;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::timeout;

pub struct TestCollector {
    addr: SocketAddr,
    registry: Arc<SubscriberRegistry>,
    shutdown_tx: Option<oneshot::Sender<()>>,
    server: JoinHandle<()>,
    _db_dir: TempDir,
}

impl TestCollector {
    pub async fn start() -> Self {
        Self::start_with(CollectorConfig::default()).await
    }

    pub async fn start_with(config: CollectorConfig) -> Self {
        let db_dir = TempDir::new().unwrap();
        let store = SqliteStore::open(db_dir.path().join("collector.db")).unwrap();
        let state = AppState::new(Arc::new(store), config);
        let registry = state.registry();

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

        let server = tokio::spawn(async move {
            rfnet_collector::serve(listener, state, async {
                let _ = shutdown_rx.await;
            })
            .await
            .unwrap();
        });

        Self {
            addr,
            registry,
            shutdown_tx: Some(shutdown_tx),
            server,
            _db_dir: db_dir,
        }
    }

    pub fn http_url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    pub fn ws_url(&self) -> String {
        format!("ws://{}/api/v1/ws", self.addr)
    }

    pub fn subscriber_count(&self) -> usize {
        self.registry.len()
    }

    /// Wait until exactly `n` subscribers are registered.
    pub async fn wait_for_subscribers(&self, n: usize) {
        let reached = timeout(Duration::from_secs(2), async {
            loop {
                if self.subscriber_count() == n {
                    return;
                }
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
        })
        .await;
        assert!(
            reached.is_ok(),
            "expected {n} subscribers, have {}",
            self.subscriber_count()
        );
    }

    pub async fn post_reading(&self, body: &str) -> reqwest::StatusCode {
        reqwest::Client::new()
            .post(self.http_url("/api/v1/readings"))
            .header("content-type", "application/json")
            .body(body.to_string())
            .send()
            .await
            .unwrap()
            .status()
    }

    pub async fn shutdown(mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        let _ = timeout(Duration::from_secs(5), &mut self.server).await;
    }
}
