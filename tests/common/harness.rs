//! Test server harness.

use std::net::SocketAddr;
use std::time::Duration;

use smartdoc::analysis::PairAnalyzer;
use smartdoc::constants::{DEFAULT_MAX_DOCUMENTS, DEFAULT_MAX_UPLOAD_BYTES};
use smartdoc::gateway::{HandlerState, create_router_with_state};
use smartdoc::oracle::Oracles;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

const STARTUP_WAIT_TIMEOUT_SECS: u64 = 5;
const STARTUP_POLL_INTERVAL_MS: u64 = 50;

#[derive(Debug, Clone)]
pub struct TestServerConfig {
    pub port: u16,
    pub workers: usize,
    pub max_documents: usize,
    pub max_upload_bytes: usize,
    /// Oracles to serve with. `None` uses the stub oracles.
    pub oracles: Option<Oracles>,
}

impl Default for TestServerConfig {
    fn default() -> Self {
        Self {
            port: 0,
            workers: 1,
            max_documents: DEFAULT_MAX_DOCUMENTS,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            oracles: None,
        }
    }
}

impl TestServerConfig {
    pub fn with_oracles(mut self, oracles: Oracles) -> Self {
        self.oracles = Some(oracles);
        self
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    pub fn with_max_documents(mut self, max_documents: usize) -> Self {
        self.max_documents = max_documents;
        self
    }

    pub fn with_max_upload_bytes(mut self, max_upload_bytes: usize) -> Self {
        self.max_upload_bytes = max_upload_bytes;
        self
    }
}

pub struct TestServer {
    pub addr: SocketAddr,
    _server_handle: JoinHandle<()>,
    shutdown_tx: Option<oneshot::Sender<()>>,
}

impl TestServer {
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub async fn shutdown(mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

pub async fn find_available_port() -> std::io::Result<u16> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    Ok(addr.port())
}

pub async fn wait_for_server_ready(
    addr: SocketAddr,
    timeout: Duration,
    interval: Duration,
) -> Result<(), ServerStartupError> {
    let start = std::time::Instant::now();

    loop {
        if start.elapsed() > timeout {
            return Err(ServerStartupError::Timeout);
        }

        match tokio::net::TcpStream::connect(addr).await {
            Ok(_) => return Ok(()),
            Err(_) => {
                tokio::time::sleep(interval).await;
            }
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ServerStartupError {
    #[error("Server failed to start within timeout")]
    Timeout,
    #[error("Failed to bind to address: {0}")]
    BindError(#[from] std::io::Error),
    #[error("Server startup failed: {0}")]
    StartupFailed(String),
}

/// Spawns a server on localhost with the configured oracles (stub by default).
///
/// ```ignore
/// let server = spawn_test_server(TestServerConfig::default()).await?;
/// let client = TestClient::new(server.url());
/// assert!(client.health().await?.status == "ok");
/// ```
pub async fn spawn_test_server(config: TestServerConfig) -> Result<TestServer, ServerStartupError> {
    let port = if config.port == 0 {
        find_available_port().await?
    } else {
        config.port
    };

    let addr = SocketAddr::from(([127, 0, 0, 1], port));
    let listener = TcpListener::bind(addr).await?;
    let local_addr = listener.local_addr()?;

    let oracles = match config.oracles {
        Some(oracles) => oracles,
        None => Oracles::stub().map_err(|e| ServerStartupError::StartupFailed(e.to_string()))?,
    };

    let state = HandlerState::new(PairAnalyzer::new(oracles).with_workers(config.workers))
        .with_max_documents(config.max_documents)
        .with_max_upload_bytes(config.max_upload_bytes);

    let app = create_router_with_state(state);

    let (shutdown_tx, shutdown_rx) = oneshot::channel();

    let server_handle = tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(async {
                let _ = shutdown_rx.await;
            })
            .await
            .unwrap();
    });

    wait_for_server_ready(
        local_addr,
        Duration::from_secs(STARTUP_WAIT_TIMEOUT_SECS),
        Duration::from_millis(STARTUP_POLL_INTERVAL_MS),
    )
    .await?;

    Ok(TestServer {
        addr: local_addr,
        _server_handle: server_handle,
        shutdown_tx: Some(shutdown_tx),
    })
}
