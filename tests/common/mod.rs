//! Shared utilities for integration tests.

use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::mpsc;

use route_mux::config::RouterConfig;
use route_mux::http::HttpServer;
use route_mux::lifecycle::Shutdown;

/// A server running on an ephemeral local port.
#[allow(dead_code)]
pub struct TestServer {
    pub addr: SocketAddr,
    pub shutdown: Shutdown,
    pub config_updates: mpsc::UnboundedSender<RouterConfig>,
}

#[allow(dead_code)]
impl TestServer {
    pub fn url(&self, path_and_query: &str) -> String {
        format!("http://{}{}", self.addr, path_and_query)
    }
}

/// Bind `127.0.0.1:0`, spawn `server`, and wait until it accepts connections.
pub async fn spawn_server(server: HttpServer) -> TestServer {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let (config_updates, updates_rx) = mpsc::unbounded_channel();
    let server_shutdown = shutdown.subscribe();

    tokio::spawn(async move {
        let _ = server.run(listener, updates_rx, server_shutdown).await;
    });

    for _ in 0..50 {
        if tokio::net::TcpStream::connect(addr).await.is_ok() {
            break;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }

    TestServer {
        addr,
        shutdown,
        config_updates,
    }
}

/// HTTP client that never pools or proxies, so each request is independent.
pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap()
}
