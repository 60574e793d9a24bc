//! Shared utilities for integration and load testing.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::{body::Bytes, http::HeaderMap, Router};
use rr_balancer::{HttpServer, LbConfig, ServerPool, Shutdown};
use tokio::io::AsyncWriteExt;
use tokio::net::TcpListener;

/// Bind an ephemeral port, then release it so nothing is listening there.
#[allow(dead_code)]
pub async fn closed_port() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    addr
}

/// Start a simple mock backend that returns a fixed response.
#[allow(dead_code)]
pub async fn start_mock_backend(addr: SocketAddr, response: &'static str) -> SocketAddr {
    start_programmable_backend(addr, move || async move { (200, response.to_string()) }).await
}

/// Start a programmable mock backend with async support.
/// A status of 0 closes the connection without a response.
#[allow(dead_code)]
pub async fn start_programmable_backend<F, Fut>(addr: SocketAddr, f: F) -> SocketAddr
where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = (u16, String)> + Send + 'static,
{
    let listener = TcpListener::bind(addr).await.unwrap();
    let local = listener.local_addr().unwrap();
    let f = std::sync::Arc::new(f);

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    let f = f.clone();
                    tokio::spawn(async move {
                        let (status, body) = f().await;
                        if status == 0 {
                            // Hang up without answering.
                            return;
                        }
                        let status_text = match status {
                            200 => "200 OK",
                            404 => "404 Not Found",
                            500 => "500 Internal Server Error",
                            502 => "502 Bad Gateway",
                            503 => "503 Service Unavailable",
                            _ => "200 OK",
                        };

                        let response_str = format!(
                            "HTTP/1.1 {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                            status_text,
                            body.len(),
                            body
                        );
                        let _ = socket.write_all(response_str.as_bytes()).await;
                        let _ = socket.shutdown().await;
                        tokio::time::sleep(Duration::from_millis(10)).await;
                    });
                }
                Err(_) => break,
            }
        }
    });

    local
}

/// Start a backend that answers with `x-forwarded-for`, a `|` and the request body.
#[allow(dead_code)]
pub async fn start_echo_backend() -> SocketAddr {
    let app = Router::new().fallback(|headers: HeaderMap, body: Bytes| async move {
        let forwarded = headers
            .get("x-forwarded-for")
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_string();
        format!("{}|{}", forwarded, String::from_utf8_lossy(&body))
    });

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    addr
}

/// Config with the given backends, health checks off and a short backoff.
#[allow(dead_code)]
pub fn config_for(backends: &[SocketAddr]) -> LbConfig {
    let mut config = LbConfig::default();
    config.backends = backends.iter().map(|a| format!("http://{}", a)).collect();
    config.health_check.enabled = false;
    config.retries.backoff_ms = 5;
    config.timeouts.connect_secs = 1;
    config.timeouts.request_secs = 5;
    config
}

/// Start the balancer on an ephemeral port.
#[allow(dead_code)]
pub async fn start_balancer(config: LbConfig) -> (SocketAddr, Shutdown) {
    let (addr, shutdown, _) = start_balancer_with_pool(config).await;
    (addr, shutdown)
}

/// Start the balancer and keep a handle on its pool for liveness checks.
#[allow(dead_code)]
pub async fn start_balancer_with_pool(config: LbConfig) -> (SocketAddr, Shutdown, Arc<ServerPool>) {
    let shutdown = Shutdown::new();
    let server = HttpServer::new(config).expect("valid config");
    let pool = server.pool().clone();
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let server_shutdown = shutdown.subscribe();

    tokio::spawn(async move {
        let _ = server.run(listener, server_shutdown).await;
    });

    tokio::time::sleep(Duration::from_millis(100)).await;
    (addr, shutdown, pool)
}

/// Client without connection pooling so each request is independent.
#[allow(dead_code)]
pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap()
}
