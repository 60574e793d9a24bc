//! Periodic reachability probing.
//!
//! # Responsibilities
//! - Fire on a fixed interval, independent of request traffic
//! - Probe every backend with a bounded TCP connect
//! - Write each result into the backend's liveness flag
//!
//! # Design Decisions
//! - Probes run sequentially; pools are small and the interval is long
//! - Transport-level only: no HTTP health endpoint, no retry within a probe
//! - The only path that brings a dead backend back

use std::sync::Arc;
use std::time::Duration;

use tokio::net::TcpStream;
use tokio::sync::broadcast;
use tokio::time::{self, Instant, MissedTickBehavior};
use url::Url;

use crate::config::HealthCheckConfig;
use crate::load_balancer::ServerPool;
use crate::observability::metrics;

pub struct HealthChecker {
    pool: Arc<ServerPool>,
    interval: Duration,
    timeout: Duration,
}

impl HealthChecker {
    pub fn new(pool: Arc<ServerPool>, interval: Duration, timeout: Duration) -> Self {
        Self {
            pool,
            interval,
            timeout,
        }
    }

    pub fn from_config(pool: Arc<ServerPool>, config: &HealthCheckConfig) -> Self {
        Self::new(pool, config.interval(), config.timeout())
    }

    /// Run until the shutdown signal. The first round fires one interval
    /// after start.
    pub async fn run(self, mut shutdown: broadcast::Receiver<()>) {
        tracing::info!(
            interval = ?self.interval,
            timeout = ?self.timeout,
            "Health checker starting"
        );

        let mut ticker = self.ticker();

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    self.check_all().await;
                }
                _ = shutdown.recv() => {
                    tracing::info!("Health checker received shutdown signal, exiting loop");
                    break;
                }
            }
        }
    }

    /// Fixed-period timer whose first tick is one interval away. A round
    /// slower than the interval skips the missed ticks instead of bursting.
    fn ticker(&self) -> time::Interval {
        let mut ticker = time::interval_at(Instant::now() + self.interval, self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        ticker
    }

    /// One round: probe every backend and record the result.
    pub async fn check_all(&self) {
        tracing::info!("Starting health check...");

        for backend in self.pool.backends() {
            let alive = probe(backend.url(), self.timeout).await;
            let was_alive = backend.set_alive(alive);

            let status = if alive { "up" } else { "down" };
            tracing::info!(backend = %backend.url(), status, "Health check result");
            if was_alive != alive {
                tracing::warn!(backend = %backend.url(), alive, "Backend status changed");
            }

            metrics::record_backend_alive(backend.url().as_str(), alive);
        }

        metrics::record_health_check();
        tracing::info!(alive = self.pool.alive_count(), total = self.pool.len(), "Health check completed");
    }
}

/// Attempt a TCP connection to the backend's host and port.
pub async fn probe(url: &Url, timeout: Duration) -> bool {
    let Some(host) = url.host_str() else {
        return false;
    };
    let Some(port) = url.port_or_known_default() else {
        return false;
    };
    // IPv6 literals keep their brackets in host_str(); connect wants them bare.
    let host = host.trim_start_matches('[').trim_end_matches(']');

    match time::timeout(timeout, TcpStream::connect((host, port))).await {
        Ok(Ok(_stream)) => true,
        Ok(Err(e)) => {
            tracing::warn!(backend = %url, error = %e, "Site unreachable");
            false
        }
        Err(_) => {
            tracing::warn!(backend = %url, timeout = ?timeout, "Site unreachable: timeout");
            false
        }
    }
}
