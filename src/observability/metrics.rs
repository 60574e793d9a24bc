//! Metrics collection and exposition.
//!
//! # Responsibilities
//! - Define balancer metrics (requests, latency, retries, failovers, liveness)
//! - Expose Prometheus-compatible metrics endpoint
//!
//! # Metrics
//! - `lb_requests_total` (counter): requests by status
//! - `lb_request_duration_seconds` (histogram): end-to-end latency
//! - `lb_forward_retries_total` (counter): same-backend retries by backend
//! - `lb_failovers_total` (counter): backends abandoned mid-request
//! - `lb_backend_alive` (gauge): 1=alive, 0=dead
//! - `lb_health_checks_total` (counter): completed health-check rounds
//!
//! # Design Decisions
//! - Recording is a no-op until a recorder is installed, so tests need no setup

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

/// Install the Prometheus recorder with its own HTTP listener.
///
/// Must run inside a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics endpoint listening");
    Ok(())
}

/// Record a finished client request.
pub fn record_request(status: u16, start: Instant) {
    counter!("lb_requests_total", "status" => status.to_string()).increment(1);
    histogram!("lb_request_duration_seconds").record(start.elapsed().as_secs_f64());
}

pub fn record_retry(backend: &str) {
    counter!("lb_forward_retries_total", "backend" => backend.to_string()).increment(1);
}

pub fn record_failover(backend: &str) {
    counter!("lb_failovers_total", "backend" => backend.to_string()).increment(1);
}

pub fn record_backend_alive(backend: &str, alive: bool) {
    gauge!("lb_backend_alive", "backend" => backend.to_string()).set(if alive { 1.0 } else { 0.0 });
}

pub fn record_health_check() {
    counter!("lb_health_checks_total").increment(1);
}
