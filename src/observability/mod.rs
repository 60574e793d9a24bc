//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Router, pool, health checker produce:
//!     → logging.rs (structured log events)
//!     → metrics.rs (counters, gauges, histograms)
//!
//! Consumers:
//!     → stdout
//!     → Metrics endpoint (Prometheus scrape)
//! ```
//!
//! # Design Decisions
//! - Every liveness transition and health-check round is logged
//! - Request ID flows from the listener into every request log line
//! - Metrics are cheap (atomic increments)

pub mod logging;
pub mod metrics;
