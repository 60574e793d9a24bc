//! Health checking subsystem.
//!
//! # Data Flow
//! ```text
//! Periodic timer (checker.rs)
//!     → TCP connect to each backend (bounded timeout)
//!     → Backend::set_alive(result)
//!
//! Request failures (routing::router)
//!     → retries spent on a backend
//!     → ServerPool::mark_backend_status(url, false)
//! ```
//!
//! # Design Decisions
//! - Failover can only mark dead; only the checker marks alive
//! - One background task for the whole pool
//! - Health state is per-backend, not per-pool

pub mod checker;

pub use checker::HealthChecker;
