//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Forwarding error on a backend:
//!     → retries.rs (retry budget left? wait fixed backoff, retry same backend)
//!     → budget spent: mark backend dead, next routing round
//!     → attempt ceiling reached: 503
//! ```
//!
//! # Design Decisions
//! - Every forwarding try has its own deadline (see http::client)
//! - Worst case per request is max_attempts × (1 + max_retries) tries
//! - Only health checks revive a backend; failover can only mark dead

pub mod retries;

pub use retries::{RequestState, RetryPolicy};
