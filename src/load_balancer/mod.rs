//! Load balancing subsystem.
//!
//! # Data Flow
//! ```text
//! Request arrives at the router
//!     → pool.rs (advance cursor, scan one lap for a live backend)
//!     → backend.rs (forward through the backend's handle)
//!     → On repeated failure: pool.rs marks the backend dead
//! ```
//!
//! # Design Decisions
//! - The backend sequence is fixed after startup; only liveness changes
//! - Liveness sits behind a per-backend reader/writer lock
//! - The cursor is a single lock-free atomic shared by all requests
//! - Dead backends are skipped during the scan, no separate live list

pub mod backend;
pub mod pool;

pub use backend::Backend;
pub use pool::ServerPool;
