//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request (buffered parts + body)
//!     → router.rs (pick peer from the pool)
//!     → backend forward
//!     → on error: retry same peer / fail over / give up
//!     → Return: upstream response or RouteError
//! ```
//!
//! # Design Decisions
//! - One pool, every path and method routed the same way
//! - Attempt/retry counters live in a per-request value, never in shared state
//! - Termination is bounded by the attempt ceiling

pub mod router;

pub use router::Router;
