//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request:
//!     → headers.rs (strip hop-by-hop, add X-Forwarded-For)
//!     → Pass to routing
//!
//! Upstream response:
//!     → headers.rs (strip hop-by-hop)
//!     → Send to client
//! ```
//!
//! # Design Decisions
//! - No trust in client-supplied connection-level headers

pub mod headers;
