//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, body buffering)
//!     → request.rs (request ID, span)
//!     → [routing layer picks backend, retries, fails over]
//!     → client.rs (forward to the chosen backend)
//!     → response.rs (503 on exhaustion)
//!     → Send to client
//! ```

pub mod client;
pub mod request;
pub mod response;
pub mod server;

pub use client::{Forwarder, HttpForwarder};
pub use request::X_REQUEST_ID;
pub use server::HttpServer;
