//! Round-robin HTTP load balancer library.

// Core subsystems
pub mod config;
pub mod error;
pub mod http;
pub mod routing;

// Traffic management
pub mod health;
pub mod load_balancer;

// Cross-cutting concerns
pub mod admin;
pub mod lifecycle;
pub mod observability;
pub mod resilience;
pub mod security;

#[cfg(test)]
pub(crate) mod test_utils;

pub use config::LbConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use load_balancer::{Backend, ServerPool};
