//! Error types shared across the balancer.
//!
//! Configuration failures live in [`crate::config::ConfigError`]; they are
//! fatal at startup and never reach request handling.

use std::time::Duration;

use thiserror::Error;

/// Transport-level failure reaching a chosen backend.
///
/// Recoverable: the router absorbs it through retry and failover.
#[derive(Debug, Error)]
pub enum ForwardError {
    /// Connection refused, reset, or any other client-side transport error.
    #[error("upstream '{backend}' unreachable: {source}")]
    Transport {
        backend: String,
        #[source]
        source: hyper_util::client::legacy::Error,
    },

    /// No response headers within the per-try deadline.
    #[error("upstream '{backend}' timed out after {timeout:?}")]
    Timeout { backend: String, timeout: Duration },

    /// The outgoing request could not be assembled.
    #[error("invalid upstream request for '{backend}': {reason}")]
    Request { backend: String, reason: String },
}

impl ForwardError {
    /// The backend the failed try was aimed at.
    pub fn backend(&self) -> &str {
        match self {
            ForwardError::Transport { backend, .. }
            | ForwardError::Timeout { backend, .. }
            | ForwardError::Request { backend, .. } => backend,
        }
    }
}

/// Terminal routing failures. Both map to 503 for the client.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RouteError {
    /// Every backend in the pool is marked dead.
    #[error("no backend available")]
    NoBackendAvailable,

    /// The attempt ceiling was reached.
    #[error("gave up after {attempts} attempts")]
    Exhausted { attempts: u32 },
}
