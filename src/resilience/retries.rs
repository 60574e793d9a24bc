//! Retry and failover budget.
//!
//! # Responsibilities
//! - Hold the per-request ceilings (routing rounds, same-backend retries)
//! - Carry each request's attempt/retry counters as an immutable value
//!
//! # Design Decisions
//! - Fixed backoff between same-backend retries, no exponential growth
//! - Every transition yields a new `RequestState`; nothing is shared between requests
//! - Retries reset to zero when the request fails over to another backend

use std::time::Duration;

use crate::config::RetryConfig;

/// Ceilings for one logical client request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Routing rounds allowed before giving up.
    pub max_attempts: u32,
    /// Same-backend retries allowed within one round.
    pub max_retries: u32,
    /// Wait before each same-backend retry.
    pub backoff: Duration,
}

impl RetryPolicy {
    /// Whether a request in `state` may route again.
    pub fn can_route(&self, state: RequestState) -> bool {
        state.attempts <= self.max_attempts
    }

    /// Whether a request in `state` may retry its current backend.
    pub fn can_retry(&self, state: RequestState) -> bool {
        state.retries < self.max_retries
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from(&RetryConfig::default())
    }
}

impl From<&RetryConfig> for RetryPolicy {
    fn from(config: &RetryConfig) -> Self {
        Self {
            max_attempts: config.max_attempts,
            max_retries: config.max_retries,
            backoff: Duration::from_millis(config.backoff_ms),
        }
    }
}

/// Attempt/retry counters for one in-flight request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestState {
    attempts: u32,
    retries: u32,
}

impl RequestState {
    /// First routing round, no retries yet.
    pub const fn new() -> Self {
        Self {
            attempts: 1,
            retries: 0,
        }
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    pub fn retries(&self) -> u32 {
        self.retries
    }

    /// Same backend, one more retry.
    #[must_use]
    pub fn retried(self) -> Self {
        Self {
            retries: self.retries + 1,
            ..self
        }
    }

    /// Next routing round with a fresh retry budget.
    #[must_use]
    pub fn failed_over(self) -> Self {
        Self {
            attempts: self.attempts + 1,
            retries: 0,
        }
    }
}

impl Default for RequestState {
    fn default() -> Self {
        Self::new()
    }
}
