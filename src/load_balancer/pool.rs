//! Backend pool management.
//!
//! # Responsibilities
//! - Hold the fixed, ordered set of backends
//! - Round-robin peer selection that skips dead backends
//! - Mark backends dead on behalf of the failover path

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use url::Url;

use crate::config::{ConfigError, LbConfig};
use crate::config::validation::{parse_backend_url, ValidationError};
use crate::http::client::{build_client, HttpForwarder};
use crate::load_balancer::backend::Backend;

/// The ordered collection of backends plus the shared rotation cursor.
///
/// Backends are appended during startup only; afterwards the sequence is
/// read concurrently without synchronization.
#[derive(Debug, Default)]
pub struct ServerPool {
    backends: Vec<Backend>,
    current: AtomicUsize,
}

impl ServerPool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the pool from configuration, one HTTP forwarder per backend.
    pub fn from_config(config: &LbConfig) -> Result<Self, ConfigError> {
        if config.backends.is_empty() {
            return Err(ConfigError::Validation(vec![ValidationError::NoBackends]));
        }

        let client = build_client(Duration::from_secs(config.timeouts.connect_secs));
        let request_timeout = Duration::from_secs(config.timeouts.request_secs);

        let mut pool = Self::new();
        for raw in &config.backends {
            let url = parse_backend_url(raw).map_err(|e| ConfigError::Validation(vec![e]))?;
            let forwarder = HttpForwarder::new(url.clone(), client.clone(), request_timeout);
            tracing::info!(backend = %url, "Configured backend");
            pool.add_backend(Backend::new(url, forwarder));
        }
        Ok(pool)
    }

    /// Append a backend. Startup only: takes `&mut self`, so it cannot race
    /// with selection once the pool is shared.
    pub fn add_backend(&mut self, backend: Backend) {
        self.backends.push(backend);
    }

    pub fn backends(&self) -> &[Backend] {
        &self.backends
    }

    pub fn len(&self) -> usize {
        self.backends.len()
    }

    pub fn is_empty(&self) -> bool {
        self.backends.is_empty()
    }

    /// Number of backends currently marked alive.
    pub fn alive_count(&self) -> usize {
        self.backends.iter().filter(|b| b.is_alive()).count()
    }

    /// Advance the cursor and return its new value modulo the pool length.
    ///
    /// The pool must not be empty.
    pub fn next_index(&self) -> usize {
        let previous = self.current.fetch_add(1, Ordering::Relaxed);
        previous.wrapping_add(1) % self.backends.len()
    }

    /// Select the next live backend, scanning exactly one lap from the cursor.
    ///
    /// Never waits for a backend to come back: returns `None` when the whole
    /// lap is dead.
    pub fn get_next_peer(&self) -> Option<&Backend> {
        let len = self.backends.len();
        if len == 0 {
            return None;
        }

        let next = self.next_index();
        for i in next..next + len {
            let idx = i % len;
            let backend = &self.backends[idx];
            if backend.is_alive() {
                if i != next {
                    // Best effort; a lost store costs one extra scan step later.
                    self.current.store(idx, Ordering::Relaxed);
                }
                tracing::debug!(backend = %backend.url(), "Selected backend");
                return Some(backend);
            }
        }
        None
    }

    /// Set liveness of the backend with this URL. Returns false when no
    /// backend matches.
    pub fn mark_backend_status(&self, url: &Url, alive: bool) -> bool {
        match self.backends.iter().find(|b| b.url() == url) {
            Some(backend) => {
                let was_alive = backend.set_alive(alive);
                if was_alive != alive {
                    tracing::warn!(backend = %url, alive, "Backend status changed");
                }
                true
            }
            None => false,
        }
    }
}
