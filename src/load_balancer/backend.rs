//! Backend abstraction.
//!
//! # Responsibilities
//! - Represent a single upstream server
//! - Track liveness (the only state that changes after construction)
//! - Own the forwarding handle for this upstream

use std::fmt;

use axum::body::Body;
use axum::http::{Request, Response};
use parking_lot::RwLock;
use url::Url;

use crate::error::ForwardError;
use crate::http::client::Forwarder;

/// A single backend server.
pub struct Backend {
    /// Upstream address; immutable.
    url: Url,
    /// Liveness flag. Read on every routing decision, written by health
    /// checks and failover only.
    alive: RwLock<bool>,
    forwarder: Box<dyn Forwarder>,
}

impl Backend {
    /// Create a new backend. Backends start alive.
    pub fn new(url: Url, forwarder: impl Forwarder + 'static) -> Self {
        Self {
            url,
            alive: RwLock::new(true),
            forwarder: Box::new(forwarder),
        }
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Set liveness, returning the previous value.
    pub fn set_alive(&self, alive: bool) -> bool {
        let mut guard = self.alive.write();
        std::mem::replace(&mut *guard, alive)
    }

    pub fn is_alive(&self) -> bool {
        *self.alive.read()
    }

    /// Forward one request. No retry happens here.
    pub async fn forward(&self, request: Request<Body>) -> Result<Response<Body>, ForwardError> {
        self.forwarder.forward(request).await
    }
}

impl fmt::Debug for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Backend")
            .field("url", &self.url.as_str())
            .field("alive", &self.is_alive())
            .finish()
    }
}
