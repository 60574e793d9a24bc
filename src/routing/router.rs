//! Per-request routing with retry and failover.
//!
//! # States
//! ```text
//! ROUTING    → attempts > max_attempts        → EXHAUSTED
//!            → no live peer                   → EXHAUSTED
//!            → peer selected                  → FORWARDING
//! FORWARDING → response                       → SUCCESS
//!            → error, retries < max_retries   → wait backoff → FORWARDING (same peer)
//!            → error, retries spent           → mark peer dead → ROUTING (attempts + 1)
//! ```
//!
//! # Design Decisions
//! - Explicit loop instead of re-entering the handler from an error callback
//! - The buffered request is rebuilt for every try; a failed try leaves
//!   nothing behind for the client
//! - No lock is held while a forward is in flight

use std::sync::Arc;

use axum::body::{Body, Bytes};
use axum::http::{request::Parts, Request, Response};

use crate::error::RouteError;
use crate::load_balancer::{Backend, ServerPool};
use crate::observability::metrics;
use crate::resilience::{RequestState, RetryPolicy};

/// Entry point for every proxied request.
#[derive(Debug, Clone)]
pub struct Router {
    pool: Arc<ServerPool>,
    policy: RetryPolicy,
}

impl Router {
    pub fn new(pool: Arc<ServerPool>, policy: RetryPolicy) -> Self {
        Self { pool, policy }
    }

    pub fn pool(&self) -> &Arc<ServerPool> {
        &self.pool
    }

    pub fn policy(&self) -> RetryPolicy {
        self.policy
    }

    /// Route one buffered request until a backend answers or the budget is spent.
    pub async fn route(&self, parts: &Parts, body: Bytes) -> Result<Response<Body>, RouteError> {
        let mut state = RequestState::new();

        loop {
            if !self.policy.can_route(state) {
                let attempts = state.attempts() - 1;
                tracing::warn!(path = %parts.uri.path(), attempts, "Max attempts reached");
                return Err(RouteError::Exhausted { attempts });
            }

            let Some(peer) = self.pool.get_next_peer() else {
                tracing::warn!(path = %parts.uri.path(), attempt = state.attempts(), "No backend available");
                return Err(RouteError::NoBackendAvailable);
            };

            match self.forward_with_retries(peer, parts, &body, state).await {
                Ok(response) => return Ok(response),
                Err(spent) => {
                    self.pool.mark_backend_status(peer.url(), false);
                    metrics::record_failover(peer.url().as_str());

                    state = spent.failed_over();
                    tracing::info!(
                        path = %parts.uri.path(),
                        backend = %peer.url(),
                        attempt = state.attempts(),
                        "Failing over to next backend"
                    );
                }
            }
        }
    }

    /// Forward to one peer, retrying it after a fixed backoff while the retry
    /// budget lasts. On exhaustion returns the final state.
    async fn forward_with_retries(
        &self,
        peer: &Backend,
        parts: &Parts,
        body: &Bytes,
        mut state: RequestState,
    ) -> Result<Response<Body>, RequestState> {
        loop {
            match peer.forward(build_request(parts, body)).await {
                Ok(response) => return Ok(response),
                Err(e) => {
                    tracing::warn!(
                        backend = %peer.url(),
                        attempt = state.attempts(),
                        retry = state.retries(),
                        error = %e,
                        "Forwarding failed"
                    );
                    if !self.policy.can_retry(state) {
                        return Err(state);
                    }
                    metrics::record_retry(peer.url().as_str());
                    tokio::time::sleep(self.policy.backoff).await;
                    state = state.retried();
                }
            }
        }
    }
}

/// Rebuild the outgoing request from the buffered parts.
fn build_request(parts: &Parts, body: &Bytes) -> Request<Body> {
    let mut request = Request::new(Body::from(body.clone()));
    *request.method_mut() = parts.method.clone();
    *request.uri_mut() = parts.uri.clone();
    *request.version_mut() = parts.version;
    *request.headers_mut() = parts.headers.clone();
    request
}
