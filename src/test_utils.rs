//! In-process forwarders and pool builders for unit tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, Response, StatusCode};
use futures_util::future::BoxFuture;
use url::Url;

use crate::error::ForwardError;
use crate::http::client::Forwarder;
use crate::load_balancer::{Backend, ServerPool};

/// Mock forwarder that fails its first `failures` calls, then answers 200
/// with `body`. Every call is counted.
#[derive(Debug, Clone)]
pub struct MockForwarder {
    name: String,
    failures: usize,
    calls: Arc<AtomicUsize>,
}

impl MockForwarder {
    pub fn healthy(name: &str) -> Self {
        Self::failing_first(name, 0)
    }

    pub fn always_failing(name: &str) -> Self {
        Self::failing_first(name, usize::MAX)
    }

    pub fn failing_first(name: &str, failures: usize) -> Self {
        Self {
            name: name.to_string(),
            failures,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Shared call counter; stays valid after the forwarder moves into a backend.
    pub fn calls(&self) -> Arc<AtomicUsize> {
        self.calls.clone()
    }
}

impl Forwarder for MockForwarder {
    fn forward(&self, _request: Request<Body>) -> BoxFuture<'_, Result<Response<Body>, ForwardError>> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        Box::pin(async move {
            if call < self.failures {
                return Err(ForwardError::Timeout {
                    backend: self.name.clone(),
                    timeout: Duration::from_millis(1),
                });
            }
            Ok(Response::builder()
                .status(StatusCode::OK)
                .body(Body::from(self.name.clone()))
                .unwrap())
        })
    }
}

/// URL used for a mock backend with the given name.
pub fn mock_url(name: &str) -> Url {
    Url::parse(&format!("http://{}.test:80", name)).unwrap()
}

/// Build a pool of healthy mock backends, one per name, in order.
pub fn mock_pool(names: &[&str]) -> ServerPool {
    pool_of(names.iter().map(|n| MockForwarder::healthy(n)).collect())
}

/// Build a pool from prepared forwarders, named after their `name`.
pub fn pool_of(forwarders: Vec<MockForwarder>) -> ServerPool {
    let mut pool = ServerPool::new();
    for forwarder in forwarders {
        let url = mock_url(&forwarder.name);
        pool.add_backend(Backend::new(url, forwarder));
    }
    pool
}

/// Read a response body into a string.
pub async fn body_string(response: Response<Body>) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}
