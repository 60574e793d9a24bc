//! Forwarding engine.
//!
//! # Responsibilities
//! - Relay a request to one backend and hand back its response
//! - Rewrite the target URI (scheme, authority, joined path, merged query)
//! - Enforce the per-try deadline
//! - Report transport failures as `ForwardError`, never retry itself
//!
//! # Design Decisions
//! - Non-2xx upstream responses are successes here; they reach the client as-is
//! - Response bodies are streamed back, not buffered
//! - One pooled hyper client is shared by every backend's forwarder

use std::time::Duration;

use axum::body::Body;
use axum::http::{uri::InvalidUri, Request, Response, Uri, Version};
use futures_util::future::BoxFuture;
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};
use tokio::time;
use url::{Position, Url};

use crate::error::ForwardError;
use crate::security::headers::strip_hop_by_hop;

/// Something that can carry a request to a single upstream.
pub trait Forwarder: Send + Sync {
    fn forward(&self, request: Request<Body>) -> BoxFuture<'_, Result<Response<Body>, ForwardError>>;
}

/// Pooled HTTP/1.1 client shared by all forwarders.
pub type UpstreamClient = Client<HttpConnector, Body>;

/// Build the shared upstream client with the given connect timeout.
pub fn build_client(connect_timeout: Duration) -> UpstreamClient {
    let mut connector = HttpConnector::new();
    connector.set_connect_timeout(Some(connect_timeout));
    connector.set_nodelay(true);
    Client::builder(TokioExecutor::new()).build(connector)
}

/// Forwarder bound to one backend URL.
#[derive(Clone)]
pub struct HttpForwarder {
    target: Url,
    client: UpstreamClient,
    timeout: Duration,
}

impl HttpForwarder {
    pub fn new(target: Url, client: UpstreamClient, timeout: Duration) -> Self {
        Self {
            target,
            client,
            timeout,
        }
    }

    pub fn target(&self) -> &Url {
        &self.target
    }

    async fn send(&self, mut request: Request<Body>) -> Result<Response<Body>, ForwardError> {
        let backend = self.target.as_str();

        let uri = rewrite_uri(&self.target, request.uri()).map_err(|e| ForwardError::Request {
            backend: backend.to_string(),
            reason: e.to_string(),
        })?;
        *request.uri_mut() = uri;
        *request.version_mut() = Version::HTTP_11;

        match time::timeout(self.timeout, self.client.request(request)).await {
            Ok(Ok(response)) => {
                let (mut parts, body) = response.into_parts();
                strip_hop_by_hop(&mut parts.headers);
                Ok(Response::from_parts(parts, Body::new(body)))
            }
            Ok(Err(source)) => Err(ForwardError::Transport {
                backend: backend.to_string(),
                source,
            }),
            Err(_) => Err(ForwardError::Timeout {
                backend: backend.to_string(),
                timeout: self.timeout,
            }),
        }
    }
}

impl std::fmt::Debug for HttpForwarder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpForwarder")
            .field("target", &self.target.as_str())
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl Forwarder for HttpForwarder {
    fn forward(&self, request: Request<Body>) -> BoxFuture<'_, Result<Response<Body>, ForwardError>> {
        Box::pin(self.send(request))
    }
}

/// Point `uri` at `target`: take the target's scheme and authority, append the
/// request path to the target's base path and merge both query strings.
pub fn rewrite_uri(target: &Url, uri: &Uri) -> Result<Uri, InvalidUri> {
    let authority = &target[Position::BeforeHost..Position::AfterPort];
    let path = join_paths(target.path(), uri.path());

    let query = match (target.query().filter(|q| !q.is_empty()), uri.query().filter(|q| !q.is_empty())) {
        (Some(t), Some(r)) => format!("?{}&{}", t, r),
        (Some(q), None) | (None, Some(q)) => format!("?{}", q),
        (None, None) => String::new(),
    };

    format!("{}://{}{}{}", target.scheme(), authority, path, query).parse()
}

fn join_paths(base: &str, path: &str) -> String {
    match (base.ends_with('/'), path.starts_with('/')) {
        (true, true) => format!("{}{}", base, &path[1..]),
        (false, false) => format!("{}/{}", base, path),
        _ => format!("{}{}", base, path),
    }
}
