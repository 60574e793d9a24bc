//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum router: every path and method goes to one handler
//! - Wire up middleware (tracing, request ID)
//! - Buffer the request body so failed tries can be replayed
//! - Hand requests to the routing engine, map failures to 503
//! - Start the health checker alongside the listener

use axum::{
    body::Body,
    extract::{ConnectInfo, State},
    http::Request,
    response::{IntoResponse, Response},
    routing::any,
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use crate::config::{ConfigError, LbConfig};
use crate::health::HealthChecker;
use crate::http::request::{
    make_request_span, propagate_request_id_layer, request_id, set_request_id_layer,
};
use crate::http::response::{body_read_failure, payload_too_large};
use crate::load_balancer::ServerPool;
use crate::observability::metrics;
use crate::resilience::RetryPolicy;
use crate::routing::Router as LbRouter;
use crate::security::headers::prepare_upstream_headers;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub router: Arc<LbRouter>,
    pub max_body_bytes: usize,
}

/// HTTP server for the load balancer.
pub struct HttpServer {
    router: Router,
    config: LbConfig,
    pool: Arc<ServerPool>,
}

impl HttpServer {
    /// Create a new HTTP server, building the backend pool from configuration.
    pub fn new(config: LbConfig) -> Result<Self, ConfigError> {
        let pool = Arc::new(ServerPool::from_config(&config)?);
        Ok(Self::with_pool(config, pool))
    }

    /// Create a server around an already built pool.
    pub fn with_pool(config: LbConfig, pool: Arc<ServerPool>) -> Self {
        let policy = RetryPolicy::from(&config.retries);
        let state = AppState {
            router: Arc::new(LbRouter::new(pool.clone(), policy)),
            max_body_bytes: config.limits.max_body_bytes,
        };

        let router = Self::build_router(state);
        Self {
            router,
            config,
            pool,
        }
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(state: AppState) -> Router {
        Router::new()
            .route("/{*path}", any(proxy_handler))
            .route("/", any(proxy_handler))
            .with_state(state)
            .layer(
                ServiceBuilder::new()
                    .layer(set_request_id_layer())
                    .layer(TraceLayer::new_for_http().make_span_with(make_request_span))
                    .layer(propagate_request_id_layer()),
            )
    }

    /// Run the server until the shutdown signal, accepting connections on the
    /// given listener.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            backends = self.pool.len(),
            "Load balancer started"
        );

        if self.config.health_check.enabled {
            let checker = HealthChecker::from_config(self.pool.clone(), &self.config.health_check);
            tokio::spawn(checker.run(shutdown.resubscribe()));
        } else {
            tracing::info!("Health checks disabled");
        }

        let app = self.router.into_make_service_with_connect_info::<SocketAddr>();

        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    pub fn pool(&self) -> &Arc<ServerPool> {
        &self.pool
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &LbConfig {
        &self.config
    }
}

/// Main proxy handler.
/// Buffers the body, then lets the routing engine pick, retry and fail over.
async fn proxy_handler(
    State(state): State<AppState>,
    ConnectInfo(client): ConnectInfo<SocketAddr>,
    request: Request<Body>,
) -> Response {
    let start_time = Instant::now();
    let (mut parts, body) = request.into_parts();
    let request_id = request_id(&parts.headers).to_string();

    let declared_len = parts
        .headers
        .get(axum::http::header::CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<usize>().ok());
    if declared_len.is_some_and(|len| len > state.max_body_bytes) {
        tracing::warn!(request_id = %request_id, "Request body over limit");
        metrics::record_request(413, start_time);
        return payload_too_large(state.max_body_bytes);
    }

    let body = match axum::body::to_bytes(body, state.max_body_bytes).await {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::warn!(request_id = %request_id, error = %e, "Failed to read request body");
            let response = body_read_failure(&e, state.max_body_bytes);
            metrics::record_request(response.status().as_u16(), start_time);
            return response;
        }
    };

    prepare_upstream_headers(&mut parts.headers, client.ip());

    let response = match state.router.route(&parts, body).await {
        Ok(response) => response,
        Err(e) => {
            tracing::warn!(
                request_id = %request_id,
                client = %client,
                path = %parts.uri.path(),
                error = %e,
                "Request failed"
            );
            e.into_response()
        }
    };

    metrics::record_request(response.status().as_u16(), start_time);
    response
}
