//! Startup orchestration.
//!
//! # Responsibilities
//! - Build the backend pool from validated configuration
//! - Start optional side listeners (metrics, admin)
//! - Bind the main listener last and serve until shutdown
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - Subsystems initialize in order, not concurrently
//! - Listeners start last (traffic only when ready)

use std::net::SocketAddr;

use metrics_exporter_prometheus::BuildError;
use thiserror::Error;
use tokio::net::TcpListener;

use crate::admin::{serve_admin, AdminState};
use crate::config::{ConfigError, LbConfig};
use crate::http::HttpServer;
use crate::lifecycle::shutdown::Shutdown;
use crate::observability::metrics;

#[derive(Debug, Error)]
pub enum StartupError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("invalid {what} address '{address}'")]
    Address { what: &'static str, address: String },

    #[error("failed to bind {what} on {address}: {source}")]
    Bind {
        what: &'static str,
        address: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to install metrics exporter: {0}")]
    Metrics(#[from] BuildError),

    #[error("server error: {0}")]
    Serve(#[source] std::io::Error),
}

fn parse_addr(what: &'static str, address: &str) -> Result<SocketAddr, StartupError> {
    address.parse().map_err(|_| StartupError::Address {
        what,
        address: address.to_string(),
    })
}

async fn bind(what: &'static str, address: &str) -> Result<TcpListener, StartupError> {
    let addr = parse_addr(what, address)?;
    TcpListener::bind(addr).await.map_err(|source| StartupError::Bind {
        what,
        address: address.to_string(),
        source,
    })
}

/// Bring the balancer up and serve until `shutdown` fires.
pub async fn start(config: LbConfig, shutdown: &Shutdown) -> Result<(), StartupError> {
    let server = HttpServer::new(config.clone())?;

    if config.observability.metrics_enabled {
        let addr = parse_addr("metrics", &config.observability.metrics_address)?;
        metrics::init_metrics(addr)?;
    }

    if config.admin.enabled {
        let listener = bind("admin", &config.admin.bind_address).await?;
        let state = AdminState {
            pool: server.pool().clone(),
            api_key: config.admin.api_key.as_str().into(),
        };
        let admin_shutdown = shutdown.subscribe();
        tokio::spawn(async move {
            if let Err(e) = serve_admin(listener, state, admin_shutdown).await {
                tracing::error!(error = %e, "Admin API stopped");
            }
        });
    }

    let listener = bind("listener", &config.listener.bind_address).await?;
    server
        .run(listener, shutdown.subscribe())
        .await
        .map_err(StartupError::Serve)
}
