//! Round-robin HTTP load balancer.
//!
//! # Architecture Overview
//!
//! ```text
//!                     ┌──────────────────────────────────────────────────┐
//!                     │                  LOAD BALANCER                   │
//!                     │                                                  │
//!   Client Request    │  ┌─────────┐    ┌──────────┐    ┌────────────┐   │
//!   ──────────────────┼─▶│  http   │───▶│ routing  │───▶│ ServerPool │   │
//!                     │  │ server  │    │  router  │    │ next peer  │   │
//!                     │  └─────────┘    └────┬─────┘    └─────┬──────┘   │
//!                     │                      │ retry/failover │          │
//!                     │                      ▼                ▼          │
//!   Client Response   │                 ┌─────────┐     ┌──────────┐     │
//!   ◀─────────────────┼─────────────────│ Backend │◀────│  health  │     │
//!                     │                 │ forward │     │ checker  │     │
//!                     │                 └────┬────┘     └──────────┘     │
//!                     └──────────────────────┼───────────────────────────┘
//!                                            ▼
//!                                      Backend servers
//! ```

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use rr_balancer::config::{load_config, Overrides};
use rr_balancer::lifecycle::{self, signals, Shutdown};
use rr_balancer::observability::logging;

#[derive(Parser, Debug)]
#[command(name = "rr-balancer")]
#[command(about = "Round-robin HTTP load balancer with health checks and failover", long_about = None)]
struct Args {
    /// Load balanced backends, use commas to separate
    #[arg(short, long)]
    backends: Option<String>,

    /// Port to serve on
    #[arg(short, long)]
    port: Option<u16>,

    /// Optional TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    let overrides = Overrides {
        backends: args.backends,
        port: args.port,
    };
    let config = match load_config(args.config.as_deref(), &overrides) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("rr-balancer: {}", e);
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = logging::init_logging(&config.observability.log_level) {
        eprintln!("rr-balancer: failed to initialize logging: {}", e);
    }

    tracing::info!(
        bind_address = %config.listener.bind_address,
        backends = config.backends.len(),
        health_interval_secs = config.health_check.interval_secs,
        max_attempts = config.retries.max_attempts,
        max_retries = config.retries.max_retries,
        "Configuration loaded"
    );

    let shutdown = Shutdown::new();
    signals::spawn_signal_handler(shutdown.clone());

    match lifecycle::start(config, &shutdown).await {
        Ok(()) => {
            tracing::info!("Shutdown complete");
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!(error = %e, "Load balancer failed");
            ExitCode::FAILURE
        }
    }
}
