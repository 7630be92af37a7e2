//! Tenant Gateway
//!
//! Subdomain routing and role-based access in front of the marketing
//! application.
//!
//! # Architecture Overview
//!
//! ```text
//!                 ┌───────────────────────────────────────────────────────┐
//!                 │                    TENANT GATEWAY                      │
//!  Client         │  ┌──────────┐   ┌──────────────┐   ┌───────────────┐  │
//!  ───────────────┼─▶│ request  │──▶│   tenant     │──▶│   forward     │──┼──▶ Upstream
//!                 │  │ id/trace │   │   routing    │   │   handler     │  │    app
//!                 │  └──────────┘   └──────┬───────┘   └───────────────┘  │
//!                 │                        │ 307 redirect                  │
//!  ◀──────────────┼────────────────────────┘                               │
//!                 │                        ▲                               │
//!                 │                        │ session / profile             │
//!                 │                 ┌──────┴───────┐                       │
//!                 │                 │   identity   │◀──────────────────────┼──── Auth/profile
//!                 │                 └──────────────┘                       │     service
//!                 └───────────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use tenant_gateway::config::{load_config, GatewayConfig};
use tenant_gateway::observability::{logging, metrics};
use tenant_gateway::{HttpServer, Shutdown};

#[derive(Parser)]
#[command(name = "tenant-gateway")]
#[command(about = "Subdomain routing and role-based access gateway", long_about = None)]
struct Args {
    /// TOML configuration file. Defaults are used when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => load_config(path)?,
        None => GatewayConfig::default(),
    };

    logging::init_tracing(&config.observability.log_level);
    tracing::info!("tenant-gateway v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.listener.bind_address,
        upstream = %config.upstream.address,
        identity_enabled = config.identity.enabled,
        request_timeout_secs = config.timeouts.request_secs,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        if let Ok(addr) = config.observability.metrics_address.parse() {
            metrics::init_metrics(addr);
        } else {
            tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            );
        }
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    shutdown.trigger_on_ctrl_c();

    let server = HttpServer::new(config);
    server.run(listener, shutdown.subscribe()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
