//! route-mux server binary.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client Request        ┌──────────────────────────────────────────────┐
//!     ──────────────────────┼─▶ http::server ──▶ routing::Dispatcher       │
//!                           │                     │                        │
//!                           │                     ▼                        │
//!                           │        normalize ─▶ RouteTable (first match) │
//!                           │                     │                        │
//!     Client Response       │                     ▼                        │
//!     ◀─────────────────────┼──────────────── Handler / not-found          │
//!                           │                                              │
//!                           │  config (TOML, hot reload) · observability   │
//!                           │  lifecycle (signals, graceful shutdown)      │
//!                           └──────────────────────────────────────────────┘
//! ```

use clap::Parser;
use std::path::PathBuf;
use tokio::net::TcpListener;
use tokio::sync::mpsc;

use route_mux::config::{resolve_config, ConfigWatcher};
use route_mux::http::HttpServer;
use route_mux::lifecycle::{signals, Shutdown};
use route_mux::observability::{logging, metrics};

#[derive(Parser)]
#[command(name = "route-mux")]
#[command(about = "Multi-facet HTTP request router", long_about = None)]
struct Cli {
    /// TOML configuration file; watched for route changes.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override listener.bind_address.
    #[arg(short, long)]
    bind: Option<String>,

    /// Validate the configuration and exit.
    #[arg(long)]
    check: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = resolve_config(cli.config.as_deref(), cli.bind)?;

    if cli.check {
        println!("configuration OK ({} routes)", config.routes.len());
        return Ok(());
    }

    logging::init_logging(&config.observability);
    tracing::info!("route-mux v{} starting", env!("CARGO_PKG_VERSION"));

    tracing::info!(
        bind_address = %config.listener.bind_address,
        routes = config.routes.len(),
        request_timeout_secs = config.timeouts.request_secs,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    // Keep the watcher handle alive for the whole run.
    let (_watcher, config_updates) = match &cli.config {
        Some(path) => {
            let (watcher, updates) = ConfigWatcher::new(path);
            (Some(watcher.run()?), updates)
        }
        None => {
            let (_tx, updates) = mpsc::unbounded_channel();
            (None, updates)
        }
    };

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    signals::spawn_signal_handler(&shutdown);

    let server = HttpServer::new(config)?;
    server.run(listener, config_updates, shutdown.subscribe()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
