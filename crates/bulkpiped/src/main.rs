//! bulkpiped — the bulkpipe server.
//!
//! Serves `GET /ping` (timestamp heartbeat) and `GET /download` (20 GiB of
//! synthetic payload in 10 MiB chunks).
//!
//! # Usage
//!
//! ```text
//! bulkpiped --port 8080
//! bulkpiped --config bulkpipe.toml
//! ```

use std::path::PathBuf;

use anyhow::Context;
use bulkpipe_api::ApiState;
use bulkpipe_core::BulkpipeConfig;
use clap::Parser;
use tokio::net::TcpListener;
use tracing::{error, info};

#[derive(Parser)]
#[command(name = "bulkpiped", about = "bulkpipe server", version)]
struct Cli {
    /// Address to bind (overrides the config file).
    #[arg(long)]
    host: Option<String>,

    /// Port to listen on (overrides the config file).
    #[arg(long)]
    port: Option<u16>,

    /// Optional bulkpipe.toml.
    #[arg(long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,bulkpiped=debug".into()),
        )
        .init();

    let cli = Cli::parse();
    let config = BulkpipeConfig::load(cli.config.as_deref())?;

    let host = cli.host.unwrap_or_else(|| config.server_host());
    let port = cli.port.unwrap_or_else(|| config.server_port());

    info!("bulkpipe server starting");

    let listener = bind(&host, port).await?;

    bulkpipe_api::serve(listener, ApiState::new(), shutdown_signal()).await?;

    info!("bulkpipe server stopped");
    Ok(())
}

/// Bind `host:port`, resolving names like `localhost` and accepting bare
/// IPv6 literals such as `::`.
async fn bind(host: &str, port: u16) -> anyhow::Result<TcpListener> {
    TcpListener::bind((host, port))
        .await
        .with_context(|| format!("failed to bind {host}:{port}"))
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("shutdown signal received"),
        Err(e) => error!(error = %e, "failed to listen for ctrl-c, shutting down"),
    }
}
