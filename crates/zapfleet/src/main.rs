//! # zapfleet
//!
//! Multi-session bulk messaging server binary — wires the session registry
//! and bulk dispatcher to the HTTP façade and starts serving.
//!
//! The messaging-protocol client itself is an external capability; this
//! binary ships with the stub connector, and embedders supply a real
//! [`zapfleet_client::ClientConnector`] implementation.

#![deny(unsafe_code)]

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use zapfleet_client::{ClientConnector, StubConnector};
use zapfleet_server::{ServerConfig, ZapfleetServer};

/// Zapfleet server.
#[derive(Parser, Debug)]
#[command(name = "zapfleet", about = "Multi-session bulk messaging server")]
struct Cli {
    /// Host to bind.
    #[arg(long, default_value = "0.0.0.0")]
    host: String,

    /// Port to bind (0 for auto-assign).
    #[arg(long, default_value = "3000")]
    port: u16,

    /// Directory uploaded contact rosters are stored in.
    #[arg(long)]
    roster_dir: Option<PathBuf>,

    /// Header of the roster column holding phone numbers.
    #[arg(long)]
    phone_column: Option<String>,

    /// Country code prefixed to every roster number.
    #[arg(long)]
    country_code: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let defaults = ServerConfig::default();
    let config = ServerConfig {
        host: args.host,
        port: args.port,
        roster_dir: args.roster_dir.unwrap_or(defaults.roster_dir),
        phone_column: args.phone_column.unwrap_or(defaults.phone_column),
        country_code: args.country_code.unwrap_or(defaults.country_code),
        max_upload_bytes: defaults.max_upload_bytes,
    };

    // The real protocol client is supplied by embedders; with the stub,
    // session creation fails cleanly and can be retried after wiring one.
    let connector: Arc<dyn ClientConnector> = Arc::new(StubConnector);
    warn!("no messaging backend compiled in — sessions will fail to authenticate");

    let server = ZapfleetServer::new(config.clone(), connector);
    let listener = TcpListener::bind((config.host.as_str(), config.port))
        .await
        .with_context(|| format!("failed to bind {}:{}", config.host, config.port))?;
    info!(addr = %listener.local_addr()?, "zapfleet server listening");

    axum::serve(listener, server.router())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("server stopped");
    Ok(())
}

/// Resolve on ctrl-c or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        let _ = tokio::signal::ctrl_c().await;
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                let _ = stream.recv().await;
            }
            Err(_) => std::future::pending().await,
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {}
        () = terminate => {}
    }
    info!("shutdown signal received");
}
