//! `ZapfleetServer` — axum HTTP server over the session registry.

use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use axum::Router;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tracing::info;

use zapfleet_client::ClientConnector;
use zapfleet_runtime::SessionRegistry;
use zapfleet_runtime::roster::RosterOptions;

use crate::config::ServerConfig;
use crate::rosters::RosterStore;
use crate::routes::{self, AppState};

/// The zapfleet server: owns the registry and roster store, builds the
/// router, and serves it.
pub struct ZapfleetServer {
    config: ServerConfig,
    registry: Arc<SessionRegistry>,
    rosters: Arc<RosterStore>,
    start_time: Instant,
}

impl ZapfleetServer {
    /// Create a server constructing session clients through `connector`.
    pub fn new(config: ServerConfig, connector: Arc<dyn ClientConnector>) -> Self {
        let rosters = Arc::new(RosterStore::new(config.roster_dir.clone()));
        Self {
            config,
            registry: Arc::new(SessionRegistry::new(connector)),
            rosters,
            start_time: Instant::now(),
        }
    }

    /// Server configuration.
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// The session registry.
    pub fn registry(&self) -> &Arc<SessionRegistry> {
        &self.registry
    }

    /// The roster store.
    pub fn rosters(&self) -> &Arc<RosterStore> {
        &self.rosters
    }

    /// Build the axum router with all routes.
    pub fn router(&self) -> Router {
        let state = AppState {
            registry: self.registry.clone(),
            rosters: self.rosters.clone(),
            roster_options: RosterOptions {
                phone_column: self.config.phone_column.clone(),
                country_code: self.config.country_code.clone(),
            },
            start_time: self.start_time,
        };
        routes::router(state, self.config.max_upload_bytes)
    }

    /// Bind the configured address and serve on a background task.
    /// Returns the bound address (useful with port 0) and the serve handle.
    pub async fn listen(&self) -> io::Result<(SocketAddr, JoinHandle<()>)> {
        let listener = TcpListener::bind((self.config.host.as_str(), self.config.port)).await?;
        let addr = listener.local_addr()?;
        let router = self.router();
        info!(%addr, "zapfleet server started");
        let handle = tokio::spawn(async move {
            let _ = axum::serve(listener, router).await;
        });
        Ok((addr, handle))
    }
}
