//! # Till Reports Server
//!
//! HTTP server rendering the back-office report pages over the till store.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Report Server                                    │
//! │                                                                         │
//! │  Browser ───► HTTP (8080) ───► gate → resolve → query → reduce          │
//! │                                   │                        │            │
//! │                                   ▼                        ▼            │
//! │                              SQLite (WAL)           HTML page / CSV     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

mod auth;
mod config;
mod error;
mod export;
mod render;
mod routes;
mod settings;
mod state;

use std::net::SocketAddr;

use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::config::ServerConfig;
use crate::state::AppState;
use till_db::{Database, DbConfig};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing; RUST_LOG overrides the default level
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .init();

    info!("Starting Till Reports server...");

    // Load configuration
    let config = ServerConfig::load()?;
    info!(
        port = config.http_port,
        db = %config.database_path,
        timeout_secs = config.query_timeout.as_secs(),
        "Configuration loaded"
    );

    // Connect and migrate; after this every report table exists
    let db_config = DbConfig::new(&config.database_path)
        .max_connections(config.max_connections);
    let db = Database::new(db_config).await?;
    info!("Database ready");

    let state = AppState::new(db, config.query_timeout);
    let app = routes::router(state);

    let addr: SocketAddr = format!("0.0.0.0:{}", config.http_port).parse()?;
    info!(%addr, "Starting HTTP server");

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

/// Resolves on Ctrl+C so in-flight requests can finish.
async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %err, "Failed to listen for shutdown signal");
    }
    info!("Shutdown signal received");
}
