//! # Resort Desk API Server
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Front desk UI ──┐                                                      │
//! │                  ├──► HTTP (8080) ──► desk_api::app ──► SQLite         │
//! │  OTA importer ───┘                                                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```bash
//! RESORT_STORAGE=memory RUST_LOG=debug cargo run -p desk-api
//! RESORT_DESK_CONFIG=/etc/resort/desk.toml cargo run -p desk-api --release
//! ```

use std::sync::Arc;

use anyhow::Context;
use desk_api::{app, spawn_rate_limit_sweeper, AppState, DeskConfig, RequestCounter};
use resort_core::{Clock, RoomCatalog};
use resort_db::{Database, SystemClock};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .init();

    info!("Starting Resort Desk API...");

    let config = DeskConfig::load().context("loading configuration")?;
    let db_config = config.db_config()?;
    info!(
        addr = %config.bind_addr,
        storage = ?config.storage,
        db_path = ?config.db_path,
        auth = config.api_key.is_some(),
        "Configuration loaded"
    );
    if db_config.is_in_memory() {
        warn!("In-memory storage: all data is lost when the server stops");
    }

    let db = Database::new(db_config)
        .await
        .context("opening database")?;

    let clock: Arc<dyn Clock> = Arc::new(SystemClock::from_offset_minutes(
        config.utc_offset_minutes,
    ));
    let limiter = RequestCounter::new(config.rate_limit_max, config.rate_limit_window());
    let state = AppState::new(
        db.clone(),
        clock,
        RoomCatalog::default(),
        limiter,
        config.api_key.clone(),
    );

    let sweeper = spawn_rate_limit_sweeper(state.rate_limiter.clone(), config.rate_limit_sweep());

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("binding {}", config.bind_addr))?;
    info!(addr = %config.bind_addr, "Listening");

    axum::serve(listener, app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    sweeper.abort();
    db.close().await;
    info!("Server shutdown complete");
    Ok(())
}

/// Resolves on Ctrl+C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            warn!(error = %err, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                warn!(error = %err, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received, starting graceful shutdown...");
}
