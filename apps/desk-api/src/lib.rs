//! # Resort Desk API
//!
//! HTTP JSON surface for the front desk UI and the booking import pipelines.
//!
//! ## Request Path
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Desk API Server                                  │
//! │                                                                         │
//! │  request ──► CORS ──► TraceLayer ──► rate limit ──► auth (writes)      │
//! │                                                        │                │
//! │                                                        ▼                │
//! │                                                  routes::router()       │
//! │                                                        │                │
//! │                        ┌───────────────────────────────┼─────────────┐  │
//! │                        ▼                               ▼             ▼  │
//! │                 BookingGateway                       Ledger   Repositories
//! │                        │                               │             │  │
//! │                        └──────────────► SQLite ◄───────┴─────────────┘  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The binary in `main.rs` only loads config, opens the database and serves
//! [`app`]. Tests drive [`app`] directly with `tower::ServiceExt::oneshot`.

pub mod config;
pub mod error;
pub mod middleware;
pub mod routes;
pub mod state;

use std::sync::Arc;
use std::time::Duration;

use axum::middleware as axum_middleware;
use axum::Router;
use tokio::task::JoinHandle;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::debug;

pub use config::{ConfigError, DeskConfig, StorageBackend};
pub use error::{ApiError, ApiResult};
pub use state::{AppState, RequestCounter};

/// Builds the full application: routes, middleware and state.
pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    routes::router()
        .layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::auth_middleware,
        ))
        .layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::rate_limit_middleware,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Evicts expired rate-limit windows every `every` until the runtime stops.
pub fn spawn_rate_limit_sweeper(counter: Arc<RequestCounter>, every: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        // The first tick completes immediately
        ticker.tick().await;
        loop {
            ticker.tick().await;
            let evicted = counter.sweep().await;
            if evicted > 0 {
                debug!(evicted, "Swept expired rate-limit windows");
            }
        }
    })
}
