//! # Application State
//!
//! Everything a handler needs, cloned cheaply into each request.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    AppState                                             │
//! │                                                                         │
//! │  ┌──────────────┐  ┌──────────────┐  ┌──────────────┐  ┌────────────┐  │
//! │  │  Database    │  │BookingGateway│  │   Ledger     │  │  Request   │  │
//! │  │  (reads,     │  │  (booking    │  │ (transaction │  │  Counter   │  │
//! │  │   health)    │  │   writes)    │  │   writes)    │  │ (rate lim) │  │
//! │  └──────────────┘  └──────────────┘  └──────────────┘  └────────────┘  │
//! │          all share one SqlitePool and one business Clock               │
//! │                                                                         │
//! │  THREAD SAFETY:                                                        │
//! │  • Database, gateway, ledger: the pool is internally synchronized      │
//! │  • RequestCounter: tokio Mutex around the per-client windows           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use resort_core::{Clock, RoomCatalog};
use resort_db::{BookingGateway, Database, Ledger};
use tokio::sync::Mutex;

/// Shared state for every route.
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub gateway: BookingGateway,
    pub ledger: Ledger,
    pub clock: Arc<dyn Clock>,
    pub rate_limiter: Arc<RequestCounter>,
    pub api_key: Option<Arc<str>>,
}

impl AppState {
    pub fn new(
        db: Database,
        clock: Arc<dyn Clock>,
        catalog: RoomCatalog,
        rate_limiter: RequestCounter,
        api_key: Option<String>,
    ) -> Self {
        AppState {
            gateway: db.gateway_with_catalog(clock.clone(), Arc::new(catalog)),
            ledger: db.ledger(clock.clone()),
            db,
            clock,
            rate_limiter: Arc::new(rate_limiter),
            api_key: api_key.map(Arc::from),
        }
    }

    pub fn catalog(&self) -> &RoomCatalog {
        self.gateway.catalog()
    }
}

// =============================================================================
// Rate Limiting
// =============================================================================

#[derive(Debug, Clone, Copy)]
struct Window {
    count: u32,
    reset_at: Instant,
}

/// Fixed-window request counts per client key.
///
/// The first request of a client opens a window of `window` length. Up to
/// `max` requests are admitted in it; later ones are refused until it ends.
/// Expired windows linger until [`sweep`](Self::sweep) evicts them.
#[derive(Debug)]
pub struct RequestCounter {
    max: u32,
    window: Duration,
    windows: Mutex<HashMap<String, Window>>,
}

impl RequestCounter {
    pub fn new(max: u32, window: Duration) -> Self {
        RequestCounter {
            max,
            window,
            windows: Mutex::new(HashMap::new()),
        }
    }

    /// Counts a request now. `Err` carries the seconds until the window ends.
    pub async fn check(&self, key: &str) -> Result<(), u64> {
        self.check_at(key, Instant::now()).await
    }

    /// Counts a request at `now`.
    pub async fn check_at(&self, key: &str, now: Instant) -> Result<(), u64> {
        let mut windows = self.windows.lock().await;

        match windows.get_mut(key) {
            Some(window) if now <= window.reset_at => {
                if window.count >= self.max {
                    let remaining = window.reset_at.saturating_duration_since(now);
                    return Err(ceil_secs(remaining));
                }
                window.count += 1;
                Ok(())
            }
            _ => {
                windows.insert(
                    key.to_string(),
                    Window {
                        count: 1,
                        reset_at: now + self.window,
                    },
                );
                Ok(())
            }
        }
    }

    /// Evicts expired windows, returning how many went.
    pub async fn sweep(&self) -> usize {
        self.sweep_at(Instant::now()).await
    }

    pub async fn sweep_at(&self, now: Instant) -> usize {
        let mut windows = self.windows.lock().await;
        let before = windows.len();
        windows.retain(|_, window| window.reset_at >= now);
        before - windows.len()
    }

    /// Number of tracked clients.
    pub async fn len(&self) -> usize {
        self.windows.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

fn ceil_secs(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis().div_ceil(1000)).unwrap_or(u64::MAX)
}
