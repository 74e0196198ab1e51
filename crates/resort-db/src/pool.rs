//! # Opening the Store
//!
//! One [`Database`] per process. It owns the SQLite pool and hands out the
//! repositories, the gateway and the ledger, all sharing that pool.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  storage = "sqlite"                 storage = "memory"                  │
//! │  DbConfig::new(path)                DbConfig::in_memory()               │
//! │    WAL + NORMAL sync                  one connection, kept forever      │
//! │    up to 5 connections                (a second one would be a          │
//! │                                        different, empty database)       │
//! │          └──────────────┬──────────────────┘                            │
//! │                         ▼                                               │
//! │            Database::new ── migrate ──► ready                           │
//! │                         │                                               │
//! │     bookings() · transactions() · outbox() · gateway() · ledger()      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! WAL lets two desks list bookings while a third is creating one.

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::SqlitePool;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

use resort_core::{Clock, RoomCatalog};

use crate::error::{DbError, DbResult};
use crate::gateway::BookingGateway;
use crate::ledger::Ledger;
use crate::migrations;
use crate::repository::booking::BookingRepository;
use crate::repository::outbox::OutboxRepository;
use crate::repository::transaction::TransactionRepository;

// =============================================================================
// Configuration
// =============================================================================

/// How to open the store.
///
/// ## Example
/// ```rust,ignore
/// let config = DbConfig::new("/var/lib/resort-desk/desk.db")
///     .max_connections(5)
///     .busy_timeout(Duration::from_secs(5));
/// ```
#[derive(Debug, Clone)]
pub struct DbConfig {
    /// Path to the SQLite database file, or `None` for a private
    /// in-memory database.
    pub database_path: Option<PathBuf>,

    /// Default: 5 (a handful of front-desk terminals)
    pub max_connections: u32,

    /// Default: 1
    pub min_connections: u32,

    /// How long to wait for a free connection. Default: 30 seconds
    pub connect_timeout: Duration,

    /// How long a writer waits on a locked database before failing.
    /// Default: 5 seconds
    pub busy_timeout: Duration,

    /// Idle timeout before closing a connection. `None` keeps connections
    /// forever, which an in-memory database needs to keep its data.
    pub idle_timeout: Option<Duration>,

    /// Default: true
    pub run_migrations: bool,
}

impl DbConfig {
    /// File-backed configuration. The file is created if missing.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        DbConfig {
            database_path: Some(path.into()),
            max_connections: 5,
            min_connections: 1,
            connect_timeout: Duration::from_secs(30),
            busy_timeout: Duration::from_secs(5),
            idle_timeout: Some(Duration::from_secs(600)),
            run_migrations: true,
        }
    }

    /// In-memory configuration for tests and `storage = "memory"`.
    ///
    /// ## Usage
    /// ```rust,ignore
    /// let db = Database::new(DbConfig::in_memory()).await?;
    /// // Fresh, isolated schema on every call
    /// ```
    pub fn in_memory() -> Self {
        DbConfig {
            database_path: None,
            // Every connection to :memory: is its own database
            max_connections: 1,
            min_connections: 1,
            connect_timeout: Duration::from_secs(5),
            busy_timeout: Duration::from_secs(5),
            idle_timeout: None,
            run_migrations: true,
        }
    }

    pub fn max_connections(mut self, max: u32) -> Self {
        self.max_connections = max;
        self
    }

    pub fn min_connections(mut self, min: u32) -> Self {
        self.min_connections = min;
        self
    }

    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    pub fn busy_timeout(mut self, timeout: Duration) -> Self {
        self.busy_timeout = timeout;
        self
    }

    pub fn run_migrations(mut self, run: bool) -> Self {
        self.run_migrations = run;
        self
    }

    pub fn is_in_memory(&self) -> bool {
        self.database_path.is_none()
    }

    fn connect_options(&self) -> DbResult<SqliteConnectOptions> {
        let options = match &self.database_path {
            Some(path) => SqliteConnectOptions::new()
                .filename(path)
                .create_if_missing(true)
                // Readers don't block writers
                .journal_mode(SqliteJournalMode::Wal)
                .synchronous(SqliteSynchronous::Normal),
            None => SqliteConnectOptions::from_str("sqlite::memory:")
                .map_err(|e| DbError::ConnectionFailed(e.to_string()))?,
        };

        Ok(options
            .foreign_keys(true)
            .busy_timeout(self.busy_timeout))
    }
}

// =============================================================================
// Database
// =============================================================================

/// Handle to the front-desk store. Cheap to clone.
///
/// ## Usage in Handlers
/// ```rust,ignore
/// async fn list_bookings(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
///     let bookings = state.db.bookings().list(&BookingFilter::default()).await?;
///     Ok(Json(json!({ "success": true, "data": bookings })))
/// }
/// ```
#[derive(Debug, Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Opens the pool and, unless disabled, applies pending migrations.
    ///
    /// File databases run in WAL mode with NORMAL sync. Foreign keys are on
    /// for both kinds.
    pub async fn new(config: DbConfig) -> DbResult<Self> {
        match &config.database_path {
            Some(path) => info!(path = %path.display(), "Opening SQLite database"),
            None => info!("Opening in-memory database"),
        }

        let connect_options = config.connect_options()?;
        debug!(busy_timeout = ?config.busy_timeout, "Connection options configured");

        let mut pool_options = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(config.connect_timeout)
            .idle_timeout(config.idle_timeout);
        if config.is_in_memory() {
            pool_options = pool_options.max_lifetime(None);
        }

        let pool = pool_options
            .connect_with(connect_options)
            .await
            .map_err(|e| DbError::ConnectionFailed(e.to_string()))?;

        info!(
            connections = config.max_connections,
            in_memory = config.is_in_memory(),
            "Store ready"
        );

        let database = Database { pool };
        if config.run_migrations {
            database.run_migrations().await?;
        }
        Ok(database)
    }

    /// Applies pending migrations. `new` already does this unless the
    /// config turned it off.
    pub async fn run_migrations(&self) -> DbResult<()> {
        migrations::run_migrations(&self.pool).await
    }

    /// Raw pool access, for diagnostics and the seed binary.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Returns the booking repository (reads only).
    ///
    /// ## Example
    /// ```rust,ignore
    /// let room_five = db.bookings().for_room("5").await?;
    /// ```
    pub fn bookings(&self) -> BookingRepository {
        BookingRepository::new(self.pool.clone())
    }

    /// Returns the transaction repository.
    pub fn transactions(&self) -> TransactionRepository {
        TransactionRepository::new(self.pool.clone())
    }

    /// Returns the notification outbox repository.
    pub fn outbox(&self) -> OutboxRepository {
        OutboxRepository::new(self.pool.clone())
    }

    /// Returns a booking gateway over the default room catalog.
    pub fn gateway(&self, clock: Arc<dyn Clock>) -> BookingGateway {
        self.gateway_with_catalog(clock, Arc::new(RoomCatalog::default()))
    }

    pub fn gateway_with_catalog(
        &self,
        clock: Arc<dyn Clock>,
        catalog: Arc<RoomCatalog>,
    ) -> BookingGateway {
        BookingGateway::new(self.pool.clone(), clock, catalog)
    }

    /// Returns the transaction ledger.
    pub fn ledger(&self, clock: Arc<dyn Clock>) -> Ledger {
        Ledger::new(self.pool.clone(), clock)
    }

    /// Closes the pool on shutdown. Later repository calls fail.
    pub async fn close(&self) {
        info!("Closing store");
        self.pool.close().await;
    }

    /// Whether the database answers a trivial query. Backs `GET /health`.
    pub async fn health_check(&self) -> bool {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .is_ok()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_health_check_and_close() {
        let store = Database::new(DbConfig::in_memory()).await.unwrap();
        assert!(store.health_check().await);

        store.close().await;
        assert!(!store.health_check().await);
    }

    #[test]
    fn test_config_builder() {
        let config = DbConfig::new("/tmp/desk.db")
            .max_connections(8)
            .min_connections(3)
            .busy_timeout(Duration::from_secs(1))
            .run_migrations(false);

        assert_eq!(config.max_connections, 8);
        assert_eq!(config.min_connections, 3);
        assert_eq!(config.busy_timeout, Duration::from_secs(1));
        assert!(!config.run_migrations);
        assert!(!config.is_in_memory());
        assert!(DbConfig::in_memory().is_in_memory());
        assert_eq!(DbConfig::in_memory().idle_timeout, None);
    }

    #[tokio::test]
    async fn test_in_memory_databases_are_isolated() {
        let first = Database::new(DbConfig::in_memory()).await.unwrap();
        sqlx::query("INSERT INTO notification_outbox (id, event_type, entity_id, payload, attempts, created_at) VALUES ('x', 'booking.created', 'BK-1', '{}', 0, '2026-02-01T00:00:00Z')")
            .execute(first.pool())
            .await
            .unwrap();

        let second = Database::new(DbConfig::in_memory()).await.unwrap();
        assert_eq!(first.outbox().count_pending().await.unwrap(), 1);
        assert_eq!(second.outbox().count_pending().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_migrations_create_tables() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        assert_eq!(db.bookings().count().await.unwrap(), 0);
        assert_eq!(db.outbox().count_pending().await.unwrap(), 0);

        let (total, applied) = migrations::migration_status(db.pool()).await.unwrap();
        assert_eq!(total, applied);
    }
}
