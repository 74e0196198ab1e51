//! # Storage Errors
//!
//! What can go wrong below the gateway, classified so callers can tell a
//! double booking caught by the schema from a broken disk.
//!
//! ## Where They Go
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  sqlx::Error / MigrateError                                            │
//! │       │  From impls below                                               │
//! │       ▼                                                                 │
//! │  DbError                                                                │
//! │       │                                                                 │
//! │       ├── RoomOverlap ──► BookingGateway re-reads, answers Conflict    │
//! │       ├── NotFound ─────► 404 in desk-api                              │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  DeskError::Store ──► logged, generic 500 in desk-api                  │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

/// Marker raised by the overlap triggers in `001_initial_schema.sql`.
pub const ROOM_OVERLAP_MARKER: &str = "room_overlap";

#[derive(Debug, Error)]
pub enum DbError {
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// A primary key or unique column was reused.
    #[error("{column} already taken")]
    Duplicate { column: String },

    /// A CHECK in the schema refused the row (negative amount, inverted stay).
    #[error("Rejected by schema check: {message}")]
    CheckViolation { message: String },

    /// An active booking of the same room already holds one of the nights.
    ///
    /// Reaching this means two writers passed the availability check at
    /// once, or a write went around the gateway.
    #[error("Room overlap rejected by database")]
    RoomOverlap,

    /// The database file could not be opened or the pool is closed.
    #[error("Cannot open database: {0}")]
    ConnectionFailed(String),

    #[error("Schema migration failed: {0}")]
    MigrationFailed(String),

    /// SQLite refused the statement for any other reason.
    #[error("Statement failed: {0}")]
    QueryFailed(String),

    /// Every pooled connection stayed busy past the acquire timeout.
    #[error("No database connection available")]
    PoolExhausted,

    /// A stored column could not be decoded (bad JSON, unknown enum text).
    #[error("Corrupt {column} data: {message}")]
    CorruptData { column: String, message: String },

    #[error("Unexpected database error: {0}")]
    Internal(String),
}

impl DbError {
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        DbError::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }

    pub fn corrupt(column: impl Into<String>, message: impl ToString) -> Self {
        DbError::CorruptData {
            column: column.into(),
            message: message.to_string(),
        }
    }

    /// Classifies SQLite's constraint text.
    ///
    /// ```text
    /// "room_overlap"                           → RoomOverlap (trigger RAISE)
    /// "UNIQUE constraint failed: bookings.id"  → Duplicate { "bookings.id" }
    /// "CHECK constraint failed: ..."           → CheckViolation
    /// anything else                            → QueryFailed
    /// ```
    fn from_sqlite_message(message: &str) -> Self {
        if message.contains(ROOM_OVERLAP_MARKER) {
            return DbError::RoomOverlap;
        }
        if let Some(column) = message.strip_prefix("UNIQUE constraint failed: ") {
            return DbError::Duplicate {
                column: column.trim().to_string(),
            };
        }
        if message.starts_with("CHECK constraint failed") {
            return DbError::CheckViolation {
                message: message.to_string(),
            };
        }
        DbError::QueryFailed(message.to_string())
    }
}

impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            // Callers use fetch_optional; a bare RowNotFound has no id to report
            sqlx::Error::RowNotFound => DbError::not_found("Row", "?"),
            sqlx::Error::Database(db_err) => DbError::from_sqlite_message(db_err.message()),
            sqlx::Error::PoolTimedOut => DbError::PoolExhausted,
            sqlx::Error::PoolClosed => DbError::ConnectionFailed("pool closed".to_string()),
            sqlx::Error::ColumnDecode { index, source } => DbError::corrupt(index, source),
            other => DbError::Internal(other.to_string()),
        }
    }
}

impl From<sqlx::migrate::MigrateError> for DbError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        DbError::MigrationFailed(err.to_string())
    }
}

pub type DbResult<T> = Result<T, DbError>;
