//! # resort-db: Database Layer for the Resort Front Desk
//!
//! SQLite storage through sqlx, plus the two components that write to it:
//! the booking gateway and the transaction ledger.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Front Desk Data Flow                                │
//! │                                                                         │
//! │  desk-api handler (POST /api/bookings)                                 │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    resort-db (THIS CRATE)                       │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐   ┌────────────────┐   ┌───────────────┐   │   │
//! │  │   │ BookingGateway│   │  Repositories  │   │  Migrations   │   │   │
//! │  │   │ Ledger        │──►│  booking       │   │  (embedded)   │   │   │
//! │  │   │               │   │  transaction   │   │               │   │   │
//! │  │   │ resort-core   │   │  outbox        │   │ 001_initial   │   │   │
//! │  │   │ decisions     │   └────────────────┘   └───────────────┘   │   │
//! │  │   └───────────────┘            │                                │   │
//! │  │                                ▼                                │   │
//! │  │                    Database (pool.rs, SqlitePool)               │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite file (WAL) or private in-memory database                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - Table-level queries
//! - [`gateway`] - Transactional booking create/update/delete
//! - [`ledger`] - Validated transaction writes
//! - [`clock`] - Wall-clock business date
//!
//! ## Usage
//!
//! ```rust,ignore
//! use resort_db::{Database, DbConfig, SystemClock};
//!
//! let db = Database::new(DbConfig::new("desk.db")).await?;
//! let gateway = db.gateway(Arc::new(SystemClock::from_offset_minutes(420)));
//! let booking = gateway.create(draft).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod clock;
pub mod error;
pub mod gateway;
pub mod ledger;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use clock::SystemClock;
pub use error::{DbError, DbResult};
pub use gateway::{BookingGateway, DeskError, DeskResult, RoomAvailability};
pub use ledger::Ledger;
pub use pool::{Database, DbConfig};

// Repository re-exports for convenience
pub use repository::booking::{BookingFilter, BookingRepository};
pub use repository::outbox::{OutboxEntry, OutboxRepository};
pub use repository::transaction::{TransactionFilter, TransactionRepository};
