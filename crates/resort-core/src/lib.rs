//! # resort-core: Pure Business Logic for the Resort Front Desk
//!
//! This crate is the **heart** of the front desk. It decides whether a
//! booking or ledger entry is acceptable, and whether a room is free,
//! as pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Resort Front Desk Architecture                      │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │        Front desk UI  /  OTA import  /  webhook callers         │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ JSON over HTTP                         │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    apps/desk-api (axum)                          │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ resort-core (THIS CRATE) ★                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌────────────┐  ┌───────────┐  ┌───────────┐ │   │
//! │  │   │validation │  │availability│  │  gateway  │  │   rooms   │ │   │
//! │  │   │ sanitize  │  │  overlap   │  │  create/  │  │  report   │ │   │
//! │  │   │ validate  │  │  resolver  │  │  update   │  │  money    │ │   │
//! │  │   └───────────┘  └────────────┘  └───────────┘  └───────────┘ │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • NO WALL CLOCK             │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                 resort-db (Database Layer)                      │   │
//! │  │     SQLite repositories, booking gateway executor, ledger       │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Booking, Transaction, statuses)
//! - [`payload`] - Loosely typed creation/update payloads
//! - [`money`] - Money type with integer satang arithmetic
//! - [`validation`] - Sanitizer and field validators
//! - [`availability`] - Double-booking resolver
//! - [`gateway`] - Create/update decisions
//! - [`rooms`] - Room catalog and pricing
//! - [`report`] - Daily cash summary
//! - [`clock`] - Business clock abstraction
//! - [`error`] - Domain error types
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: same input, same output; "today" is an argument
//! 2. **No I/O**: database, network, file system access is FORBIDDEN here
//! 3. **Integer Money**: all amounts are satang (i64)
//! 4. **Explicit Errors**: rejections are typed values, never panics
//!
//! ## Example Usage
//!
//! ```rust
//! use chrono::{DateTime, NaiveDate, Utc};
//! use resort_core::gateway::prepare_create;
//! use resort_core::payload::BookingDraft;
//! use resort_core::rooms::RoomCatalog;
//!
//! let draft: BookingDraft = serde_json::from_str(
//!     r#"{"guestName":"Somchai","roomNumber":"5","checkIn":"2026-02-18","checkOut":"2026-02-20"}"#,
//! ).unwrap();
//! let today = NaiveDate::from_ymd_opt(2026, 2, 1).unwrap();
//!
//! let booking = prepare_create(
//!     draft, &[], &RoomCatalog::default(), "BK-1".into(), today, Utc::now(),
//! ).unwrap();
//! assert_eq!(booking.total_amount.baht(), 1600);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod availability;
pub mod clock;
pub mod error;
pub mod gateway;
pub mod money;
pub mod payload;
pub mod report;
pub mod rooms;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use availability::{check_room_availability, Availability, Occupancy, StayRange};
pub use clock::{Clock, FixedClock};
pub use error::{GatewayError, GatewayResult, ValidationError};
pub use money::Money;
pub use payload::{AmountInput, BookingDraft, BookingPatch, TransactionDraft, TransactionPatch};
pub use rooms::RoomCatalog;
pub use types::*;
pub use validation::ValidationReport;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum length of any free-text field after sanitizing.
pub const MAX_TEXT_LENGTH: usize = 500;

/// Highest plausible booking total.
///
/// ## Business Reason
/// Catches typos such as an extra zero from the OTA import. No stay at
/// this resort comes close.
pub const BOOKING_AMOUNT_CEILING: Money = Money::from_baht(1_000_000);

/// Highest plausible single ledger entry.
pub const TRANSACTION_AMOUNT_CEILING: Money = Money::from_baht(10_000_000);
