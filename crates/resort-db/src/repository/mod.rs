//! # Repository Module
//!
//! SQL for each table lives in exactly one place.
//!
//! ## Who Writes What
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  desk-api handler                                                      │
//! │       │                                                                 │
//! │       ├── reads ───────────► BookingRepository      (bookings)         │
//! │       │                      TransactionRepository  (transactions)     │
//! │       │                      OutboxRepository       (notification_outbox)
//! │       │                                                                 │
//! │       └── writes ──► BookingGateway ──► booking::{insert,update,delete}_on
//! │                                     └─► outbox::enqueue_on             │
//! │                      Ledger ─────────► TransactionRepository           │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Booking writes are crate-private: the gateway is the only way in.
//!
//! ## Available Repositories
//!
//! - [`BookingRepository`](booking::BookingRepository) - Booking queries
//! - [`TransactionRepository`](transaction::TransactionRepository) - Ledger storage
//! - [`OutboxRepository`](outbox::OutboxRepository) - Notification queue

pub mod booking;
pub mod outbox;
pub mod transaction;
