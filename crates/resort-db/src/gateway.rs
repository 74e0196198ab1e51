//! # Booking Gateway Executor
//!
//! Runs the decisions from `resort_core::gateway` against the database.
//!
//! ## Transaction Shape
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    BookingGateway::create                               │
//! │                                                                         │
//! │  BEGIN IMMEDIATE                                                        │
//! │    │                                                                    │
//! │    ├── SELECT bookings WHERE room_number = ?   (re-read inside the tx)  │
//! │    │                                                                    │
//! │    ├── prepare_create(...)  ──── rejected ───► ROLLBACK, Rejected(..)   │
//! │    │                                                                    │
//! │    ├── INSERT INTO bookings                                             │
//! │    │      └── overlap trigger ── room_overlap ─► ROLLBACK, re-read,     │
//! │    │                                             Rejected(Conflict)     │
//! │    ├── INSERT INTO notification_outbox ('booking.created')              │
//! │    │                                                                    │
//! │  COMMIT                                                                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! `BEGIN IMMEDIATE` takes the write lock before the re-read, so a second
//! desk booking the same room waits (up to the busy timeout) and then reads
//! the first desk's booking. The trigger is the backstop for writers that
//! go around the gateway.

use std::sync::Arc;

use resort_core::gateway::{
    create_conflict_message, prepare_create, prepare_update, UPDATE_CONFLICT_MESSAGE,
};
use resort_core::validation::sanitize;
use resort_core::{
    check_room_availability, Booking, BookingDraft, BookingPatch, Clock, GatewayError, RoomCatalog,
    StayRange,
};
use serde::Serialize;
use sqlx::{Sqlite, SqlitePool, Transaction};
use thiserror::Error;
use tracing::{info, warn};

use crate::error::DbError;
use crate::repository::booking::{
    delete_on, fetch_on, fetch_room_on, generate_booking_id, insert_on, update_on,
};
use crate::repository::outbox::{enqueue_on, events};

// =============================================================================
// Errors
// =============================================================================

/// Outcome of a failed gateway or ledger call.
#[derive(Debug, Error)]
pub enum DeskError {
    /// The request was decided against (validation, conflict, not found).
    #[error(transparent)]
    Rejected(#[from] GatewayError),

    /// The store failed. Passed through untouched, never retried.
    #[error(transparent)]
    Store(#[from] DbError),
}

impl From<sqlx::Error> for DeskError {
    fn from(err: sqlx::Error) -> Self {
        DeskError::Store(DbError::from(err))
    }
}

pub type DeskResult<T> = Result<T, DeskError>;

// =============================================================================
// Availability Result
// =============================================================================

/// Owned availability answer for a stored room.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomAvailability {
    pub available: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conflicting_booking: Option<Booking>,
}

// =============================================================================
// Gateway
// =============================================================================

/// The only writer of bookings.
#[derive(Clone)]
pub struct BookingGateway {
    pool: SqlitePool,
    clock: Arc<dyn Clock>,
    catalog: Arc<RoomCatalog>,
}

impl std::fmt::Debug for BookingGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BookingGateway")
            .field("today", &self.clock.today())
            .field("rooms", &self.catalog.room_count())
            .finish()
    }
}

impl BookingGateway {
    pub fn new(pool: SqlitePool, clock: Arc<dyn Clock>, catalog: Arc<RoomCatalog>) -> Self {
        BookingGateway {
            pool,
            clock,
            catalog,
        }
    }

    pub fn catalog(&self) -> &RoomCatalog {
        &self.catalog
    }

    pub fn clock(&self) -> &dyn Clock {
        self.clock.as_ref()
    }

    /// Validates, checks availability and inserts a new booking.
    pub async fn create(&self, draft: BookingDraft) -> DeskResult<Booking> {
        let room_number = draft
            .room_number
            .as_deref()
            .map(sanitize)
            .unwrap_or_default();

        let mut tx = self.begin_write().await?;
        let room_bookings = fetch_room_on(&mut *tx, &room_number).await?;

        let booking = match prepare_create(
            draft,
            &room_bookings,
            &self.catalog,
            generate_booking_id(),
            self.clock.today(),
            self.clock.now(),
        ) {
            Ok(booking) => booking,
            Err(rejection) => {
                warn!(room = %room_number, kind = rejection.kind(), "Booking create rejected");
                return Err(rejection.into());
            }
        };

        match insert_on(&mut *tx, &booking).await {
            Ok(()) => {}
            Err(DbError::RoomOverlap) => {
                tx.rollback().await?;
                let message = create_conflict_message(&booking.room_number);
                return Err(self
                    .overlap_conflict(&booking.room_number, booking.stay(), None, message)
                    .await);
            }
            Err(err) => return Err(err.into()),
        }

        enqueue_on(
            &mut *tx,
            events::BOOKING_CREATED,
            &booking.id,
            &booking,
            booking.created_at,
        )
        .await?;
        tx.commit().await?;

        info!(
            id = %booking.id,
            room = %booking.room_number,
            check_in = %booking.check_in,
            check_out = %booking.check_out,
            "Booking created"
        );
        Ok(booking)
    }

    /// Applies a partial update to an existing booking.
    pub async fn update(&self, id: &str, patch: BookingPatch) -> DeskResult<Booking> {
        let mut tx = self.begin_write().await?;

        let current = fetch_on(&mut *tx, id)
            .await?
            .ok_or_else(|| GatewayError::not_found("Booking", id))?;

        let room_number = patch
            .room_number
            .as_deref()
            .map(sanitize)
            .filter(|room| !room.is_empty())
            .unwrap_or_else(|| current.room_number.clone());
        let room_bookings = fetch_room_on(&mut *tx, &room_number).await?;

        let next = match prepare_update(&current, patch, &room_bookings, self.clock.now()) {
            Ok(next) => next,
            Err(rejection) => {
                warn!(id = %id, room = %room_number, kind = rejection.kind(), "Booking update rejected");
                return Err(rejection.into());
            }
        };

        match update_on(&mut *tx, &next).await {
            Ok(()) => {}
            Err(DbError::RoomOverlap) => {
                tx.rollback().await?;
                return Err(self
                    .overlap_conflict(
                        &next.room_number,
                        next.stay(),
                        Some(id),
                        UPDATE_CONFLICT_MESSAGE.to_string(),
                    )
                    .await);
            }
            Err(err) => return Err(err.into()),
        }

        enqueue_on(&mut *tx, events::BOOKING_UPDATED, &next.id, &next, next.updated_at).await?;
        tx.commit().await?;

        info!(id = %next.id, room = %next.room_number, status = %next.status, "Booking updated");
        Ok(next)
    }

    /// Removes a booking. Returns the removed record.
    pub async fn delete(&self, id: &str) -> DeskResult<Booking> {
        let mut tx = self.begin_write().await?;

        let Some(booking) = fetch_on(&mut *tx, id).await? else {
            warn!(id = %id, "Delete of unknown booking");
            return Err(GatewayError::not_found("Booking", id).into());
        };

        delete_on(&mut *tx, id).await?;
        enqueue_on(
            &mut *tx,
            events::BOOKING_DELETED,
            &booking.id,
            &booking,
            self.clock.now(),
        )
        .await?;
        tx.commit().await?;

        info!(id = %booking.id, room = %booking.room_number, "Booking deleted");
        Ok(booking)
    }

    /// Fetches one booking, `NotFound` if missing.
    pub async fn get(&self, id: &str) -> DeskResult<Booking> {
        let mut conn = self.pool.acquire().await?;
        fetch_on(&mut conn, id)
            .await?
            .ok_or_else(|| GatewayError::not_found("Booking", id).into())
    }

    /// Read-only availability check against the stored bookings of a room.
    pub async fn check_availability(
        &self,
        room_number: &str,
        stay: StayRange,
        exclude_booking_id: Option<&str>,
    ) -> DeskResult<RoomAvailability> {
        let mut conn = self.pool.acquire().await?;
        let room_bookings = fetch_room_on(&mut conn, room_number).await?;
        let availability =
            check_room_availability(room_number, stay, &room_bookings, exclude_booking_id);

        Ok(RoomAvailability {
            available: availability.available,
            conflicting_booking: availability.conflicting_booking.cloned(),
        })
    }

    /// Opens a transaction that holds the write lock from its first read.
    ///
    /// A deferred transaction would read a snapshot and then fail its write
    /// with `SQLITE_BUSY` when another desk committed in between.
    async fn begin_write(&self) -> DeskResult<Transaction<'static, Sqlite>> {
        Ok(self.pool.begin_with("BEGIN IMMEDIATE").await?)
    }

    /// Turns a trigger abort into a `Conflict` naming the booking in the way.
    ///
    /// If the blocking booking has vanished by the time it is re-read, the
    /// original store error is reported.
    async fn overlap_conflict(
        &self,
        room_number: &str,
        stay: StayRange,
        exclude_booking_id: Option<&str>,
        message: String,
    ) -> DeskError {
        warn!(room = %room_number, "Overlap trigger fired, resolving conflict");

        match self
            .check_availability(room_number, stay, exclude_booking_id)
            .await
        {
            Ok(RoomAvailability {
                conflicting_booking: Some(conflict),
                ..
            }) => GatewayError::Conflict {
                message,
                conflicting_booking: Box::new(conflict),
            }
            .into(),
            Ok(_) => DbError::RoomOverlap.into(),
            Err(err) => err,
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
