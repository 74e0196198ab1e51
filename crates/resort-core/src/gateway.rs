//! # Booking Gateway Decisions
//!
//! The single choke point every booking mutation goes through. This module
//! makes the decision; `resort-db` executes it inside a database
//! transaction, feeding in the room's bookings as re-read there.
//!
//! ## Create Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  BookingDraft                                                           │
//! │      │                                                                  │
//! │      ▼                                                                  │
//! │  sanitize text fields                                                   │
//! │      │                                                                  │
//! │      ▼                                                                  │
//! │  validate_booking(today) ──── problems? ───► Validation (400)           │
//! │      │                                                                  │
//! │      ▼                                                                  │
//! │  check_room_availability ──── overlap? ────► Conflict (409)             │
//! │      │                                                                  │
//! │      ▼                                                                  │
//! │  Booking (status defaults to confirmed, nights from the stay)           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Update follows the same shape, validating only the fields that change
//! and excluding the booking itself from the availability scan.

use chrono::{DateTime, NaiveDate, Utc};

use crate::availability::check_room_availability;
use crate::error::{GatewayError, GatewayResult, ValidationError};
use crate::payload::{present, BookingDraft, BookingPatch};
use crate::rooms::RoomCatalog;
use crate::types::{Booking, BookingStatus};
use crate::validation::{coerce_amount, validate_booking, validate_booking_patch, ValidationReport};

/// Conflict message when an update moves onto an occupied range.
pub const UPDATE_CONFLICT_MESSAGE: &str = "Room is already booked for the requested dates";

/// Conflict message when a new booking lands on an occupied range.
pub fn create_conflict_message(room_number: &str) -> String {
    format!("Room {room_number} is already booked for these dates")
}

/// Decides a booking creation.
///
/// `room_bookings` must hold at least every booking of the target room;
/// bookings of other rooms are ignored. `id` is the identifier the new
/// booking receives.
///
/// Absent fields are filled in:
/// - `status` → `confirmed`
/// - `nights` → length of the stay
/// - `pricePerNight` → catalog rate, when the room is in the catalog
/// - `totalAmount` → catalog quote, or zero for an uncatalogued room
pub fn prepare_create(
    draft: BookingDraft,
    room_bookings: &[Booking],
    catalog: &RoomCatalog,
    id: String,
    today: NaiveDate,
    now: DateTime<Utc>,
) -> GatewayResult<Booking> {
    let draft = draft.sanitized();
    validate_booking(&draft, today).into_result()?;

    let stay = draft.stay().ok_or_else(|| {
        GatewayError::Validation(ValidationReport::single(ValidationError::InvalidFormat {
            field: "check-in date",
        }))
    })?;
    let room_number = present(&draft.room_number).unwrap_or_default().to_string();

    let availability = check_room_availability(&room_number, stay, room_bookings, None);
    if let Some(conflict) = availability.conflicting_booking {
        return Err(GatewayError::Conflict {
            message: create_conflict_message(&room_number),
            conflicting_booking: Box::new(conflict.clone()),
        });
    }

    let status = present(&draft.status)
        .and_then(|s| s.parse::<BookingStatus>().ok())
        .unwrap_or_default();
    let total_amount = coerce_amount(draft.total_amount.as_ref())
        .or_else(|| catalog.quote(&room_number, &stay, 0))
        .unwrap_or_default();
    let price_per_night = draft.price_per_night.or_else(|| {
        catalog
            .room_type_for(&room_number)
            .map(|room_type| room_type.price_per_night)
    });

    Ok(Booking {
        id,
        guest_name: draft.guest_name.unwrap_or_default(),
        room_number,
        check_in: stay.check_in,
        check_out: stay.check_out,
        total_amount,
        status,
        nights: draft.nights.or_else(|| u32::try_from(stay.nights()).ok()),
        price_per_night,
        deposit_amount: draft.deposit_amount,
        deposit_status: draft.deposit_status,
        payment_status: draft.payment_status,
        paid_amount: draft.paid_amount,
        ota_channel: draft.ota_channel.filter(|s| !s.is_empty()),
        confirmation_number: draft.confirmation_number.filter(|s| !s.is_empty()),
        guest_details: draft.guest_details,
        locked_until: None,
        created_at: now,
        updated_at: now,
    })
}

/// Decides a booking update.
///
/// Availability is re-checked when the patch moves the booking to another
/// room or range, and when it reactivates a cancelled or checked-out
/// booking. A booking that ends up inactive never conflicts.
pub fn prepare_update(
    current: &Booking,
    patch: BookingPatch,
    room_bookings: &[Booking],
    now: DateTime<Utc>,
) -> GatewayResult<Booking> {
    let patch = patch.sanitized();
    validate_booking_patch(current, &patch).into_result()?;

    let mut next = current.clone();
    let moves = patch.touches_stay();

    if let Some(guest_name) = present(&patch.guest_name) {
        next.guest_name = guest_name.to_string();
    }
    if let Some(room_number) = present(&patch.room_number) {
        next.room_number = room_number.to_string();
    }
    if let Some(check_in) = patch.parsed_check_in() {
        next.check_in = check_in;
    }
    if let Some(check_out) = patch.parsed_check_out() {
        next.check_out = check_out;
    }
    if let Some(total_amount) = coerce_amount(patch.total_amount.as_ref()) {
        next.total_amount = total_amount;
    }
    if let Some(status) = present(&patch.status).and_then(|s| s.parse::<BookingStatus>().ok()) {
        next.status = status;
    }

    next.nights = match patch.nights {
        Some(nights) => Some(nights),
        None if moves => u32::try_from(next.stay().nights()).ok(),
        None => next.nights,
    };
    next.price_per_night = patch.price_per_night.or(next.price_per_night);
    next.deposit_amount = patch.deposit_amount.or(next.deposit_amount);
    next.deposit_status = patch.deposit_status.or(next.deposit_status);
    next.payment_status = patch.payment_status.or(next.payment_status);
    next.paid_amount = patch.paid_amount.or(next.paid_amount);
    if patch.ota_channel.is_some() {
        next.ota_channel = patch.ota_channel.filter(|s| !s.is_empty());
    }
    if patch.confirmation_number.is_some() {
        next.confirmation_number = patch.confirmation_number.filter(|s| !s.is_empty());
    }
    next.guest_details = patch.guest_details.or(next.guest_details);
    if next.status != BookingStatus::Locked {
        next.locked_until = None;
    }
    next.updated_at = now;

    let reactivated = !current.is_active() && next.is_active();
    if next.is_active() && (moves || reactivated) {
        let availability = check_room_availability(
            &next.room_number,
            next.stay(),
            room_bookings,
            Some(&current.id),
        );
        if let Some(conflict) = availability.conflicting_booking {
            return Err(GatewayError::Conflict {
                message: UPDATE_CONFLICT_MESSAGE.to_string(),
                conflicting_booking: Box::new(conflict.clone()),
            });
        }
    }

    Ok(next)
}

// =============================================================================
// Unit Tests
// =============================================================================
