//! # Availability Resolver
//!
//! Decides whether a room is free for a stay, given the bookings already
//! held for it.
//!
//! ## Overlap Test
//! Stays are closed-open day ranges `[check_in, check_out)`: the guest
//! sleeps every night from `check_in` up to, but not including,
//! `check_out`. A departure and an arrival on the same day do not clash.
//!
//! ```text
//!   existing        |■■■■■■■■■■■|
//!                   in          out
//!   (a) start inside     |■■■■■■■■■■■|        new.in  ∈ [in, out)
//!   (b) end inside  |■■■■■■|                  new.out ∈ (in, out]
//!   (c) contains  |■■■■■■■■■■■■■■■■|          new.in <= in && new.out >= out
//!   turnover ok                 |■■■■■■|      new.in == out  → free
//! ```
//!
//! The resolver stops at the first conflict it meets.

use std::borrow::Cow;

use chrono::NaiveDate;
use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize, Serializer};
use ts_rs::TS;

use crate::types::{Booking, BookingStatus};
use crate::validation::parse_calendar_date;

// =============================================================================
// Stay Range
// =============================================================================

/// A closed-open range of nights.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct StayRange {
    #[ts(as = "String")]
    pub check_in: NaiveDate,
    #[ts(as = "String")]
    pub check_out: NaiveDate,
}

impl StayRange {
    #[inline]
    pub const fn new(check_in: NaiveDate, check_out: NaiveDate) -> Self {
        StayRange {
            check_in,
            check_out,
        }
    }

    /// Parses both ends with [`parse_calendar_date`].
    pub fn parse(check_in: &str, check_out: &str) -> Option<Self> {
        Some(StayRange::new(
            parse_calendar_date(check_in)?,
            parse_calendar_date(check_out)?,
        ))
    }

    /// Number of nights. Zero or negative for an inverted range.
    #[inline]
    pub fn nights(&self) -> i64 {
        (self.check_out - self.check_in).num_days()
    }

    /// Whether the guest sleeps in the room on the night of `date`.
    #[inline]
    pub fn covers_night(&self, date: NaiveDate) -> bool {
        self.check_in <= date && date < self.check_out
    }

    /// The three-clause overlap test against an occupied range.
    pub fn overlaps(&self, occupied: &StayRange) -> bool {
        let start_inside = self.check_in >= occupied.check_in && self.check_in < occupied.check_out;
        let end_inside = self.check_out > occupied.check_in && self.check_out <= occupied.check_out;
        let contains = self.check_in <= occupied.check_in && self.check_out >= occupied.check_out;
        start_inside || end_inside || contains
    }
}

// =============================================================================
// Occupancy
// =============================================================================

/// Anything that can hold a room for a range of nights.
///
/// Implemented for stored [`Booking`]s and for plain JSON records (as sent
/// by the UI's local cache or an OTA export), so both go through the same
/// resolver.
pub trait Occupancy {
    fn booking_id(&self) -> Option<&str>;

    /// The room as text. Records that carry an integer room give its
    /// decimal form, the same way payloads are read.
    fn room_number(&self) -> Option<Cow<'_, str>>;

    /// Whether the record still holds its room.
    fn is_active(&self) -> bool;

    /// The occupied range, or `None` when it cannot be determined.
    fn stay(&self) -> Option<StayRange>;
}

impl Occupancy for Booking {
    fn booking_id(&self) -> Option<&str> {
        Some(&self.id)
    }

    fn room_number(&self) -> Option<Cow<'_, str>> {
        Some(Cow::Borrowed(&self.room_number))
    }

    fn is_active(&self) -> bool {
        self.status.is_active()
    }

    fn stay(&self) -> Option<StayRange> {
        Some(Booking::stay(self))
    }
}

/// Plain records: an unparseable date never conflicts, and a status that is
/// missing or unknown counts as active.
impl Occupancy for serde_json::Value {
    fn booking_id(&self) -> Option<&str> {
        self.get("id").and_then(serde_json::Value::as_str)
    }

    fn room_number(&self) -> Option<Cow<'_, str>> {
        match self.get("roomNumber")? {
            serde_json::Value::String(room) => Some(Cow::Borrowed(room)),
            serde_json::Value::Number(n) if n.is_i64() || n.is_u64() => {
                Some(Cow::Owned(n.to_string()))
            }
            _ => None,
        }
    }

    fn is_active(&self) -> bool {
        self.get("status")
            .and_then(serde_json::Value::as_str)
            .and_then(|s| s.parse::<BookingStatus>().ok())
            .map_or(true, |status| status.is_active())
    }

    fn stay(&self) -> Option<StayRange> {
        let check_in = self.get("checkIn")?.as_str()?;
        let check_out = self.get("checkOut")?.as_str()?;
        StayRange::parse(check_in, check_out)
    }
}

// =============================================================================
// Resolver
// =============================================================================

/// Outcome of an availability check.
///
/// Serializes as `{ "available": bool, "conflictingBooking"?: {...} }`.
#[derive(Debug, Clone, PartialEq)]
pub struct Availability<'a, B> {
    pub available: bool,
    pub conflicting_booking: Option<&'a B>,
}

impl<'a, B> Availability<'a, B> {
    fn free() -> Self {
        Availability {
            available: true,
            conflicting_booking: None,
        }
    }

    fn taken(by: &'a B) -> Self {
        Availability {
            available: false,
            conflicting_booking: Some(by),
        }
    }
}

impl<B: Serialize> Serialize for Availability<'_, B> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let len = if self.conflicting_booking.is_some() { 2 } else { 1 };
        let mut body = serializer.serialize_struct("Availability", len)?;
        body.serialize_field("available", &self.available)?;
        if let Some(conflict) = self.conflicting_booking {
            body.serialize_field("conflictingBooking", conflict)?;
        }
        body.end()
    }
}

/// Checks whether `room_number` is free for `stay`.
///
/// ## Candidates
/// A record is compared only when it:
/// - is not `exclude_booking_id` (the booking being edited)
/// - is active
/// - belongs to `room_number`
///
/// ## Example
/// ```rust
/// use resort_core::availability::{check_room_availability, StayRange};
/// use serde_json::json;
///
/// let existing = vec![json!({
///     "id": "BK-1", "roomNumber": "5", "status": "confirmed",
///     "checkIn": "2026-02-18", "checkOut": "2026-02-20"
/// })];
///
/// let clash = StayRange::parse("2026-02-19", "2026-02-21").unwrap();
/// assert!(!check_room_availability("5", clash, &existing, None).available);
///
/// let turnover = StayRange::parse("2026-02-20", "2026-02-22").unwrap();
/// assert!(check_room_availability("5", turnover, &existing, None).available);
/// ```
pub fn check_room_availability<'a, B: Occupancy>(
    room_number: &str,
    stay: StayRange,
    existing: &'a [B],
    exclude_booking_id: Option<&str>,
) -> Availability<'a, B> {
    let conflict = existing
        .iter()
        .filter(|record| match (exclude_booking_id, record.booking_id()) {
            (Some(excluded), Some(id)) => id != excluded,
            _ => true,
        })
        .filter(|record| record.is_active())
        .filter(|record| record.room_number().as_deref() == Some(room_number))
        .find(|record| record.stay().is_some_and(|occupied| stay.overlaps(&occupied)));

    match conflict {
        Some(record) => Availability::taken(record),
        None => Availability::free(),
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::money::Money;
    use chrono::Utc;
    use serde_json::json;

    fn date(s: &str) -> NaiveDate {
        parse_calendar_date(s).unwrap()
    }

    fn stay(check_in: &str, check_out: &str) -> StayRange {
        StayRange::new(date(check_in), date(check_out))
    }

    fn booking(id: &str, room: &str, check_in: &str, check_out: &str, status: BookingStatus) -> Booking {
        let now = Utc::now();
        Booking {
            id: id.into(),
            guest_name: "Guest".into(),
            room_number: room.into(),
            check_in: date(check_in),
            check_out: date(check_out),
            total_amount: Money::zero(),
            status,
            nights: None,
            price_per_night: None,
            deposit_amount: None,
            deposit_status: None,
            payment_status: None,
            paid_amount: None,
            ota_channel: None,
            confirmation_number: None,
            guest_details: None,
            locked_until: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn somchai() -> Vec<Booking> {
        vec![booking("BK-1", "5", "2026-02-18", "2026-02-20", BookingStatus::Confirmed)]
    }

    #[test]
    fn test_overlap_clauses() {
        let occupied = stay("2026-02-18", "2026-02-20");
        assert!(stay("2026-02-19", "2026-02-21").overlaps(&occupied));
        assert!(stay("2026-02-17", "2026-02-19").overlaps(&occupied));
        assert!(stay("2026-02-17", "2026-02-22").overlaps(&occupied));
        assert!(stay("2026-02-18", "2026-02-20").overlaps(&occupied));
        assert!(!stay("2026-02-20", "2026-02-22").overlaps(&occupied));
        assert!(!stay("2026-02-16", "2026-02-18").overlaps(&occupied));
    }

    #[test]
    fn test_overlap_is_symmetric() {
        let ranges = [
            stay("2026-02-18", "2026-02-20"),
            stay("2026-02-19", "2026-02-21"),
            stay("2026-02-20", "2026-02-22"),
            stay("2026-02-10", "2026-03-01"),
            stay("2026-02-19", "2026-02-20"),
        ];
        for a in &ranges {
            for b in &ranges {
                assert_eq!(a.overlaps(b), b.overlaps(a), "{a:?} vs {b:?}");
            }
        }
    }

    #[test]
    fn test_conflict_returns_the_booking() {
        let existing = somchai();
        let result = check_room_availability("5", stay("2026-02-19", "2026-02-21"), &existing, None);
        assert!(!result.available);
        assert_eq!(result.conflicting_booking.map(|b| b.id.as_str()), Some("BK-1"));
    }

    #[test]
    fn test_turnover_day_is_free() {
        let existing = somchai();
        let result = check_room_availability("5", stay("2026-02-20", "2026-02-22"), &existing, None);
        assert!(result.available);
        assert!(result.conflicting_booking.is_none());
    }

    #[test]
    fn test_other_rooms_never_conflict() {
        let existing = somchai();
        let result = check_room_availability("6", stay("2026-02-18", "2026-02-20"), &existing, None);
        assert!(result.available);
    }

    #[test]
    fn test_inactive_bookings_release_the_room() {
        for status in [BookingStatus::Cancelled, BookingStatus::CheckedOut] {
            let existing = vec![booking("BK-1", "5", "2026-02-18", "2026-02-20", status)];
            let result =
                check_room_availability("5", stay("2026-02-18", "2026-02-20"), &existing, None);
            assert!(result.available, "{status} should not block");
        }
        for status in [BookingStatus::Pending, BookingStatus::Locked, BookingStatus::CheckedIn] {
            let existing = vec![booking("BK-1", "5", "2026-02-18", "2026-02-20", status)];
            let result =
                check_room_availability("5", stay("2026-02-18", "2026-02-20"), &existing, None);
            assert!(!result.available, "{status} should block");
        }
    }

    #[test]
    fn test_excluding_self() {
        let existing = somchai();
        let result = check_room_availability(
            "5",
            stay("2026-02-18", "2026-02-21"),
            &existing,
            Some("BK-1"),
        );
        assert!(result.available);
    }

    #[test]
    fn test_first_conflict_wins() {
        let existing = vec![
            booking("BK-1", "5", "2026-02-18", "2026-02-20", BookingStatus::Confirmed),
            booking("BK-2", "5", "2026-02-20", "2026-02-22", BookingStatus::Confirmed),
        ];
        let result =
            check_room_availability("5", stay("2026-02-17", "2026-02-23"), &existing, None);
        assert_eq!(result.conflicting_booking.map(|b| b.id.as_str()), Some("BK-1"));
    }

    #[test]
    fn test_plain_records() {
        let existing = vec![
            json!({ "id": "A", "roomNumber": "5", "checkIn": "not a date", "checkOut": "2026-02-20" }),
            json!({ "id": "B", "roomNumber": "5", "status": "cancelled",
                    "checkIn": "2026-02-18", "checkOut": "2026-02-20" }),
        ];
        let result =
            check_room_availability("5", stay("2026-02-18", "2026-02-20"), &existing, None);
        assert!(result.available);

        let existing = vec![json!({
            "id": "C", "roomNumber": "5", "status": "mystery",
            "checkIn": "2026-02-18T00:00:00.000Z", "checkOut": "2026-02-20T00:00:00.000Z"
        })];
        let result =
            check_room_availability("5", stay("2026-02-19", "2026-02-20"), &existing, None);
        assert!(!result.available);
        assert_eq!(result.conflicting_booking.and_then(|r| r["id"].as_str()), Some("C"));
    }

    #[test]
    fn test_plain_record_with_numeric_room() {
        let existing = vec![json!({
            "id": "A", "roomNumber": 5, "status": "confirmed",
            "checkIn": "2026-02-18", "checkOut": "2026-02-20"
        })];
        let result =
            check_room_availability("5", stay("2026-02-18", "2026-02-20"), &existing, None);
        assert!(!result.available);
        assert_eq!(result.conflicting_booking.and_then(|r| r["id"].as_str()), Some("A"));

        let result =
            check_room_availability("15", stay("2026-02-18", "2026-02-20"), &existing, None);
        assert!(result.available);

        let fractional = vec![json!({
            "id": "B", "roomNumber": 5.5, "checkIn": "2026-02-18", "checkOut": "2026-02-20"
        })];
        let result =
            check_room_availability("5", stay("2026-02-18", "2026-02-20"), &fractional, None);
        assert!(result.available);
    }

    #[test]
    fn test_availability_wire_shape() {
        let existing = somchai();
        let free = check_room_availability("5", stay("2026-02-20", "2026-02-21"), &existing, None);
        assert_eq!(serde_json::to_value(&free).unwrap(), json!({ "available": true }));

        let taken = check_room_availability("5", stay("2026-02-19", "2026-02-21"), &existing, None);
        let json = serde_json::to_value(&taken).unwrap();
        assert_eq!(json["available"], false);
        assert_eq!(json["conflictingBooking"]["id"], "BK-1");
    }
}
