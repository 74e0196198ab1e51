//! # Validation Module
//!
//! Input sanitizing and field validation for bookings and ledger entries.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Deserialization (payload.rs)                                 │
//! │  └── Loose typing: bad shapes become "" instead of JSON errors         │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE                                                  │
//! │  ├── sanitize(): trim, strip <>, cap at 500 chars                      │
//! │  └── validate_*(): accumulate EVERY field problem into a report        │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  ├── CHECK constraints (check_out > check_in, amounts >= 0)            │
//! │  └── Overlap triggers (no double-booking)                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Validators never fail and never short-circuit: the front desk shows every
//! message at once, in rule order.
//!
//! ## Usage
//! ```rust
//! use chrono::NaiveDate;
//! use resort_core::payload::BookingDraft;
//! use resort_core::validation::validate_booking;
//!
//! let today = NaiveDate::from_ymd_opt(2026, 2, 1).unwrap();
//! let report = validate_booking(&BookingDraft::default(), today);
//! assert!(!report.is_valid());
//! assert_eq!(report.messages()[0], "Guest name is required");
//! ```

use chrono::{DateTime, Days, Months, NaiveDate, NaiveDateTime};
use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};

use crate::error::ValidationError;
use crate::money::Money;
use crate::payload::{present, AmountInput, BookingDraft, BookingPatch, TransactionDraft, TransactionPatch};
use crate::types::{Booking, BookingStatus, TransactionType};
use crate::{BOOKING_AMOUNT_CEILING, MAX_TEXT_LENGTH, TRANSACTION_AMOUNT_CEILING};

// =============================================================================
// Validation Report
// =============================================================================

/// Every problem found in one payload, in rule order.
///
/// Serializes as `{ "valid": bool, "errors": [message, ...] }`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    errors: Vec<ValidationError>,
}

impl ValidationReport {
    /// A report holding exactly one problem.
    pub fn single(error: ValidationError) -> Self {
        ValidationReport {
            errors: vec![error],
        }
    }

    pub fn push(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    #[inline]
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn errors(&self) -> &[ValidationError] {
        &self.errors
    }

    /// User-facing messages.
    pub fn messages(&self) -> Vec<String> {
        self.errors.iter().map(ToString::to_string).collect()
    }

    /// `Ok(())` when valid, otherwise the report itself.
    pub fn into_result(self) -> Result<(), ValidationReport> {
        if self.is_valid() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl Serialize for ValidationReport {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut body = serializer.serialize_struct("ValidationReport", 2)?;
        body.serialize_field("valid", &self.is_valid())?;
        body.serialize_field("errors", &self.messages())?;
        body.end()
    }
}

// =============================================================================
// Sanitizer
// =============================================================================

/// Cleans a free-text field before it is validated or stored.
///
/// ## Rules
/// 1. Trim surrounding whitespace
/// 2. Remove every `<` and `>`
/// 3. Keep at most 500 characters (Unicode scalar values, so Thai names
///    are never cut mid-character)
///
/// ## Example
/// ```rust
/// use resort_core::validation::sanitize;
///
/// assert_eq!(sanitize("  <b>Somchai</b> "), "bSomchai/b");
/// assert_eq!(sanitize(&"ก".repeat(600)).chars().count(), 500);
/// ```
pub fn sanitize(input: &str) -> String {
    input
        .trim()
        .chars()
        .filter(|c| *c != '<' && *c != '>')
        .take(MAX_TEXT_LENGTH)
        .collect()
}

/// Sanitizes an arbitrary JSON value. Anything but a string yields `""`.
pub fn sanitize_value(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => sanitize(s),
        _ => String::new(),
    }
}

pub(crate) fn sanitize_opt(field: Option<String>) -> Option<String> {
    field.map(|s| sanitize(&s))
}

// =============================================================================
// Dates
// =============================================================================

/// Parses a calendar date from the forms the front desk and OTA feeds send.
///
/// ## Accepted Forms
/// - `2026-02-18`
/// - `2026-02-18T14:00:00Z`, `2026-02-18T14:00:00+07:00` (RFC 3339)
/// - `2026-02-18T14:00:00`, `2026-02-18T14:00:00.000`
///
/// The time of day is discarded; stays have day resolution.
pub fn parse_calendar_date(text: &str) -> Option<NaiveDate> {
    let text = text.trim();
    if let Ok(date) = NaiveDate::parse_from_str(text, "%Y-%m-%d") {
        return Some(date);
    }
    if let Ok(stamp) = DateTime::parse_from_rfc3339(text) {
        return Some(stamp.date_naive());
    }
    NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|stamp| stamp.date())
}

/// Checks a required date field, returning the date when it parses.
fn required_date(
    raw: &Option<String>,
    required_label: &'static str,
    format_label: &'static str,
    report: &mut ValidationReport,
) -> Option<NaiveDate> {
    let Some(text) = present(raw) else {
        report.push(ValidationError::Required {
            field: required_label,
        });
        return None;
    };
    let parsed = parse_calendar_date(text);
    if parsed.is_none() {
        report.push(ValidationError::InvalidFormat {
            field: format_label,
        });
    }
    parsed
}

/// Checks a date that is only present on updates.
fn changed_date(
    raw: &Option<String>,
    required_label: &'static str,
    format_label: &'static str,
    report: &mut ValidationReport,
) -> Option<NaiveDate> {
    raw.as_ref()?;
    required_date(raw, required_label, format_label, report)
}

// =============================================================================
// Amounts
// =============================================================================

fn check_booking_amount(input: &AmountInput, report: &mut ValidationReport) {
    match input.to_baht() {
        Some(baht) if baht >= 0.0 => {
            if baht > BOOKING_AMOUNT_CEILING.as_baht_f64() {
                report.push(ValidationError::Implausible {
                    field: "Total amount",
                    ceiling: "1M",
                });
            }
        }
        _ => report.push(ValidationError::NegativeAmount {
            field: "Total amount",
        }),
    }
}

/// Positivity is judged in whole satang: a figure that rounds to zero
/// satang is not an amount.
fn check_transaction_amount(input: &AmountInput, report: &mut ValidationReport) {
    let Some(baht) = input.to_baht() else {
        report.push(ValidationError::NotANumber { field: "Amount" });
        return;
    };
    if baht > TRANSACTION_AMOUNT_CEILING.as_baht_f64() {
        report.push(ValidationError::Implausible {
            field: "Amount",
            ceiling: "10M",
        });
    } else if !Money::from_baht_f64(baht).is_some_and(|amount| amount.is_positive()) {
        report.push(ValidationError::MustBePositive { field: "Amount" });
    }
}

/// Coerces an amount input once it has passed validation.
pub fn coerce_amount(input: Option<&AmountInput>) -> Option<Money> {
    input.and_then(AmountInput::to_money)
}

fn check_status(raw: &Option<String>, report: &mut ValidationReport) {
    if let Some(status) = present(raw) {
        if let Err(err) = status.parse::<BookingStatus>() {
            report.push(err);
        }
    }
}

// =============================================================================
// Booking Validators
// =============================================================================

/// Validates a booking creation payload.
///
/// ## Rules (in message order)
/// 1. guest name required
/// 2. room number required
/// 3. check-in required and parseable
/// 4. check-out required and parseable
/// 5. check-out after check-in
/// 6. check-in no earlier than yesterday
/// 7. total amount, when present: numeric, >= 0, <= 1M
/// 8. status, when present: one of the six statuses
///
/// Rules 5 and 6 only run when both dates parse.
pub fn validate_booking(draft: &BookingDraft, today: NaiveDate) -> ValidationReport {
    let mut report = ValidationReport::default();

    if present(&draft.guest_name).is_none() {
        report.push(ValidationError::Required {
            field: "Guest name",
        });
    }
    if present(&draft.room_number).is_none() {
        report.push(ValidationError::Required {
            field: "Room number",
        });
    }

    let check_in = required_date(&draft.check_in, "Check-in date", "check-in date", &mut report);
    let check_out = required_date(
        &draft.check_out,
        "Check-out date",
        "check-out date",
        &mut report,
    );

    if let (Some(check_in), Some(check_out)) = (check_in, check_out) {
        if check_out <= check_in {
            report.push(ValidationError::CheckOutNotAfterCheckIn);
        }
        let earliest = today.checked_sub_days(Days::new(1)).unwrap_or(today);
        if check_in < earliest {
            report.push(ValidationError::PastCheckIn);
        }
    }

    if let Some(amount) = &draft.total_amount {
        check_booking_amount(amount, &mut report);
    }
    check_status(&draft.status, &mut report);

    report
}

/// Validates the fields an update actually changes.
///
/// Unchanged fields are trusted: they passed validation when stored. The
/// past-date rule does not apply, so a guest already in house can still
/// have their stay edited. The ordering rule runs on the merged range.
pub fn validate_booking_patch(current: &Booking, patch: &BookingPatch) -> ValidationReport {
    let mut report = ValidationReport::default();

    if patch.guest_name.is_some() && present(&patch.guest_name).is_none() {
        report.push(ValidationError::Required {
            field: "Guest name",
        });
    }
    if patch.room_number.is_some() && present(&patch.room_number).is_none() {
        report.push(ValidationError::Required {
            field: "Room number",
        });
    }

    let check_in = changed_date(&patch.check_in, "Check-in date", "check-in date", &mut report);
    let check_out = changed_date(
        &patch.check_out,
        "Check-out date",
        "check-out date",
        &mut report,
    );

    let in_ok = patch.check_in.is_none() || check_in.is_some();
    let out_ok = patch.check_out.is_none() || check_out.is_some();
    if in_ok && out_ok {
        let effective_in = check_in.unwrap_or(current.check_in);
        let effective_out = check_out.unwrap_or(current.check_out);
        if effective_out <= effective_in {
            report.push(ValidationError::CheckOutNotAfterCheckIn);
        }
    }

    if let Some(amount) = &patch.total_amount {
        check_booking_amount(amount, &mut report);
    }
    check_status(&patch.status, &mut report);

    report
}

// =============================================================================
// Transaction Validators
// =============================================================================

/// Validates a ledger entry creation payload.
///
/// ## Date Window
/// ```text
///   today - 1 year            today   tomorrow
///        │─────────── accepted ──────────│
///   older: "more than 1 year old"        later: "cannot be in the future"
/// ```
pub fn validate_transaction(draft: &TransactionDraft, today: NaiveDate) -> ValidationReport {
    let mut report = ValidationReport::default();

    let date = required_date(&draft.date, "Date", "date", &mut report);

    match present(&draft.kind) {
        None => report.push(ValidationError::Required {
            field: "Transaction type",
        }),
        Some(kind) => {
            if let Err(err) = kind.parse::<TransactionType>() {
                report.push(err);
            }
        }
    }

    if present(&draft.category).is_none() {
        report.push(ValidationError::Required { field: "Category" });
    }

    match &draft.amount {
        None => report.push(ValidationError::Required { field: "Amount" }),
        Some(amount) => check_transaction_amount(amount, &mut report),
    }

    if let Some(date) = date {
        let oldest = today.checked_sub_months(Months::new(12)).unwrap_or(today);
        let latest = today.checked_add_days(Days::new(1)).unwrap_or(today);
        if date < oldest {
            report.push(ValidationError::TransactionTooOld);
        }
        if date > latest {
            report.push(ValidationError::TransactionInFuture);
        }
    }

    report
}

/// Validates the fields a ledger amendment changes.
pub fn validate_transaction_patch(patch: &TransactionPatch) -> ValidationReport {
    let mut report = ValidationReport::default();
    if patch.category.is_some() && present(&patch.category).is_none() {
        report.push(ValidationError::Required { field: "Category" });
    }
    if let Some(amount) = &patch.amount {
        check_transaction_amount(amount, &mut report);
    }
    report
}

// =============================================================================
// Unit Tests
// =============================================================================
