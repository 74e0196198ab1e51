//! # Input Payloads
//!
//! Creation and update payloads as they arrive from the front desk UI and
//! the OTA import pipeline.
//!
//! ## Why Loose Types?
//! Payloads are untrusted. A `guestName` of `42` or `{}` must not abort
//! deserialization with a generic JSON error; it must reach the validator
//! and come back as "Guest name is required". So:
//! - free text: any non-string value becomes `""`
//! - identifiers (`roomNumber`): integers are kept as their decimal text
//! - amounts: numbers, numeric strings, or anything else (flagged later)
//!
//! Structured optional fields (`depositStatus`, `guestDetails`, ...) stay
//! strictly typed; the UI produces them from fixed controls.

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer};

use crate::availability::StayRange;
use crate::money::{parse_baht_number, Money};
use crate::types::{CustomerType, DepositStatus, GuestData, PaymentStatus};
use crate::validation::{parse_calendar_date, sanitize_opt};

// =============================================================================
// Loose Field Deserializers
// =============================================================================

/// Free text: strings pass through, any other JSON value becomes `""`.
/// `null` stays absent.
fn loose_text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(value.map(|v| match v {
        serde_json::Value::String(s) => s,
        _ => String::new(),
    }))
}

/// Identifier: strings and integers are accepted, anything else becomes `""`.
fn loose_identifier<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<String>, D::Error> {
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(value.map(|v| match v {
        serde_json::Value::String(s) => s,
        serde_json::Value::Number(n) if n.is_i64() || n.is_u64() => n.to_string(),
        _ => String::new(),
    }))
}

// =============================================================================
// Amount Input
// =============================================================================

/// An amount as submitted: a number, a numeric string, or garbage.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum AmountInput {
    Number(f64),
    Text(String),
    Other(serde_json::Value),
}

impl AmountInput {
    /// The submitted figure in baht. `None` when the input is not numeric.
    ///
    /// Kept apart from [`AmountInput::to_money`] so a huge but finite
    /// figure is still seen as a number, not as garbage.
    pub fn to_baht(&self) -> Option<f64> {
        match self {
            AmountInput::Number(n) => n.is_finite().then_some(*n),
            AmountInput::Text(text) => parse_baht_number(text),
            AmountInput::Other(serde_json::Value::Bool(flag)) => Some(f64::from(u8::from(*flag))),
            AmountInput::Other(_) => None,
        }
    }

    /// Coerces to money. `None` when the input is not numeric or does not
    /// fit the satang range.
    pub fn to_money(&self) -> Option<Money> {
        Money::from_baht_f64(self.to_baht()?)
    }
}

impl From<Money> for AmountInput {
    fn from(money: Money) -> Self {
        AmountInput::Number(money.as_baht_f64())
    }
}

/// Trimmed text, or `None` when absent or blank.
pub(crate) fn present(field: &Option<String>) -> Option<&str> {
    field.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

// =============================================================================
// Booking Payloads
// =============================================================================

/// Body of a booking creation request.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BookingDraft {
    #[serde(deserialize_with = "loose_text")]
    pub guest_name: Option<String>,
    #[serde(deserialize_with = "loose_identifier")]
    pub room_number: Option<String>,
    #[serde(deserialize_with = "loose_text")]
    pub check_in: Option<String>,
    #[serde(deserialize_with = "loose_text")]
    pub check_out: Option<String>,
    pub total_amount: Option<AmountInput>,
    #[serde(deserialize_with = "loose_text")]
    pub status: Option<String>,
    pub nights: Option<u32>,
    pub price_per_night: Option<Money>,
    pub deposit_amount: Option<Money>,
    pub deposit_status: Option<DepositStatus>,
    pub payment_status: Option<PaymentStatus>,
    pub paid_amount: Option<Money>,
    #[serde(deserialize_with = "loose_text")]
    pub ota_channel: Option<String>,
    #[serde(deserialize_with = "loose_identifier")]
    pub confirmation_number: Option<String>,
    pub guest_details: Option<GuestData>,
}

impl BookingDraft {
    /// Sanitizes every free-text field.
    pub fn sanitized(self) -> Self {
        BookingDraft {
            guest_name: sanitize_opt(self.guest_name),
            room_number: sanitize_opt(self.room_number),
            ota_channel: sanitize_opt(self.ota_channel),
            confirmation_number: sanitize_opt(self.confirmation_number),
            ..self
        }
    }

    /// The requested stay, when both dates parse.
    pub fn stay(&self) -> Option<StayRange> {
        let check_in = parse_calendar_date(present(&self.check_in)?)?;
        let check_out = parse_calendar_date(present(&self.check_out)?)?;
        Some(StayRange::new(check_in, check_out))
    }
}

/// Body of a booking update request. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BookingPatch {
    #[serde(deserialize_with = "loose_text")]
    pub guest_name: Option<String>,
    #[serde(deserialize_with = "loose_identifier")]
    pub room_number: Option<String>,
    #[serde(deserialize_with = "loose_text")]
    pub check_in: Option<String>,
    #[serde(deserialize_with = "loose_text")]
    pub check_out: Option<String>,
    pub total_amount: Option<AmountInput>,
    #[serde(deserialize_with = "loose_text")]
    pub status: Option<String>,
    pub nights: Option<u32>,
    pub price_per_night: Option<Money>,
    pub deposit_amount: Option<Money>,
    pub deposit_status: Option<DepositStatus>,
    pub payment_status: Option<PaymentStatus>,
    pub paid_amount: Option<Money>,
    #[serde(deserialize_with = "loose_text")]
    pub ota_channel: Option<String>,
    #[serde(deserialize_with = "loose_identifier")]
    pub confirmation_number: Option<String>,
    pub guest_details: Option<GuestData>,
}

impl BookingPatch {
    /// Sanitizes the free-text fields the patch carries.
    pub fn sanitized(self) -> Self {
        BookingPatch {
            guest_name: sanitize_opt(self.guest_name),
            room_number: sanitize_opt(self.room_number),
            ota_channel: sanitize_opt(self.ota_channel),
            confirmation_number: sanitize_opt(self.confirmation_number),
            ..self
        }
    }

    /// Whether the patch moves the booking to another room or range.
    pub fn touches_stay(&self) -> bool {
        self.room_number.is_some() || self.check_in.is_some() || self.check_out.is_some()
    }

    pub(crate) fn parsed_check_in(&self) -> Option<NaiveDate> {
        present(&self.check_in).and_then(parse_calendar_date)
    }

    pub(crate) fn parsed_check_out(&self) -> Option<NaiveDate> {
        present(&self.check_out).and_then(parse_calendar_date)
    }
}

// =============================================================================
// Transaction Payloads
// =============================================================================

/// Body of a ledger entry creation request.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TransactionDraft {
    #[serde(deserialize_with = "loose_text")]
    pub date: Option<String>,
    #[serde(rename = "type", deserialize_with = "loose_text")]
    pub kind: Option<String>,
    #[serde(deserialize_with = "loose_text")]
    pub category: Option<String>,
    pub amount: Option<AmountInput>,
    #[serde(deserialize_with = "loose_text")]
    pub description: Option<String>,
    pub is_reconciled: Option<bool>,
    #[serde(deserialize_with = "loose_identifier")]
    pub pms_reference_id: Option<String>,
    #[serde(deserialize_with = "loose_text")]
    pub image_url: Option<String>,
    #[serde(deserialize_with = "loose_identifier")]
    pub room: Option<String>,
    pub guest_data: Option<GuestData>,
    pub customer_type: Option<CustomerType>,
}

impl TransactionDraft {
    pub fn sanitized(self) -> Self {
        TransactionDraft {
            category: sanitize_opt(self.category),
            description: sanitize_opt(self.description),
            room: sanitize_opt(self.room),
            pms_reference_id: sanitize_opt(self.pms_reference_id),
            ..self
        }
    }
}

/// Body of a ledger entry update request.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TransactionPatch {
    #[serde(deserialize_with = "loose_text")]
    pub category: Option<String>,
    pub amount: Option<AmountInput>,
    #[serde(deserialize_with = "loose_text")]
    pub description: Option<String>,
    pub is_reconciled: Option<bool>,
    #[serde(deserialize_with = "loose_identifier")]
    pub pms_reference_id: Option<String>,
}

impl TransactionPatch {
    pub fn sanitized(self) -> Self {
        TransactionPatch {
            category: sanitize_opt(self.category),
            description: sanitize_opt(self.description),
            pms_reference_id: sanitize_opt(self.pms_reference_id),
            ..self
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_non_string_text_becomes_empty() {
        let draft: BookingDraft = serde_json::from_value(json!({
            "guestName": 42,
            "roomNumber": 5,
            "checkIn": "2026-02-18",
            "checkOut": null,
            "status": {"x": 1}
        }))
        .unwrap();
        assert_eq!(draft.guest_name.as_deref(), Some(""));
        assert_eq!(draft.room_number.as_deref(), Some("5"));
        assert_eq!(draft.check_out, None);
        assert_eq!(draft.status.as_deref(), Some(""));
    }

    #[test]
    fn test_amount_input_coercion() {
        let draft: BookingDraft =
            serde_json::from_value(json!({ "totalAmount": "1,600" })).unwrap();
        assert_eq!(
            draft.total_amount.and_then(|a| a.to_money()),
            Some(Money::from_baht(1600))
        );

        let draft: BookingDraft = serde_json::from_value(json!({ "totalAmount": 750.5 })).unwrap();
        assert_eq!(
            draft.total_amount.and_then(|a| a.to_money()),
            Some(Money::from_satang(75_050))
        );

        let draft: BookingDraft = serde_json::from_value(json!({ "totalAmount": [1] })).unwrap();
        assert_eq!(draft.total_amount.and_then(|a| a.to_money()), None);
    }

    #[test]
    fn test_draft_stay() {
        let draft: BookingDraft = serde_json::from_value(json!({
            "checkIn": "2026-02-18",
            "checkOut": "2026-02-20T00:00:00Z"
        }))
        .unwrap();
        assert_eq!(draft.stay().map(|s| s.nights()), Some(2));
    }

    #[test]
    fn test_transaction_type_field_name() {
        let draft: TransactionDraft = serde_json::from_value(json!({
            "type": "INCOME",
            "amount": 1600
        }))
        .unwrap();
        assert_eq!(draft.kind.as_deref(), Some("INCOME"));
        assert!(draft.amount.is_some());
    }

    #[test]
    fn test_sanitized_draft() {
        let draft = BookingDraft {
            guest_name: Some("  <Somchai> ".into()),
            check_in: Some(" 2026-02-18 ".into()),
            ..BookingDraft::default()
        }
        .sanitized();
        assert_eq!(draft.guest_name.as_deref(), Some("Somchai"));
        assert_eq!(draft.check_in.as_deref(), Some(" 2026-02-18 "));
    }

    #[test]
    fn test_patch_touches_stay() {
        let patch = BookingPatch {
            guest_name: Some("Somchai".into()),
            ..BookingPatch::default()
        };
        assert!(!patch.touches_stay());
        let patch = BookingPatch {
            check_out: Some("2026-02-21".into()),
            ..BookingPatch::default()
        };
        assert!(patch.touches_stay());
    }
}
