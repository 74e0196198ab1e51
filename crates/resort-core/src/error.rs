//! # Error Types
//!
//! Domain-specific error types for resort-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  resort-core errors (this file)                                        │
//! │  ├── ValidationError  - One field-level problem (stable message)       │
//! │  └── GatewayError     - Why a front desk operation was rejected        │
//! │       ├── Validation  (400) - every field problem at once              │
//! │       ├── Conflict    (409) - overlapping active booking               │
//! │       └── NotFound    (404) - unknown identifier                       │
//! │                                                                         │
//! │  resort-db errors (separate crate)                                     │
//! │  └── DbError          - Persistence failures (propagated unchanged)    │
//! │                                                                         │
//! │  desk-api errors (in app)                                              │
//! │  └── ApiError         - What the HTTP client sees                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. The `Display` text of a `ValidationError` IS the user-facing message;
//!    clients and tests match on it, so wording changes are breaking changes
//! 3. Expected outcomes (invalid input, conflicts) are values, never panics

use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};
use thiserror::Error;

use crate::types::Booking;
use crate::validation::ValidationReport;

// =============================================================================
// Validation Error
// =============================================================================

/// A single field-level validation problem.
///
/// Field labels are human-readable ("Guest name", "check-in date") because
/// they are spliced straight into the message.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required field is missing or blank.
    #[error("{field} is required")]
    Required { field: &'static str },

    /// A date field does not parse as a calendar date.
    #[error("Invalid {field} format")]
    InvalidFormat { field: &'static str },

    #[error("Check-out date must be after check-in date")]
    CheckOutNotAfterCheckIn,

    /// Check-in is earlier than yesterday (one day of timezone grace).
    #[error("Cannot create booking for past dates")]
    PastCheckIn,

    /// Booking amount is not numeric or is below zero.
    #[error("{field} must be a positive number")]
    NegativeAmount { field: &'static str },

    /// Transaction amount does not coerce to a number.
    #[error("{field} must be a number")]
    NotANumber { field: &'static str },

    /// Transaction amount is zero or negative.
    #[error("{field} must be greater than 0")]
    MustBePositive { field: &'static str },

    /// Amount is above the data-entry sanity ceiling.
    #[error("{field} seems unreasonably high (> {ceiling})")]
    Implausible {
        field: &'static str,
        ceiling: &'static str,
    },

    /// Value is not in the enumerated set.
    #[error("Invalid {field}. Must be one of: {}", .allowed.join(", "))]
    NotAllowed {
        field: &'static str,
        allowed: &'static [&'static str],
    },

    #[error("Type must be either INCOME or EXPENSE")]
    InvalidTransactionType,

    #[error("Transaction date is more than 1 year old")]
    TransactionTooOld,

    /// Transaction date is later than tomorrow.
    #[error("Transaction date cannot be in the future")]
    TransactionInFuture,
}

// =============================================================================
// Gateway Error
// =============================================================================

/// Why a booking or ledger operation was rejected.
///
/// ## Precedence
/// ```text
/// sanitize ──► validate ──► resolve availability ──► persist
///                 │                  │
///                 ▼                  ▼
///            Validation          Conflict
/// ```
/// Validation always wins: a payload with field problems is never checked
/// for availability, so a caller never sees a conflict for a request that
/// was going to be rejected anyway.
///
/// ## Wire Shape
/// `Serialize` produces the JSON body the front desk expects:
/// ```json
/// { "success": false, "error": "Validation failed", "errors": ["..."] }
/// { "success": false, "error": "Room not available", "message": "...", "conflictingBooking": {..} }
/// { "success": false, "error": "not found", "message": "Booking not found: BK-1" }
/// ```
#[derive(Debug, Clone, Error)]
pub enum GatewayError {
    #[error("Validation failed: {}", .0.messages().join("; "))]
    Validation(ValidationReport),

    #[error("Room not available: {message}")]
    Conflict {
        message: String,
        conflicting_booking: Box<Booking>,
    },

    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },
}

impl GatewayError {
    /// Creates a NotFound error for a given entity type and ID.
    pub fn not_found(entity: &'static str, id: impl Into<String>) -> Self {
        GatewayError::NotFound {
            entity,
            id: id.into(),
        }
    }

    /// Machine-checkable discriminator.
    pub fn kind(&self) -> &'static str {
        match self {
            GatewayError::Validation(_) => "validation",
            GatewayError::Conflict { .. } => "conflict",
            GatewayError::NotFound { .. } => "not_found",
        }
    }
}

impl From<ValidationReport> for GatewayError {
    fn from(report: ValidationReport) -> Self {
        GatewayError::Validation(report)
    }
}

impl Serialize for GatewayError {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            GatewayError::Validation(report) => {
                let mut body = serializer.serialize_struct("GatewayError", 3)?;
                body.serialize_field("success", &false)?;
                body.serialize_field("error", "Validation failed")?;
                body.serialize_field("errors", &report.messages())?;
                body.end()
            }
            GatewayError::Conflict {
                message,
                conflicting_booking,
            } => {
                let mut body = serializer.serialize_struct("GatewayError", 4)?;
                body.serialize_field("success", &false)?;
                body.serialize_field("error", "Room not available")?;
                body.serialize_field("message", message)?;
                body.serialize_field("conflictingBooking", conflicting_booking)?;
                body.end()
            }
            GatewayError::NotFound { .. } => {
                let mut body = serializer.serialize_struct("GatewayError", 3)?;
                body.serialize_field("success", &false)?;
                body.serialize_field("error", "not found")?;
                body.serialize_field("message", &self.to_string())?;
                body.end()
            }
        }
    }
}

/// Convenience type alias for gateway decisions.
pub type GatewayResult<T> = Result<T, GatewayError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::BookingStatus;

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::Required {
            field: "Guest name",
        };
        assert_eq!(err.to_string(), "Guest name is required");

        let err = ValidationError::InvalidFormat {
            field: "check-in date",
        };
        assert_eq!(err.to_string(), "Invalid check-in date format");

        let err = ValidationError::Implausible {
            field: "Total amount",
            ceiling: "1M",
        };
        assert_eq!(err.to_string(), "Total amount seems unreasonably high (> 1M)");
    }

    #[test]
    fn test_not_allowed_lists_statuses() {
        let err = ValidationError::NotAllowed {
            field: "status",
            allowed: BookingStatus::NAMES,
        };
        assert_eq!(
            err.to_string(),
            "Invalid status. Must be one of: confirmed, checked_in, checked_out, pending, locked, cancelled"
        );
    }

    #[test]
    fn test_gateway_error_wire_shape() {
        let mut report = ValidationReport::default();
        report.push(ValidationError::Required { field: "Room number" });
        let err = GatewayError::from(report);
        assert_eq!(err.kind(), "validation");

        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(json["success"], false);
        assert_eq!(json["error"], "Validation failed");
        assert_eq!(json["errors"][0], "Room number is required");

        let json = serde_json::to_value(GatewayError::not_found("Booking", "BK-9")).unwrap();
        assert_eq!(json["error"], "not found");
        assert_eq!(json["message"], "Booking not found: BK-9");
    }
}
