//! # Routes
//!
//! Handlers are thin: extract, call the gateway, ledger or a repository,
//! then wrap the answer.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  /health                          health::check                         │
//! │  /api/bookings[/{id}]             bookings  ──► BookingGateway          │
//! │  /api/bookings/validate           bookings  ──► validate_booking        │
//! │  /api/rooms[/{room}/...]          rooms     ──► RoomCatalog, gateway    │
//! │  /api/availability/check          rooms     ──► check_room_availability │
//! │  /api/transactions[/{id}]         transactions ──► Ledger               │
//! │  /api/reports/daily               reports   ──► daily_summary           │
//! │  /api/outbox[/{id}/...]           outbox    ──► OutboxRepository        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Successful bodies share one envelope:
//! `{ "success": true, "data"?: ..., "count"?: n, "message"?: "..." }`.

pub mod bookings;
pub mod health;
pub mod outbox;
pub mod reports;
pub mod rooms;
pub mod transactions;

use axum::routing::{get, post};
use axum::Router;
use chrono::NaiveDate;
use resort_core::validation::parse_calendar_date;
use serde::Serialize;

use crate::error::ApiError;
use crate::state::AppState;

/// Every route, before middleware.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/health", get(health::check))
        .route("/api/bookings", get(bookings::list).post(bookings::create))
        .route("/api/bookings/validate", post(bookings::validate))
        .route(
            "/api/bookings/{id}",
            get(bookings::get_one)
                .put(bookings::update)
                .delete(bookings::remove),
        )
        .route("/api/rooms", get(rooms::catalog))
        .route("/api/rooms/{room}/availability", get(rooms::availability))
        .route("/api/rooms/{room}/quote", get(rooms::quote))
        .route("/api/availability/check", post(rooms::check_records))
        .route(
            "/api/transactions",
            get(transactions::list).post(transactions::create),
        )
        .route(
            "/api/transactions/{id}",
            get(transactions::get_one)
                .put(transactions::update)
                .delete(transactions::remove),
        )
        .route("/api/reports/daily", get(reports::daily))
        .route("/api/outbox", get(outbox::pending))
        .route("/api/outbox/{id}/delivered", post(outbox::delivered))
        .route("/api/outbox/{id}/failed", post(outbox::failed))
}

// =============================================================================
// Response Envelope
// =============================================================================

#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<&'static str>,
}

impl<T> ApiResponse<T> {
    pub fn data(data: T) -> Self {
        ApiResponse {
            success: true,
            data: Some(data),
            count: None,
            message: None,
        }
    }

    pub fn with_message(mut self, message: &'static str) -> Self {
        self.message = Some(message);
        self
    }
}

impl<T> ApiResponse<Vec<T>> {
    /// A list with its length alongside.
    pub fn list(items: Vec<T>) -> Self {
        ApiResponse {
            success: true,
            count: Some(items.len()),
            data: Some(items),
            message: None,
        }
    }
}

/// Parses an optional query-string date, naming the parameter on failure.
pub(crate) fn query_date(value: Option<&str>, name: &str) -> Result<Option<NaiveDate>, ApiError> {
    match value.map(str::trim).filter(|v| !v.is_empty()) {
        None => Ok(None),
        Some(text) => parse_calendar_date(text)
            .map(Some)
            .ok_or_else(|| ApiError::BadRequest(format!("Invalid {name}: {text}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_envelope_shape() {
        let body = serde_json::to_value(ApiResponse::list(vec![1, 2])).unwrap();
        assert_eq!(body, serde_json::json!({ "success": true, "data": [1, 2], "count": 2 }));

        let body =
            serde_json::to_value(ApiResponse::data("x").with_message("Booking created successfully"))
                .unwrap();
        assert_eq!(body["message"], "Booking created successfully");
        assert!(body.get("count").is_none());
    }

    #[test]
    fn test_query_date() {
        assert_eq!(query_date(None, "date").unwrap(), None);
        assert_eq!(query_date(Some(" "), "date").unwrap(), None);
        assert_eq!(
            query_date(Some("2026-02-10"), "date").unwrap(),
            NaiveDate::from_ymd_opt(2026, 2, 10)
        );
        let err = query_date(Some("2026-02-30"), "startDate").unwrap_err();
        assert_eq!(err.to_string(), "Invalid startDate: 2026-02-30");
    }
}
