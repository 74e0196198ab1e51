//! Booking routes. Every write goes through the [`BookingGateway`].
//!
//! [`BookingGateway`]: resort_db::BookingGateway

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use resort_core::validation::validate_booking;
use resort_core::{Booking, BookingDraft, BookingPatch, BookingStatus, ValidationReport};
use resort_db::BookingFilter;
use serde::Deserialize;
use tracing::debug;

use super::{query_date, ApiResponse};
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingListQuery {
    pub status: Option<String>,
    pub room_number: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub limit: Option<u32>,
}

impl BookingListQuery {
    fn into_filter(self) -> ApiResult<BookingFilter> {
        let status = match self.status.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            Some(raw) => Some(
                raw.parse::<BookingStatus>()
                    .map_err(|err| ApiError::BadRequest(err.to_string()))?,
            ),
            None => None,
        };

        Ok(BookingFilter {
            status,
            room_number: self.room_number.filter(|r| !r.trim().is_empty()),
            start_date: query_date(self.start_date.as_deref(), "startDate")?,
            end_date: query_date(self.end_date.as_deref(), "endDate")?,
            limit: self.limit,
        })
    }
}

/// `GET /api/bookings`: newest check-in first.
pub async fn list(
    State(state): State<AppState>,
    query: Result<Query<BookingListQuery>, QueryRejection>,
) -> ApiResult<Json<ApiResponse<Vec<Booking>>>> {
    let Query(query) = query?;
    let filter = query.into_filter()?;
    debug!(?filter, "Listing bookings");

    let bookings = state.db.bookings().list(&filter).await?;
    Ok(Json(ApiResponse::list(bookings)))
}

/// `POST /api/bookings`
pub async fn create(
    State(state): State<AppState>,
    payload: Result<Json<BookingDraft>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<ApiResponse<Booking>>)> {
    let Json(draft) = payload?;
    let booking = state.gateway.create(draft).await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::data(booking).with_message("Booking created successfully")),
    ))
}

/// `GET /api/bookings/{id}`
pub async fn get_one(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<ApiResponse<Booking>>> {
    let booking = state.gateway.get(&id).await?;
    Ok(Json(ApiResponse::data(booking)))
}

/// `PUT /api/bookings/{id}`
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<BookingPatch>, JsonRejection>,
) -> ApiResult<Json<ApiResponse<Booking>>> {
    let Json(patch) = payload?;
    let booking = state.gateway.update(&id, patch).await?;

    Ok(Json(
        ApiResponse::data(booking).with_message("Booking updated successfully"),
    ))
}

/// `DELETE /api/bookings/{id}`
pub async fn remove(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<ApiResponse<Booking>>> {
    let booking = state.gateway.delete(&id).await?;

    Ok(Json(
        ApiResponse::data(booking).with_message("Booking deleted successfully"),
    ))
}

/// `POST /api/bookings/validate`: field rules only, nothing is stored and
/// availability is not checked.
pub async fn validate(
    State(state): State<AppState>,
    payload: Result<Json<BookingDraft>, JsonRejection>,
) -> ApiResult<Json<ValidationReport>> {
    let Json(draft) = payload?;
    let report = validate_booking(&draft.sanitized(), state.clock.today());
    Ok(Json(report))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_query_filter() {
        let query = BookingListQuery {
            status: Some("checked_in".into()),
            room_number: Some(" ".into()),
            start_date: Some("2026-02-01".into()),
            ..Default::default()
        };
        let filter = query.into_filter().unwrap();
        assert_eq!(filter.status, Some(BookingStatus::CheckedIn));
        assert_eq!(filter.room_number, None);
        assert!(filter.start_date.is_some());
        assert!(filter.end_date.is_none());
    }

    #[test]
    fn test_unknown_status_is_a_bad_request() {
        let query = BookingListQuery {
            status: Some("gone".into()),
            ..Default::default()
        };
        assert!(matches!(
            query.into_filter(),
            Err(ApiError::BadRequest(_))
        ));
    }
}
