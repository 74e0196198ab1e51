//! Room catalog, stored-room availability, quotes, and the stateless
//! availability check used by import pipelines.

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::Json;
use resort_core::rooms::RoomQuote;
use resort_core::validation::sanitize_value;
use resort_core::{check_room_availability, GatewayError, RoomCatalog, StayRange};
use resort_db::RoomAvailability;
use serde::Deserialize;
use serde_json::Value;

use super::ApiResponse;
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StayQuery {
    pub check_in: Option<String>,
    pub check_out: Option<String>,
    pub exclude_booking_id: Option<String>,
    pub extra_guests: Option<u32>,
}

fn stay_of(check_in: Option<&str>, check_out: Option<&str>) -> ApiResult<StayRange> {
    check_in
        .zip(check_out)
        .and_then(|(check_in, check_out)| StayRange::parse(check_in, check_out))
        .ok_or_else(|| ApiError::BadRequest("checkIn and checkOut must be valid dates".into()))
}

/// `GET /api/rooms`
pub async fn catalog(State(state): State<AppState>) -> Json<ApiResponse<RoomCatalog>> {
    Json(ApiResponse::data(state.catalog().clone()))
}

/// `GET /api/rooms/{room}/availability?checkIn=&checkOut=&excludeBookingId=`
pub async fn availability(
    State(state): State<AppState>,
    Path(room): Path<String>,
    query: Result<Query<StayQuery>, QueryRejection>,
) -> ApiResult<Json<RoomAvailability>> {
    let Query(query) = query?;
    let stay = stay_of(query.check_in.as_deref(), query.check_out.as_deref())?;

    let answer = state
        .gateway
        .check_availability(&room, stay, query.exclude_booking_id.as_deref())
        .await?;
    Ok(Json(answer))
}

/// `GET /api/rooms/{room}/quote?checkIn=&checkOut=&extraGuests=`
pub async fn quote(
    State(state): State<AppState>,
    Path(room): Path<String>,
    query: Result<Query<StayQuery>, QueryRejection>,
) -> ApiResult<Json<ApiResponse<RoomQuote>>> {
    let Query(query) = query?;
    let stay = stay_of(query.check_in.as_deref(), query.check_out.as_deref())?;

    let quote = state
        .catalog()
        .breakdown(&room, &stay, query.extra_guests.unwrap_or(0))
        .ok_or_else(|| GatewayError::not_found("Room", room.as_str()))?;
    Ok(Json(ApiResponse::data(quote)))
}

/// Body of `POST /api/availability/check`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AvailabilityRequest {
    /// Text or number; feeds send both
    pub room_number: Value,
    pub check_in: Option<String>,
    pub check_out: Option<String>,
    /// Plain records; malformed ones are skipped, never fatal
    pub existing_bookings: Vec<Value>,
    pub exclude_booking_id: Option<String>,
}

/// `POST /api/availability/check`: runs the resolver over the supplied
/// records, touching no stored data.
pub async fn check_records(
    payload: Result<Json<AvailabilityRequest>, JsonRejection>,
) -> ApiResult<Json<Value>> {
    let Json(request) = payload?;
    let room = match &request.room_number {
        Value::Number(n) if n.is_u64() => n.to_string(),
        other => sanitize_value(other),
    };
    if room.is_empty() {
        return Err(ApiError::BadRequest("roomNumber is required".into()));
    }
    let stay = stay_of(request.check_in.as_deref(), request.check_out.as_deref())?;

    let availability = check_room_availability(
        &room,
        stay,
        &request.existing_bookings,
        request.exclude_booking_id.as_deref(),
    );
    Ok(Json(serde_json::to_value(&availability)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stay_of_requires_both_dates() {
        assert!(stay_of(Some("2026-02-10"), Some("2026-02-12")).is_ok());
        assert!(stay_of(Some("2026-02-10"), None).is_err());
        assert!(stay_of(Some("soon"), Some("2026-02-12")).is_err());
    }
}
