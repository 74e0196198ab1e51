//! Daily cash report.

use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::Json;
use resort_core::report::{daily_summary, DailySummary};
use serde::Deserialize;
use tracing::debug;

use super::{query_date, ApiResponse};
use crate::error::ApiResult;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct DailyQuery {
    pub date: Option<String>,
}

/// `GET /api/reports/daily?date=`: defaults to the resort's today.
pub async fn daily(
    State(state): State<AppState>,
    query: Result<Query<DailyQuery>, QueryRejection>,
) -> ApiResult<Json<ApiResponse<DailySummary>>> {
    let Query(query) = query?;
    let date = query_date(query.date.as_deref(), "date")?.unwrap_or_else(|| state.clock.today());
    debug!(%date, "Building daily summary");

    let transactions = state.db.transactions().for_date(date).await?;
    let bookings = state.db.bookings().active().await?;

    Ok(Json(ApiResponse::data(daily_summary(
        date,
        &transactions,
        &bookings,
        state.catalog(),
    ))))
}
