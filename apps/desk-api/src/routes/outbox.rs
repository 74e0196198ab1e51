//! Notification outbox: what the relay still has to send, and its
//! acknowledgements.

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::Json;
use resort_db::OutboxEntry;
use serde::Deserialize;
use tracing::info;

use super::ApiResponse;
use crate::error::ApiResult;
use crate::state::AppState;

const DEFAULT_OUTBOX_PAGE: u32 = 50;
const MAX_OUTBOX_PAGE: u32 = 500;

#[derive(Debug, Default, Deserialize)]
pub struct PendingQuery {
    pub limit: Option<u32>,
}

/// `GET /api/outbox?limit=`: oldest undelivered first.
pub async fn pending(
    State(state): State<AppState>,
    query: Result<Query<PendingQuery>, QueryRejection>,
) -> ApiResult<Json<ApiResponse<Vec<OutboxEntry>>>> {
    let Query(query) = query?;
    let limit = query
        .limit
        .unwrap_or(DEFAULT_OUTBOX_PAGE)
        .clamp(1, MAX_OUTBOX_PAGE);

    let entries = state.db.outbox().pending(limit).await?;
    Ok(Json(ApiResponse::list(entries)))
}

/// `POST /api/outbox/{id}/delivered`
pub async fn delivered(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<ApiResponse<()>>> {
    state.db.outbox().mark_delivered(&id).await?;
    info!(%id, "Notification delivered");

    Ok(Json(ApiResponse {
        success: true,
        data: None,
        count: None,
        message: Some("Notification marked delivered"),
    }))
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct FailureReport {
    pub error: String,
}

/// `POST /api/outbox/{id}/failed` with `{ "error": "..." }`
pub async fn failed(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<FailureReport>, JsonRejection>,
) -> ApiResult<Json<ApiResponse<()>>> {
    let Json(report) = payload?;
    state.db.outbox().mark_failed(&id, &report.error).await?;

    Ok(Json(ApiResponse {
        success: true,
        data: None,
        count: None,
        message: Some("Delivery failure recorded"),
    }))
}
