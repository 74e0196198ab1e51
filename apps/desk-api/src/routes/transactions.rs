//! Ledger routes.

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use resort_core::{Transaction, TransactionDraft, TransactionPatch, TransactionType};
use resort_db::TransactionFilter;
use serde::Deserialize;

use super::{query_date, ApiResponse};
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionListQuery {
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub category: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub limit: Option<u32>,
}

impl TransactionListQuery {
    fn into_filter(self) -> ApiResult<TransactionFilter> {
        let kind = match self.kind.as_deref().map(str::trim).filter(|k| !k.is_empty()) {
            Some(raw) => Some(
                raw.parse::<TransactionType>()
                    .map_err(|err| ApiError::BadRequest(err.to_string()))?,
            ),
            None => None,
        };

        Ok(TransactionFilter {
            kind,
            category: self.category.filter(|c| !c.trim().is_empty()),
            start_date: query_date(self.start_date.as_deref(), "startDate")?,
            end_date: query_date(self.end_date.as_deref(), "endDate")?,
            limit: self.limit,
        })
    }
}

/// `GET /api/transactions`: newest date first, 100 by default.
pub async fn list(
    State(state): State<AppState>,
    query: Result<Query<TransactionListQuery>, QueryRejection>,
) -> ApiResult<Json<ApiResponse<Vec<Transaction>>>> {
    let Query(query) = query?;
    let transactions = state.ledger.list(&query.into_filter()?).await?;
    Ok(Json(ApiResponse::list(transactions)))
}

/// `POST /api/transactions`
pub async fn create(
    State(state): State<AppState>,
    payload: Result<Json<TransactionDraft>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<ApiResponse<Transaction>>)> {
    let Json(draft) = payload?;
    let transaction = state.ledger.record(draft).await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::data(transaction).with_message("Transaction created successfully")),
    ))
}

/// `GET /api/transactions/{id}`
pub async fn get_one(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<ApiResponse<Transaction>>> {
    Ok(Json(ApiResponse::data(state.ledger.get(&id).await?)))
}

/// `PUT /api/transactions/{id}`
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<TransactionPatch>, JsonRejection>,
) -> ApiResult<Json<ApiResponse<Transaction>>> {
    let Json(patch) = payload?;
    let transaction = state.ledger.amend(&id, patch).await?;

    Ok(Json(
        ApiResponse::data(transaction).with_message("Transaction updated successfully"),
    ))
}

/// `DELETE /api/transactions/{id}`
pub async fn remove(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<ApiResponse<()>>> {
    state.ledger.remove(&id).await?;

    Ok(Json(ApiResponse {
        success: true,
        data: None,
        count: None,
        message: Some("Transaction deleted successfully"),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_query_filter() {
        let filter = TransactionListQuery {
            kind: Some("EXPENSE".into()),
            end_date: Some("2026-02-28".into()),
            limit: Some(10),
            ..Default::default()
        }
        .into_filter()
        .unwrap();
        assert_eq!(filter.kind, Some(TransactionType::Expense));
        assert_eq!(filter.limit, Some(10));

        let err = TransactionListQuery {
            kind: Some("income".into()),
            ..Default::default()
        }
        .into_filter()
        .unwrap_err();
        assert_eq!(err.to_string(), "Type must be either INCOME or EXPENSE");
    }
}
