//! # API Error Type
//!
//! Everything a handler can fail with, and the HTTP reply for each.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  handler ──► gateway / ledger ──► DeskError                            │
//! │                                      │                                  │
//! │                   ┌──────────────────┴───────────────────┐              │
//! │                   ▼                                      ▼              │
//! │          Rejected(GatewayError)                   Store(DbError)        │
//! │           │ Validation ─► 400                      │ NotFound ─► 404    │
//! │           │ Conflict   ─► 409                      │ anything  ─► 500   │
//! │           │ NotFound   ─► 404                      │ else (logged,      │
//! │           │                                        │ generic message)   │
//! │                                                                         │
//! │  extractors / middleware ──► BadRequest 400, Unauthorized 401,         │
//! │                              TooManyRequests 429                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Store failures are logged in full and answered with a generic message;
//! SQL text never reaches a client.

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use resort_core::GatewayError;
use resort_db::{DbError, DeskError};
use serde_json::json;
use thiserror::Error;
use tracing::error;

/// Error returned from route handlers.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Rejected(#[from] GatewayError),

    #[error(transparent)]
    Store(#[from] DbError),

    /// Unreadable request: malformed JSON, bad query string, bad dates.
    #[error("{0}")]
    BadRequest(String),

    #[error("Invalid or missing API key")]
    Unauthorized,

    #[error("Rate limit exceeded. Try again in {retry_after_secs}s")]
    TooManyRequests { retry_after_secs: u64 },

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type ApiResult<T> = Result<T, ApiError>;

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Rejected(GatewayError::Validation(_)) => StatusCode::BAD_REQUEST,
            ApiError::Rejected(GatewayError::Conflict { .. }) => StatusCode::CONFLICT,
            ApiError::Rejected(GatewayError::NotFound { .. }) => StatusCode::NOT_FOUND,
            ApiError::Store(DbError::NotFound { .. }) => StatusCode::NOT_FOUND,
            ApiError::Store(_) | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::TooManyRequests { .. } => StatusCode::TOO_MANY_REQUESTS,
        }
    }
}

impl From<DeskError> for ApiError {
    fn from(err: DeskError) -> Self {
        match err {
            DeskError::Rejected(rejection) => ApiError::Rejected(rejection),
            DeskError::Store(store) => ApiError::Store(store),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::Internal(err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();

        let body = match &self {
            ApiError::Rejected(rejection) => {
                return (status, Json(rejection)).into_response();
            }
            ApiError::Store(DbError::NotFound { entity, id }) => json!({
                "success": false,
                "error": "not found",
                "message": format!("{entity} not found: {id}"),
            }),
            ApiError::Store(err) => {
                error!(error = %err, "Database error");
                json!({
                    "success": false,
                    "error": "Internal server error",
                    "message": "Database operation failed",
                })
            }
            ApiError::Internal(message) => {
                error!(error = %message, "Internal error");
                json!({
                    "success": false,
                    "error": "Internal server error",
                    "message": "An unexpected error occurred",
                })
            }
            ApiError::BadRequest(message) => json!({
                "success": false,
                "error": "Invalid request",
                "message": message,
            }),
            ApiError::Unauthorized => json!({
                "success": false,
                "error": "Unauthorized",
                "message": self.to_string(),
            }),
            ApiError::TooManyRequests { .. } => json!({
                "success": false,
                "error": "Too many requests",
                "message": self.to_string(),
            }),
        };

        (status, Json(body)).into_response()
    }
}
