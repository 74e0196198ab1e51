//! Liveness and database check for load balancers and the desk UI.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use resort_db::migrations::migration_status;
use serde_json::{json, Value};

use crate::state::AppState;

/// `GET /health`: 200 when the database answers, 503 otherwise.
pub async fn check(State(state): State<AppState>) -> (StatusCode, Json<Value>) {
    let database = state.db.health_check().await;
    let migrations = migration_status(state.db.pool()).await.ok();

    let status = if database {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let body = json!({
        "status": if database { "ok" } else { "degraded" },
        "database": database,
        "migrations": migrations.map(|(embedded, applied)| json!({
            "embedded": embedded,
            "applied": applied,
        })),
        "today": state.clock.today().to_string(),
        "timestamp": state.clock.now().to_rfc3339(),
    });

    (status, Json(body))
}
