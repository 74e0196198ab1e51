//! # Notification Outbox Repository
//!
//! Queues booking events for delivery to staff channels (LINE, email).
//!
//! ## The Outbox Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Outbox Pattern Implementation                        │
//! │                                                                         │
//! │  BOOKING MUTATION (gateway create/update/delete)                       │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                   SINGLE TRANSACTION                            │   │
//! │  │                                                                 │   │
//! │  │  1. INSERT / UPDATE / DELETE bookings                          │   │
//! │  │                                                                 │   │
//! │  │  2. INSERT INTO notification_outbox (event_type, entity_id,    │   │
//! │  │     payload) VALUES ('booking.created', ?, <booking JSON>)     │   │
//! │  │                                                                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  COMMIT ← Both succeed or both fail                                    │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  DELIVERY WORKER (outside this workspace)                              │
//! │  GET /api/outbox → send → POST /api/outbox/{id}/delivered              │
//! │                                                                         │
//! │  KEY GUARANTEES:                                                       │
//! │  • No notification for a change that rolled back                       │
//! │  • No committed change without its notification                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};

/// Booking lifecycle events.
pub mod events {
    pub const BOOKING_CREATED: &str = "booking.created";
    pub const BOOKING_UPDATED: &str = "booking.updated";
    pub const BOOKING_DELETED: &str = "booking.deleted";
}

/// A queued notification.
#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct OutboxEntry {
    pub id: String,
    pub event_type: String,
    pub entity_id: String,
    /// JSON body of the entity at the time of the event.
    pub payload: String,
    pub attempts: i64,
    pub last_error: Option<String>,
    pub created_at: DateTime<Utc>,
    pub attempted_at: Option<DateTime<Utc>>,
    pub delivered_at: Option<DateTime<Utc>>,
}

/// Queues an event on an open connection (normally `&mut *tx`).
pub(crate) async fn enqueue_on(
    conn: &mut SqliteConnection,
    event_type: &str,
    entity_id: &str,
    payload: &impl Serialize,
    now: DateTime<Utc>,
) -> DbResult<OutboxEntry> {
    let payload = serde_json::to_string(payload).map_err(|e| DbError::Internal(e.to_string()))?;

    debug!(event_type = %event_type, entity_id = %entity_id, "Queuing notification");

    let entry = OutboxEntry {
        id: Uuid::new_v4().to_string(),
        event_type: event_type.to_string(),
        entity_id: entity_id.to_string(),
        payload,
        attempts: 0,
        last_error: None,
        created_at: now,
        attempted_at: None,
        delivered_at: None,
    };

    sqlx::query(
        r#"
        INSERT INTO notification_outbox (
            id, event_type, entity_id, payload,
            attempts, last_error, created_at, attempted_at, delivered_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
        "#,
    )
    .bind(&entry.id)
    .bind(&entry.event_type)
    .bind(&entry.entity_id)
    .bind(&entry.payload)
    .bind(entry.attempts)
    .bind(&entry.last_error)
    .bind(entry.created_at)
    .bind(entry.attempted_at)
    .bind(entry.delivered_at)
    .execute(&mut *conn)
    .await?;

    Ok(entry)
}

/// Repository for notification outbox operations.
#[derive(Debug, Clone)]
pub struct OutboxRepository {
    pool: SqlitePool,
}

impl OutboxRepository {
    /// Creates a new OutboxRepository.
    pub fn new(pool: SqlitePool) -> Self {
        OutboxRepository { pool }
    }

    /// Queues an event outside any booking transaction.
    pub async fn enqueue(
        &self,
        event_type: &str,
        entity_id: &str,
        payload: &impl Serialize,
    ) -> DbResult<OutboxEntry> {
        let mut conn = self.pool.acquire().await?;
        enqueue_on(&mut conn, event_type, entity_id, payload, Utc::now()).await
    }

    /// Entries not yet delivered, oldest first.
    pub async fn pending(&self, limit: u32) -> DbResult<Vec<OutboxEntry>> {
        let entries = sqlx::query_as::<_, OutboxEntry>(
            r#"
            SELECT
                id, event_type, entity_id, payload, attempts, last_error,
                created_at, attempted_at, delivered_at
            FROM notification_outbox
            WHERE delivered_at IS NULL
            ORDER BY created_at ASC
            LIMIT ?1
            "#,
        )
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await?;

        Ok(entries)
    }

    /// Marks an entry as delivered. Unknown ids are `NotFound`.
    pub async fn mark_delivered(&self, id: &str) -> DbResult<()> {
        let now = Utc::now();

        let result = sqlx::query(
            r#"
            UPDATE notification_outbox SET
                delivered_at = ?2,
                attempted_at = ?2
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Outbox entry", id));
        }
        Ok(())
    }

    /// Records a delivery failure.
    pub async fn mark_failed(&self, id: &str, error: &str) -> DbResult<()> {
        let now = Utc::now();

        let result = sqlx::query(
            r#"
            UPDATE notification_outbox SET
                attempts = attempts + 1,
                last_error = ?2,
                attempted_at = ?3
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(error)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Outbox entry", id));
        }
        Ok(())
    }

    /// Counts undelivered entries.
    pub async fn count_pending(&self) -> DbResult<i64> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM notification_outbox WHERE delivered_at IS NULL")
                .fetch_one(&self.pool)
                .await?;

        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use crate::pool::{Database, DbConfig};
    use serde_json::json;

    use super::events;

    #[tokio::test]
    async fn test_enqueue_and_deliver() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let outbox = db.outbox();

        let entry = outbox
            .enqueue(events::BOOKING_CREATED, "BK-1", &json!({ "id": "BK-1" }))
            .await
            .unwrap();
        assert_eq!(outbox.count_pending().await.unwrap(), 1);

        outbox.mark_failed(&entry.id, "LINE timeout").await.unwrap();
        let pending = outbox.pending(10).await.unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].attempts, 1);
        assert_eq!(pending[0].last_error.as_deref(), Some("LINE timeout"));

        outbox.mark_delivered(&entry.id).await.unwrap();
        assert_eq!(outbox.count_pending().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_unknown_entry() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let err = db.outbox().mark_delivered("missing").await.unwrap_err();
        assert!(matches!(err, crate::DbError::NotFound { .. }));
    }
}
