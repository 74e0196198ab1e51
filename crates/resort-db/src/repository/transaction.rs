//! # Transaction Repository
//!
//! Storage for ledger entries. Validation happens in [`Ledger`] before
//! anything reaches these methods.
//!
//! [`Ledger`]: crate::ledger::Ledger

use chrono::{DateTime, NaiveDate, Utc};
use resort_core::{CustomerType, GuestData, Money, Transaction, TransactionType};
use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use tracing::debug;

use crate::error::{DbError, DbResult};

/// Default number of entries returned by a list call.
pub const DEFAULT_TRANSACTION_LIST: u32 = 100;

const TRANSACTION_COLUMNS: &str = "id, date, type, category, amount, description, is_reconciled, \
     pms_reference_id, image_url, room, guest_data, customer_type, created_at, updated_at";

#[derive(Debug, sqlx::FromRow)]
struct TransactionRow {
    id: String,
    date: NaiveDate,
    #[sqlx(rename = "type")]
    kind: TransactionType,
    category: String,
    amount: i64,
    description: String,
    is_reconciled: bool,
    pms_reference_id: Option<String>,
    image_url: Option<String>,
    room: Option<String>,
    guest_data: Option<String>,
    customer_type: Option<CustomerType>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<TransactionRow> for Transaction {
    type Error = DbError;

    fn try_from(row: TransactionRow) -> DbResult<Self> {
        let guest_data = row
            .guest_data
            .map(|json| serde_json::from_str::<GuestData>(&json))
            .transpose()
            .map_err(|e| DbError::corrupt("guest_data", e))?;

        Ok(Transaction {
            id: row.id,
            date: row.date,
            kind: row.kind,
            category: row.category,
            amount: Money::from_satang(row.amount),
            description: row.description,
            is_reconciled: row.is_reconciled,
            pms_reference_id: row.pms_reference_id,
            image_url: row.image_url,
            room: row.room,
            guest_data,
            customer_type: row.customer_type,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Filters for listing ledger entries. Dates are inclusive.
#[derive(Debug, Clone, Default)]
pub struct TransactionFilter {
    pub kind: Option<TransactionType>,
    pub category: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    /// Defaults to [`DEFAULT_TRANSACTION_LIST`].
    pub limit: Option<u32>,
}

/// Repository for ledger entries.
#[derive(Debug, Clone)]
pub struct TransactionRepository {
    pool: SqlitePool,
}

impl TransactionRepository {
    /// Creates a new TransactionRepository.
    pub fn new(pool: SqlitePool) -> Self {
        TransactionRepository { pool }
    }

    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Transaction>> {
        let sql = format!("SELECT {TRANSACTION_COLUMNS} FROM transactions WHERE id = ?1");
        let row: Option<TransactionRow> = sqlx::query_as(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.map(Transaction::try_from).transpose()
    }

    pub async fn insert(&self, tx: &Transaction) -> DbResult<()> {
        debug!(id = %tx.id, kind = %tx.kind, amount = %tx.amount, "Inserting transaction");

        let guest_data = tx
            .guest_data
            .as_ref()
            .map(serde_json::to_string)
            .transpose()
            .map_err(|e| DbError::Internal(e.to_string()))?;

        sqlx::query(
            r#"
            INSERT INTO transactions (
                id, date, type, category, amount, description, is_reconciled,
                pms_reference_id, image_url, room, guest_data, customer_type,
                created_at, updated_at
            ) VALUES (
                ?1, ?2, ?3, ?4, ?5, ?6, ?7,
                ?8, ?9, ?10, ?11, ?12,
                ?13, ?14
            )
            "#,
        )
        .bind(&tx.id)
        .bind(tx.date)
        .bind(tx.kind)
        .bind(&tx.category)
        .bind(tx.amount.satang())
        .bind(&tx.description)
        .bind(tx.is_reconciled)
        .bind(&tx.pms_reference_id)
        .bind(&tx.image_url)
        .bind(&tx.room)
        .bind(guest_data)
        .bind(tx.customer_type)
        .bind(tx.created_at)
        .bind(tx.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Writes the amendable columns of an existing entry.
    pub async fn update(&self, tx: &Transaction) -> DbResult<()> {
        debug!(id = %tx.id, "Updating transaction");

        let result = sqlx::query(
            r#"
            UPDATE transactions SET
                category = ?2,
                amount = ?3,
                description = ?4,
                is_reconciled = ?5,
                pms_reference_id = ?6,
                updated_at = ?7
            WHERE id = ?1
            "#,
        )
        .bind(&tx.id)
        .bind(&tx.category)
        .bind(tx.amount.satang())
        .bind(&tx.description)
        .bind(tx.is_reconciled)
        .bind(&tx.pms_reference_id)
        .bind(tx.updated_at)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Transaction", &tx.id));
        }
        Ok(())
    }

    /// Returns whether a row was removed.
    pub async fn delete(&self, id: &str) -> DbResult<bool> {
        debug!(id = %id, "Deleting transaction");
        let result = sqlx::query("DELETE FROM transactions WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Lists entries, newest date first.
    pub async fn list(&self, filter: &TransactionFilter) -> DbResult<Vec<Transaction>> {
        let limit = filter.limit.unwrap_or(DEFAULT_TRANSACTION_LIST);

        let mut query: QueryBuilder<Sqlite> = QueryBuilder::new(format!(
            "SELECT {TRANSACTION_COLUMNS} FROM transactions WHERE 1 = 1"
        ));
        if let Some(kind) = filter.kind {
            query.push(" AND type = ").push_bind(kind);
        }
        if let Some(category) = &filter.category {
            query.push(" AND category = ").push_bind(category.clone());
        }
        if let Some(start) = filter.start_date {
            query.push(" AND date >= ").push_bind(start);
        }
        if let Some(end) = filter.end_date {
            query.push(" AND date <= ").push_bind(end);
        }
        query
            .push(" ORDER BY date DESC, created_at DESC LIMIT ")
            .push_bind(i64::from(limit));

        let rows = query
            .build_query_as::<TransactionRow>()
            .fetch_all(&self.pool)
            .await?;
        rows.into_iter().map(Transaction::try_from).collect()
    }

    /// Every entry dated `date`.
    pub async fn for_date(&self, date: NaiveDate) -> DbResult<Vec<Transaction>> {
        let sql = format!(
            "SELECT {TRANSACTION_COLUMNS} FROM transactions WHERE date = ?1 ORDER BY created_at ASC"
        );
        let rows: Vec<TransactionRow> = sqlx::query_as(&sql)
            .bind(date)
            .fetch_all(&self.pool)
            .await?;
        rows.into_iter().map(Transaction::try_from).collect()
    }
}

/// Generates a new transaction ID.
pub fn generate_transaction_id() -> String {
    uuid::Uuid::new_v4().to_string()
}
