//! # Transaction Ledger
//!
//! Validated writes for the resort's income and expense records.
//!
//! ```text
//! TransactionDraft ──► sanitize ──► validate_transaction(today) ──► INSERT
//!                                          │
//!                                          └── problems ──► Validation (nothing written)
//! ```

use std::sync::Arc;

use resort_core::validation::{
    coerce_amount, parse_calendar_date, validate_transaction, validate_transaction_patch,
};
use resort_core::{
    Clock, GatewayError, Transaction, TransactionDraft, TransactionPatch, TransactionType,
    ValidationError, ValidationReport,
};
use sqlx::SqlitePool;
use tracing::{info, warn};

use crate::gateway::DeskResult;
use crate::repository::transaction::{
    generate_transaction_id, TransactionFilter, TransactionRepository,
};

fn rejected(error: ValidationError) -> GatewayError {
    GatewayError::Validation(ValidationReport::single(error))
}

fn text(field: Option<String>) -> Option<String> {
    field.filter(|value| !value.is_empty())
}

/// Front door for ledger mutations.
#[derive(Clone)]
pub struct Ledger {
    transactions: TransactionRepository,
    clock: Arc<dyn Clock>,
}

impl std::fmt::Debug for Ledger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Ledger")
            .field("today", &self.clock.today())
            .finish()
    }
}

impl Ledger {
    pub fn new(pool: SqlitePool, clock: Arc<dyn Clock>) -> Self {
        Ledger {
            transactions: TransactionRepository::new(pool),
            clock,
        }
    }

    /// Records a new entry.
    pub async fn record(&self, draft: TransactionDraft) -> DeskResult<Transaction> {
        let draft = draft.sanitized();
        let report = validate_transaction(&draft, self.clock.today());
        if !report.is_valid() {
            warn!(errors = ?report.messages(), "Transaction rejected");
            return Err(GatewayError::Validation(report).into());
        }

        let date = draft
            .date
            .as_deref()
            .map(str::trim)
            .and_then(parse_calendar_date)
            .ok_or_else(|| rejected(ValidationError::InvalidFormat { field: "date" }))?;
        let kind = draft
            .kind
            .as_deref()
            .map(str::trim)
            .unwrap_or_default()
            .parse::<TransactionType>()
            .map_err(rejected)?;
        let amount = coerce_amount(draft.amount.as_ref())
            .ok_or_else(|| rejected(ValidationError::NotANumber { field: "Amount" }))?;

        let now = self.clock.now();
        let transaction = Transaction {
            id: generate_transaction_id(),
            date,
            kind,
            category: draft.category.unwrap_or_default(),
            amount,
            description: draft.description.unwrap_or_default(),
            is_reconciled: draft.is_reconciled.unwrap_or(false),
            pms_reference_id: text(draft.pms_reference_id),
            image_url: text(draft.image_url),
            room: text(draft.room),
            guest_data: draft.guest_data,
            customer_type: draft.customer_type,
            created_at: now,
            updated_at: now,
        };

        self.transactions.insert(&transaction).await?;

        info!(
            id = %transaction.id,
            kind = %transaction.kind,
            amount = %transaction.amount,
            "Transaction recorded"
        );
        Ok(transaction)
    }

    /// Amends category, amount, description, reconciliation or PMS link.
    pub async fn amend(&self, id: &str, patch: TransactionPatch) -> DeskResult<Transaction> {
        let mut transaction = self
            .transactions
            .get_by_id(id)
            .await?
            .ok_or_else(|| GatewayError::not_found("Transaction", id))?;

        let patch = patch.sanitized();
        let report = validate_transaction_patch(&patch);
        if !report.is_valid() {
            warn!(id = %id, errors = ?report.messages(), "Transaction amendment rejected");
            return Err(GatewayError::Validation(report).into());
        }

        if let Some(category) = text(patch.category) {
            transaction.category = category;
        }
        if let Some(amount) = coerce_amount(patch.amount.as_ref()) {
            transaction.amount = amount;
        }
        if let Some(description) = patch.description {
            transaction.description = description;
        }
        if let Some(is_reconciled) = patch.is_reconciled {
            transaction.is_reconciled = is_reconciled;
        }
        if patch.pms_reference_id.is_some() {
            transaction.pms_reference_id = text(patch.pms_reference_id);
        }
        transaction.updated_at = self.clock.now();

        self.transactions.update(&transaction).await?;

        info!(id = %transaction.id, "Transaction amended");
        Ok(transaction)
    }

    pub async fn remove(&self, id: &str) -> DeskResult<()> {
        if !self.transactions.delete(id).await? {
            warn!(id = %id, "Delete of unknown transaction");
            return Err(GatewayError::not_found("Transaction", id).into());
        }
        info!(id = %id, "Transaction removed");
        Ok(())
    }

    pub async fn get(&self, id: &str) -> DeskResult<Transaction> {
        self.transactions
            .get_by_id(id)
            .await?
            .ok_or_else(|| GatewayError::not_found("Transaction", id).into())
    }

    pub async fn list(&self, filter: &TransactionFilter) -> DeskResult<Vec<Transaction>> {
        Ok(self.transactions.list(filter).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::DeskError;
    use crate::pool::{Database, DbConfig};
    use chrono::NaiveDate;
    use resort_core::types::categories;
    use resort_core::{FixedClock, Money};
    use serde_json::json;

    async fn ledger() -> (Database, Ledger) {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let clock = Arc::new(FixedClock::on(NaiveDate::from_ymd_opt(2026, 2, 10).unwrap()));
        let ledger = db.ledger(clock);
        (db, ledger)
    }

    fn draft(value: serde_json::Value) -> TransactionDraft {
        serde_json::from_value(value).unwrap()
    }

    fn room_revenue(date: &str, amount: serde_json::Value) -> TransactionDraft {
        draft(json!({
            "date": date,
            "type": "INCOME",
            "category": categories::ROOM_REVENUE,
            "amount": amount,
            "description": "Room 5, 3 nights",
            "room": 5
        }))
    }

    #[tokio::test]
    async fn test_record_and_list() {
        let (_db, ledger) = ledger().await;

        let first = ledger
            .record(room_revenue("2026-02-09", json!(2400)))
            .await
            .unwrap();
        assert_eq!(first.amount, Money::from_baht(2400));
        assert_eq!(first.room.as_deref(), Some("5"));
        assert!(!first.is_reconciled);

        ledger
            .record(draft(json!({
                "date": "2026-02-10",
                "type": "EXPENSE",
                "category": categories::UTILITIES,
                "amount": "1250.50"
            })))
            .await
            .unwrap();

        let all = ledger.list(&TransactionFilter::default()).await.unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].kind, TransactionType::Expense);
        assert_eq!(all[0].amount, Money::from_satang(125_050));

        let income = ledger
            .list(&TransactionFilter {
                kind: Some(TransactionType::Income),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(income.len(), 1);
        assert_eq!(income[0].id, first.id);
    }

    #[tokio::test]
    async fn test_invalid_record_writes_nothing() {
        let (_db, ledger) = ledger().await;

        let err = ledger
            .record(draft(json!({
                "date": "2024-01-01",
                "type": "GIFT",
                "amount": -5
            })))
            .await
            .unwrap_err();
        match err {
            DeskError::Rejected(GatewayError::Validation(report)) => {
                let messages = report.messages();
                assert!(messages.contains(&"Type must be either INCOME or EXPENSE".to_string()));
                assert!(messages.contains(&"Category is required".to_string()));
            }
            other => panic!("expected validation failure, got {other:?}"),
        }

        let all = ledger.list(&TransactionFilter::default()).await.unwrap();
        assert!(all.is_empty());
    }

    #[tokio::test]
    async fn test_amend_and_remove() {
        let (_db, ledger) = ledger().await;
        let entry = ledger
            .record(room_revenue("2026-02-09", json!(2400)))
            .await
            .unwrap();

        let amended = ledger
            .amend(
                &entry.id,
                serde_json::from_value(json!({ "amount": 2600, "isReconciled": true })).unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(amended.amount, Money::from_baht(2600));
        assert!(amended.is_reconciled);
        assert_eq!(ledger.get(&entry.id).await.unwrap(), amended);

        let bad = ledger
            .amend(
                &entry.id,
                serde_json::from_value(json!({ "amount": 0 })).unwrap(),
            )
            .await;
        assert!(matches!(
            bad,
            Err(DeskError::Rejected(GatewayError::Validation(_)))
        ));

        ledger.remove(&entry.id).await.unwrap();
        assert!(matches!(
            ledger.remove(&entry.id).await,
            Err(DeskError::Rejected(GatewayError::NotFound { .. }))
        ));
    }
}
