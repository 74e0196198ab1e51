//! # Daily Cash Summary
//!
//! The front desk's end-of-day figures: cash in and out from the ledger,
//! deposits currently held, and how full the resort is tonight.

use chrono::NaiveDate;
use serde::Serialize;
use ts_rs::TS;

use crate::money::Money;
use crate::rooms::RoomCatalog;
use crate::types::{Booking, BookingStatus, DepositStatus, Transaction, TransactionType};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct DailySummary {
    #[ts(as = "String")]
    pub date: NaiveDate,
    pub income: Money,
    pub expense: Money,
    /// Income minus expense. May be negative.
    pub net: Money,
    pub transaction_count: usize,
    /// Deposits collected and not yet refunded, across active bookings.
    pub deposits_held: Money,
    pub checked_in: usize,
    /// Catalog rooms occupied on the night of `date`.
    pub occupied_rooms: usize,
    /// `occupied_rooms` over the catalog size, rounded to a whole percent.
    pub occupancy_percent: u32,
}

/// Builds the summary for `date`.
///
/// Transactions dated otherwise are ignored. A booking counts as occupying
/// its room when it is active and `date` is one of its nights.
pub fn daily_summary(
    date: NaiveDate,
    transactions: &[Transaction],
    bookings: &[Booking],
    catalog: &RoomCatalog,
) -> DailySummary {
    let todays: Vec<&Transaction> = transactions.iter().filter(|t| t.date == date).collect();
    let income: Money = todays
        .iter()
        .filter(|t| t.kind == TransactionType::Income)
        .map(|t| t.amount)
        .sum();
    let expense: Money = todays
        .iter()
        .filter(|t| t.kind == TransactionType::Expense)
        .map(|t| t.amount)
        .sum();

    let deposits_held: Money = bookings
        .iter()
        .filter(|b| b.is_active() && b.deposit_status == Some(DepositStatus::Paid))
        .filter_map(|b| b.deposit_amount)
        .sum();

    let checked_in = bookings
        .iter()
        .filter(|b| b.status == BookingStatus::CheckedIn)
        .count();

    let mut occupied: Vec<&str> = bookings
        .iter()
        .filter(|b| b.is_active() && b.stay().covers_night(date))
        .map(|b| b.room_number.as_str())
        .filter(|room| catalog.room_type_for(room).is_some())
        .collect();
    occupied.sort_unstable();
    occupied.dedup();

    let room_count = catalog.room_count();
    let occupancy_percent = if room_count == 0 {
        0
    } else {
        ((occupied.len() as f64 / room_count as f64) * 100.0).round() as u32
    };

    DailySummary {
        date,
        income,
        expense,
        net: income - expense,
        transaction_count: todays.len(),
        deposits_held,
        checked_in,
        occupied_rooms: occupied.len(),
        occupancy_percent,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::categories;
    use chrono::Utc;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn tx(day: &str, kind: TransactionType, baht: i64) -> Transaction {
        let now = Utc::now();
        Transaction {
            id: format!("TX-{day}-{baht}"),
            date: date(day),
            kind,
            category: categories::ROOM_REVENUE.into(),
            amount: Money::from_baht(baht),
            description: String::new(),
            is_reconciled: false,
            pms_reference_id: None,
            image_url: None,
            room: None,
            guest_data: None,
            customer_type: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn booking(room: &str, check_in: &str, check_out: &str, status: BookingStatus) -> Booking {
        let now = Utc::now();
        Booking {
            id: format!("BK-{room}"),
            guest_name: "Guest".into(),
            room_number: room.into(),
            check_in: date(check_in),
            check_out: date(check_out),
            total_amount: Money::from_baht(1600),
            status,
            nights: None,
            price_per_night: None,
            deposit_amount: Some(Money::from_baht(500)),
            deposit_status: Some(DepositStatus::Paid),
            payment_status: None,
            paid_amount: None,
            ota_channel: None,
            confirmation_number: None,
            guest_details: None,
            locked_until: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_cash_totals() {
        let transactions = vec![
            tx("2026-02-18", TransactionType::Income, 1600),
            tx("2026-02-18", TransactionType::Income, 800),
            tx("2026-02-18", TransactionType::Expense, 450),
            tx("2026-02-17", TransactionType::Income, 9999),
        ];
        let summary = daily_summary(date("2026-02-18"), &transactions, &[], &RoomCatalog::default());
        assert_eq!(summary.income, Money::from_baht(2400));
        assert_eq!(summary.expense, Money::from_baht(450));
        assert_eq!(summary.net, Money::from_baht(1950));
        assert_eq!(summary.transaction_count, 3);
    }

    #[test]
    fn test_occupancy_and_deposits() {
        let bookings = vec![
            booking("5", "2026-02-18", "2026-02-20", BookingStatus::CheckedIn),
            booking("6", "2026-02-17", "2026-02-18", BookingStatus::Confirmed),
            booking("7", "2026-02-18", "2026-02-19", BookingStatus::Cancelled),
            booking("8", "2026-02-16", "2026-02-21", BookingStatus::Confirmed),
        ];
        let summary = daily_summary(date("2026-02-18"), &[], &bookings, &RoomCatalog::default());
        // Rooms 5 and 8 are occupied; 6 checked out this morning.
        assert_eq!(summary.occupied_rooms, 2);
        assert_eq!(summary.occupancy_percent, 13);
        assert_eq!(summary.checked_in, 1);
        assert_eq!(summary.deposits_held, Money::from_baht(1500));
    }
}
