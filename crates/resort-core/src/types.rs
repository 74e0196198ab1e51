//! # Domain Types
//!
//! Core domain types used throughout the resort front desk.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Booking      │   │  Transaction    │   │   GuestData     │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (UUID)      │   │  id (UUID)      │   │  idNumber       │       │
//! │  │  room_number    │   │  date           │   │  Thai/EN names  │       │
//! │  │  check_in/out   │   │  type, category │   │  (no lifecycle) │       │
//! │  │  total_amount   │   │  amount         │   └─────────────────┘       │
//! │  │  status         │   └─────────────────┘                             │
//! │  └─────────────────┘                                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │ BookingStatus   │   │ DepositStatus   │   │ TransactionType │       │
//! │  │  ─────────────  │   │ PaymentStatus   │   │  ─────────────  │       │
//! │  │  Confirmed ...  │   │ CustomerType    │   │  INCOME/EXPENSE │       │
//! │  │  is_active()    │   └─────────────────┘   └─────────────────┘       │
//! │  └─────────────────┘                                                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Wire Casing
//! Every struct here serializes camelCase because the front desk UI and the
//! OTA import pipeline already speak that shape. Stay dates are calendar
//! dates (`2026-02-18`) with no time of day.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use ts_rs::TS;

use crate::availability::StayRange;
use crate::error::ValidationError;
use crate::money::Money;

// =============================================================================
// Booking Status
// =============================================================================

/// Lifecycle state of a booking.
///
/// ```text
///   pending ──► confirmed ──► checked_in ──► checked_out
///      │            │
///      ▼            ▼
///   locked      cancelled
/// ```
/// Only `cancelled` and `checked_out` release the room.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum BookingStatus {
    Confirmed,
    CheckedIn,
    CheckedOut,
    Pending,
    /// Held by the UI while a guest finishes paying.
    Locked,
    Cancelled,
}

impl BookingStatus {
    /// Every status, in the order they are listed to users.
    pub const ALL: [BookingStatus; 6] = [
        BookingStatus::Confirmed,
        BookingStatus::CheckedIn,
        BookingStatus::CheckedOut,
        BookingStatus::Pending,
        BookingStatus::Locked,
        BookingStatus::Cancelled,
    ];

    /// Wire names matching `ALL`.
    pub const NAMES: &'static [&'static str] = &[
        "confirmed",
        "checked_in",
        "checked_out",
        "pending",
        "locked",
        "cancelled",
    ];

    pub const fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Confirmed => "confirmed",
            BookingStatus::CheckedIn => "checked_in",
            BookingStatus::CheckedOut => "checked_out",
            BookingStatus::Pending => "pending",
            BookingStatus::Locked => "locked",
            BookingStatus::Cancelled => "cancelled",
        }
    }

    /// Whether a booking in this state still occupies its room.
    pub const fn is_active(&self) -> bool {
        match self {
            BookingStatus::Confirmed
            | BookingStatus::CheckedIn
            | BookingStatus::Pending
            | BookingStatus::Locked => true,
            BookingStatus::CheckedOut | BookingStatus::Cancelled => false,
        }
    }
}

impl Default for BookingStatus {
    fn default() -> Self {
        BookingStatus::Confirmed
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Exact, case-sensitive match on the wire name.
impl FromStr for BookingStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BookingStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or(ValidationError::NotAllowed {
                field: "status",
                allowed: BookingStatus::NAMES,
            })
    }
}

// =============================================================================
// Deposit / Payment Status
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum DepositStatus {
    Unpaid,
    Paid,
    Refunded,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Unpaid,
    Paid,
    /// Only the deposit has been collected.
    Deposit,
}

// =============================================================================
// Customer Type
// =============================================================================

/// How the guest reached the front desk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[ts(export)]
pub enum CustomerType {
    #[serde(rename = "Walk-in")]
    #[cfg_attr(feature = "sqlx", sqlx(rename = "Walk-in"))]
    WalkIn,
    #[serde(rename = "Booking")]
    #[cfg_attr(feature = "sqlx", sqlx(rename = "Booking"))]
    Booking,
    #[serde(rename = "Check-in")]
    #[cfg_attr(feature = "sqlx", sqlx(rename = "Check-in"))]
    CheckIn,
}

// =============================================================================
// Guest Data
// =============================================================================

/// Identity details captured from an ID card or passport.
///
/// Stored as embedded JSON on the booking or transaction. Never validated.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase", default)]
pub struct GuestData {
    pub id_number: String,
    pub title: String,
    #[serde(rename = "firstNameTH")]
    pub first_name_th: String,
    #[serde(rename = "lastNameTH")]
    pub last_name_th: String,
    #[serde(rename = "firstNameEN")]
    pub first_name_en: String,
    #[serde(rename = "lastNameEN")]
    pub last_name_en: String,
    pub address: String,
    pub dob: String,
    pub issue_date: String,
    pub expiry_date: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub religion: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nationality: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub occupation: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_type: Option<CustomerType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

// =============================================================================
// Booking
// =============================================================================

/// A reservation of one room for a date range.
///
/// ## Invariants
/// - `check_out > check_in`
/// - `0 <= total_amount <= 1,000,000 THB`
/// - Active bookings of the same room never overlap
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    /// Unique identifier (UUID v4). Immutable.
    pub id: String,

    pub guest_name: String,

    /// Room identifier as printed on the door ("1", "13").
    pub room_number: String,

    /// First night of the stay.
    #[ts(as = "String")]
    pub check_in: NaiveDate,

    /// Departure day. The room is free again on this date.
    #[ts(as = "String")]
    pub check_out: NaiveDate,

    pub total_amount: Money,

    pub status: BookingStatus,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nights: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price_per_night: Option<Money>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deposit_amount: Option<Money>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deposit_status: Option<DepositStatus>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_status: Option<PaymentStatus>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paid_amount: Option<Money>,

    /// Channel the booking came from (Agoda, Booking.com, ...).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ota_channel: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confirmation_number: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guest_details: Option<GuestData>,

    /// Hold expiry for `locked` bookings.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(as = "Option<String>")]
    pub locked_until: Option<DateTime<Utc>>,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,

    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Booking {
    /// The occupied range `[check_in, check_out)`.
    #[inline]
    pub fn stay(&self) -> StayRange {
        StayRange::new(self.check_in, self.check_out)
    }

    #[inline]
    pub fn is_active(&self) -> bool {
        self.status.is_active()
    }
}

// =============================================================================
// Transaction
// =============================================================================

/// Direction of a ledger entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "UPPERCASE"))]
#[ts(export)]
#[serde(rename_all = "UPPERCASE")]
pub enum TransactionType {
    Income,
    Expense,
}

impl TransactionType {
    pub const fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Income => "INCOME",
            TransactionType::Expense => "EXPENSE",
        }
    }
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransactionType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "INCOME" => Ok(TransactionType::Income),
            "EXPENSE" => Ok(TransactionType::Expense),
            _ => Err(ValidationError::InvalidTransactionType),
        }
    }
}

/// A financial record in the resort ledger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: String,

    #[ts(as = "String")]
    pub date: NaiveDate,

    #[serde(rename = "type")]
    pub kind: TransactionType,

    /// One of the `categories` labels, or free text.
    pub category: String,

    /// Always positive; the direction comes from `kind`.
    pub amount: Money,

    pub description: String,

    pub is_reconciled: bool,

    /// Booking this entry settles, when it came from the PMS.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pms_reference_id: Option<String>,

    /// Receipt or slip photo.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub room: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guest_data: Option<GuestData>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer_type: Option<CustomerType>,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,

    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Transaction {
    /// Amount with sign: income positive, expense negative.
    pub fn signed_amount(&self) -> Money {
        match self.kind {
            TransactionType::Income => self.amount,
            TransactionType::Expense => Money::zero() - self.amount,
        }
    }
}

/// Standard ledger category labels used by the resort.
pub mod categories {
    // Income
    pub const ROOM_REVENUE: &str = "ค่าห้องพัก";
    pub const DEPOSIT: &str = "มัดจำ";
    pub const FOOD_AND_BEVERAGE: &str = "อาหารและเครื่องดื่ม";
    pub const OTHER_INCOME: &str = "รายได้อื่นๆ";

    // Expense
    pub const UTILITIES: &str = "ค่าน้ำค่าไฟ";
    pub const SALARY: &str = "เงินเดือนพนักงาน";
    pub const MAINTENANCE: &str = "ซ่อมบำรุง";
    pub const SUPPLIES: &str = "วัสดุสิ้นเปลือง";
    pub const COMMISSION: &str = "ค่าคอมมิชชั่น OTA";
    pub const OTHER_EXPENSE: &str = "ค่าใช้จ่ายอื่นๆ";

    pub const INCOME: &[&str] = &[ROOM_REVENUE, DEPOSIT, FOOD_AND_BEVERAGE, OTHER_INCOME];
    pub const EXPENSE: &[&str] = &[
        UTILITIES,
        SALARY,
        MAINTENANCE,
        SUPPLIES,
        COMMISSION,
        OTHER_EXPENSE,
    ];
}

// =============================================================================
// Unit Tests
// =============================================================================
