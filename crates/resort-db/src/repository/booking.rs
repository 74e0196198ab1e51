//! # Booking Repository
//!
//! Reads bookings, and the connection-level writes the gateway runs inside
//! its transactions.
//!
//! ## Why Connection-Level Writes?
//! Inserts and updates must happen on the same connection as the
//! availability re-read, inside one transaction. The `*_on` functions take
//! a `&mut SqliteConnection`, so `&mut *tx` works. Nothing outside this
//! crate can write a booking without going through [`BookingGateway`].
//!
//! [`BookingGateway`]: crate::gateway::BookingGateway

use chrono::{DateTime, NaiveDate, Utc};
use resort_core::{Booking, BookingStatus, DepositStatus, GuestData, Money, PaymentStatus};
use sqlx::{QueryBuilder, Sqlite, SqliteConnection, SqlitePool};
use tracing::debug;

use crate::error::{DbError, DbResult};

/// Maximum bookings returned by a list call.
pub const MAX_BOOKING_LIST: u32 = 1000;

const BOOKING_COLUMNS: &str = "id, guest_name, room_number, check_in, check_out, total_amount, \
     status, nights, price_per_night, deposit_amount, deposit_status, payment_status, \
     paid_amount, ota_channel, confirmation_number, guest_details, locked_until, \
     created_at, updated_at";

// =============================================================================
// Row Mapping
// =============================================================================

#[derive(Debug, sqlx::FromRow)]
struct BookingRow {
    id: String,
    guest_name: String,
    room_number: String,
    check_in: NaiveDate,
    check_out: NaiveDate,
    total_amount: i64,
    status: BookingStatus,
    nights: Option<i64>,
    price_per_night: Option<i64>,
    deposit_amount: Option<i64>,
    deposit_status: Option<DepositStatus>,
    payment_status: Option<PaymentStatus>,
    paid_amount: Option<i64>,
    ota_channel: Option<String>,
    confirmation_number: Option<String>,
    guest_details: Option<String>,
    locked_until: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<BookingRow> for Booking {
    type Error = DbError;

    fn try_from(row: BookingRow) -> DbResult<Self> {
        let guest_details = row
            .guest_details
            .map(|json| serde_json::from_str::<GuestData>(&json))
            .transpose()
            .map_err(|e| DbError::corrupt("guest_details", e))?;

        Ok(Booking {
            id: row.id,
            guest_name: row.guest_name,
            room_number: row.room_number,
            check_in: row.check_in,
            check_out: row.check_out,
            total_amount: Money::from_satang(row.total_amount),
            status: row.status,
            nights: row.nights.and_then(|n| u32::try_from(n).ok()),
            price_per_night: row.price_per_night.map(Money::from_satang),
            deposit_amount: row.deposit_amount.map(Money::from_satang),
            deposit_status: row.deposit_status,
            payment_status: row.payment_status,
            paid_amount: row.paid_amount.map(Money::from_satang),
            ota_channel: row.ota_channel,
            confirmation_number: row.confirmation_number,
            guest_details,
            locked_until: row.locked_until,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

fn into_bookings(rows: Vec<BookingRow>) -> DbResult<Vec<Booking>> {
    rows.into_iter().map(Booking::try_from).collect()
}

fn guest_details_json(booking: &Booking) -> DbResult<Option<String>> {
    booking
        .guest_details
        .as_ref()
        .map(serde_json::to_string)
        .transpose()
        .map_err(|e| DbError::Internal(e.to_string()))
}

// =============================================================================
// Connection-Level Operations
// =============================================================================

pub(crate) async fn fetch_on(conn: &mut SqliteConnection, id: &str) -> DbResult<Option<Booking>> {
    let sql = format!("SELECT {BOOKING_COLUMNS} FROM bookings WHERE id = ?1");
    let row: Option<BookingRow> = sqlx::query_as(&sql).bind(id).fetch_optional(&mut *conn).await?;
    row.map(Booking::try_from).transpose()
}

/// Every booking of one room, oldest stay first.
pub(crate) async fn fetch_room_on(
    conn: &mut SqliteConnection,
    room_number: &str,
) -> DbResult<Vec<Booking>> {
    let sql = format!(
        "SELECT {BOOKING_COLUMNS} FROM bookings WHERE room_number = ?1 ORDER BY check_in ASC"
    );
    let rows: Vec<BookingRow> = sqlx::query_as(&sql)
        .bind(room_number)
        .fetch_all(&mut *conn)
        .await?;
    into_bookings(rows)
}

pub(crate) async fn insert_on(conn: &mut SqliteConnection, booking: &Booking) -> DbResult<()> {
    debug!(id = %booking.id, room = %booking.room_number, "Inserting booking");

    sqlx::query(
        r#"
        INSERT INTO bookings (
            id, guest_name, room_number, check_in, check_out, total_amount,
            status, nights, price_per_night, deposit_amount, deposit_status,
            payment_status, paid_amount, ota_channel, confirmation_number,
            guest_details, locked_until, created_at, updated_at
        ) VALUES (
            ?1, ?2, ?3, ?4, ?5, ?6,
            ?7, ?8, ?9, ?10, ?11,
            ?12, ?13, ?14, ?15,
            ?16, ?17, ?18, ?19
        )
        "#,
    )
    .bind(&booking.id)
    .bind(&booking.guest_name)
    .bind(&booking.room_number)
    .bind(booking.check_in)
    .bind(booking.check_out)
    .bind(booking.total_amount.satang())
    .bind(booking.status)
    .bind(booking.nights.map(i64::from))
    .bind(booking.price_per_night.map(|m| m.satang()))
    .bind(booking.deposit_amount.map(|m| m.satang()))
    .bind(booking.deposit_status)
    .bind(booking.payment_status)
    .bind(booking.paid_amount.map(|m| m.satang()))
    .bind(&booking.ota_channel)
    .bind(&booking.confirmation_number)
    .bind(guest_details_json(booking)?)
    .bind(booking.locked_until)
    .bind(booking.created_at)
    .bind(booking.updated_at)
    .execute(&mut *conn)
    .await?;

    Ok(())
}

/// Overwrites every mutable column. `id` and `created_at` never change.
pub(crate) async fn update_on(conn: &mut SqliteConnection, booking: &Booking) -> DbResult<()> {
    debug!(id = %booking.id, status = %booking.status, "Updating booking");

    let result = sqlx::query(
        r#"
        UPDATE bookings SET
            guest_name = ?2,
            room_number = ?3,
            check_in = ?4,
            check_out = ?5,
            total_amount = ?6,
            status = ?7,
            nights = ?8,
            price_per_night = ?9,
            deposit_amount = ?10,
            deposit_status = ?11,
            payment_status = ?12,
            paid_amount = ?13,
            ota_channel = ?14,
            confirmation_number = ?15,
            guest_details = ?16,
            locked_until = ?17,
            updated_at = ?18
        WHERE id = ?1
        "#,
    )
    .bind(&booking.id)
    .bind(&booking.guest_name)
    .bind(&booking.room_number)
    .bind(booking.check_in)
    .bind(booking.check_out)
    .bind(booking.total_amount.satang())
    .bind(booking.status)
    .bind(booking.nights.map(i64::from))
    .bind(booking.price_per_night.map(|m| m.satang()))
    .bind(booking.deposit_amount.map(|m| m.satang()))
    .bind(booking.deposit_status)
    .bind(booking.payment_status)
    .bind(booking.paid_amount.map(|m| m.satang()))
    .bind(&booking.ota_channel)
    .bind(&booking.confirmation_number)
    .bind(guest_details_json(booking)?)
    .bind(booking.locked_until)
    .bind(booking.updated_at)
    .execute(&mut *conn)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::not_found("Booking", &booking.id));
    }
    Ok(())
}

/// Returns whether a row was removed.
pub(crate) async fn delete_on(conn: &mut SqliteConnection, id: &str) -> DbResult<bool> {
    debug!(id = %id, "Deleting booking");
    let result = sqlx::query("DELETE FROM bookings WHERE id = ?1")
        .bind(id)
        .execute(&mut *conn)
        .await?;
    Ok(result.rows_affected() > 0)
}

// =============================================================================
// Repository
// =============================================================================

/// Filters for listing bookings. Dates bound the check-in day, inclusive.
#[derive(Debug, Clone, Default)]
pub struct BookingFilter {
    pub status: Option<BookingStatus>,
    pub room_number: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    /// Defaults to, and is capped at, [`MAX_BOOKING_LIST`].
    pub limit: Option<u32>,
}

/// Repository for booking reads.
#[derive(Debug, Clone)]
pub struct BookingRepository {
    pool: SqlitePool,
}

impl BookingRepository {
    /// Creates a new BookingRepository.
    pub fn new(pool: SqlitePool) -> Self {
        BookingRepository { pool }
    }

    /// Gets a booking by its ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Booking>> {
        let mut conn = self.pool.acquire().await?;
        fetch_on(&mut conn, id).await
    }

    /// Every booking of one room, in stay order.
    pub async fn for_room(&self, room_number: &str) -> DbResult<Vec<Booking>> {
        let mut conn = self.pool.acquire().await?;
        fetch_room_on(&mut conn, room_number).await
    }

    /// Every booking still holding its room, in stay order.
    pub async fn active(&self) -> DbResult<Vec<Booking>> {
        let sql = format!(
            "SELECT {BOOKING_COLUMNS} FROM bookings \
             WHERE status NOT IN ('cancelled', 'checked_out') \
             ORDER BY check_in ASC, room_number ASC"
        );
        let rows: Vec<BookingRow> = sqlx::query_as(&sql).fetch_all(&self.pool).await?;
        into_bookings(rows)
    }

    /// Lists bookings, newest check-in first.
    ///
    /// ## Example
    /// ```rust,ignore
    /// let filter = BookingFilter { room_number: Some("5".into()), ..Default::default() };
    /// let bookings = db.bookings().list(&filter).await?;
    /// ```
    pub async fn list(&self, filter: &BookingFilter) -> DbResult<Vec<Booking>> {
        let limit = filter
            .limit
            .unwrap_or(MAX_BOOKING_LIST)
            .min(MAX_BOOKING_LIST);

        debug!(?filter, limit, "Listing bookings");

        let mut query: QueryBuilder<Sqlite> =
            QueryBuilder::new(format!("SELECT {BOOKING_COLUMNS} FROM bookings WHERE 1 = 1"));
        if let Some(status) = filter.status {
            query.push(" AND status = ").push_bind(status);
        }
        if let Some(room_number) = &filter.room_number {
            query.push(" AND room_number = ").push_bind(room_number.clone());
        }
        if let Some(start) = filter.start_date {
            query.push(" AND check_in >= ").push_bind(start);
        }
        if let Some(end) = filter.end_date {
            query.push(" AND check_in <= ").push_bind(end);
        }
        query
            .push(" ORDER BY check_in DESC, created_at DESC LIMIT ")
            .push_bind(i64::from(limit));

        let rows: Vec<BookingRow> = query.build_query_as::<BookingRow>().fetch_all(&self.pool).await?;
        into_bookings(rows)
    }

    /// Counts all bookings.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM bookings")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}

/// Generates a new booking ID.
pub fn generate_booking_id() -> String {
    uuid::Uuid::new_v4().to_string()
}
