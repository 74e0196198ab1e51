//! # Demo Data Seeder
//!
//! Fills a database with a week of bookings and ledger entries, so the
//! front desk UI has something to show.
//!
//! ## Usage
//! ```bash
//! # Seed ./desk_dev.db, starting tomorrow
//! cargo run -p resort-db --bin seed
//!
//! # Seed another file
//! cargo run -p resort-db --bin seed -- --db ./data/desk.db
//! ```
//!
//! Every booking goes through the gateway, so seeded data obeys the same
//! validation and overlap rules as real traffic. Running it twice against
//! the same file is refused.

use std::env;
use std::sync::Arc;

use chrono::Days;
use resort_core::types::categories;
use resort_core::{BookingDraft, Clock, TransactionDraft};
use resort_db::{Database, DbConfig, DeskError, SystemClock};
use serde_json::json;

/// (guest, room, nights from tomorrow, length, OTA channel)
const GUESTS: &[(&str, &str, u64, u64, Option<&str>)] = &[
    ("Somchai Jaidee", "5", 0, 3, None),
    ("Anong Srisuk", "5", 3, 2, Some("Agoda")),
    ("Pranee Wongsa", "1", 0, 1, Some("Booking.com")),
    ("Kittisak Boonmee", "4", 1, 4, None),
    ("Malee Chaiyaporn", "10", 2, 2, Some("Agoda")),
    ("Wichai Thongdee", "13", 0, 5, None),
    ("Siriporn Kaewmanee", "15", 4, 2, Some("Booking.com")),
    // Lands on Somchai's second night; the gateway refuses it
    ("Narong Petcharat", "5", 1, 1, None),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();

    let mut db_path = String::from("./desk_dev.db");
    let mut offset_minutes: i32 = 420;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--utc-offset" => {
                if i + 1 < args.len() {
                    offset_minutes = args[i + 1].parse().unwrap_or(420);
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Resort Front Desk Demo Seeder");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>          Database file path (default: ./desk_dev.db)");
                println!("      --utc-offset <MIN>   Resort UTC offset in minutes (default: 420)");
                println!("  -h, --help               Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("Resort Front Desk Demo Seeder");
    println!("=============================");
    println!("Database: {}", db_path);
    println!();

    let db = Database::new(DbConfig::new(&db_path)).await?;
    println!("✓ Connected, migrations applied");

    let existing = db.bookings().count().await?;
    if existing > 0 {
        println!("⚠ Database already has {} bookings", existing);
        println!("  Skipping seed. Delete the database file to regenerate.");
        return Ok(());
    }

    let clock: Arc<dyn Clock> = Arc::new(SystemClock::from_offset_minutes(offset_minutes));
    let gateway = db.gateway(clock.clone());
    let ledger = db.ledger(clock.clone());
    let tomorrow = clock.today() + Days::new(1);

    println!();
    println!("Creating bookings...");

    let mut created = Vec::new();
    for &(guest, room, start, nights, channel) in GUESTS {
        let check_in = tomorrow + Days::new(start);
        let check_out = check_in + Days::new(nights);
        let draft: BookingDraft = serde_json::from_value(json!({
            "guestName": guest,
            "roomNumber": room,
            "checkIn": check_in.to_string(),
            "checkOut": check_out.to_string(),
            "otaChannel": channel,
        }))?;

        match gateway.create(draft).await {
            Ok(booking) => {
                println!(
                    "  ✓ Room {:>2}  {} → {}  {}  ({})",
                    booking.room_number,
                    booking.check_in,
                    booking.check_out,
                    booking.guest_name,
                    booking.total_amount
                );
                created.push(booking);
            }
            Err(DeskError::Rejected(rejection)) => {
                println!("  ✗ {} in room {}: {}", guest, room, rejection);
            }
            Err(DeskError::Store(err)) => return Err(err.into()),
        }
    }

    println!();
    println!("Recording ledger entries...");

    let today = clock.today().to_string();
    for booking in created.iter().filter(|b| b.ota_channel.is_none()) {
        let deposit = booking.total_amount.baht() / 2;
        let draft: TransactionDraft = serde_json::from_value(json!({
            "date": today,
            "type": "INCOME",
            "category": categories::DEPOSIT,
            "amount": deposit,
            "description": format!("Deposit, room {} ({})", booking.room_number, booking.guest_name),
            "room": booking.room_number,
            "pmsReferenceId": booking.id,
        }))?;
        ledger.record(draft).await?;
    }

    let utilities: TransactionDraft = serde_json::from_value(json!({
        "date": today,
        "type": "EXPENSE",
        "category": categories::UTILITIES,
        "amount": "3450.75",
        "description": "Electricity, previous month",
    }))?;
    ledger.record(utilities).await?;

    println!();
    println!(
        "✓ Seed complete: {} bookings, {} notifications queued",
        db.bookings().count().await?,
        db.outbox().count_pending().await?
    );

    Ok(())
}
