//! # Room Catalog
//!
//! The resort's room types, which rooms belong to each, and nightly rates.
//!
//! ```text
//! ┌──────────────────────────┬────────┬──────────────────────────────┐
//! │ Type                     │ Rate   │ Rooms                        │
//! ├──────────────────────────┼────────┼──────────────────────────────┤
//! │ Deluxe Double Room (A)   │   800  │ 1 2 3 5 6 7 8 9              │
//! │ Deluxe Double Room (B)   │   750  │ 13                           │
//! │ Deluxe Double Room (C)   │   850  │ 14                           │
//! │ Deluxe Triple Room (A)   │  1200  │ 4                            │
//! │ Deluxe Triple Room (B)   │  1200  │ 10 11 12                     │
//! │ Deluxe Twin Room         │   950  │ 15                           │
//! └──────────────────────────┴────────┴──────────────────────────────┘
//!   + 300 THB per extra guest per night
//! ```

use serde::Serialize;
use ts_rs::TS;

use crate::availability::StayRange;
use crate::money::Money;

/// Surcharge per extra guest per night.
pub const EXTRA_GUEST_PRICE: Money = Money::from_baht(300);

const STANDARD_AMENITIES: &[&str] = &[
    "ทีวี",
    "ตู้เย็น",
    "ผ้าเช็ดตัว",
    "ไดร์เป่าผม",
    "กาต้มน้ำ",
    "เครื่องทำน้ำอุ่น",
    "เครื่องปรับอากาศ",
    "ผ้าห่ม",
    "WIFI",
];

/// A sellable room type.
#[derive(Debug, Clone, PartialEq, Serialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct RoomType {
    pub name: String,
    pub price_per_night: Money,
    pub rooms: Vec<String>,
    pub bed_info: String,
    pub amenities: Vec<String>,
}

impl RoomType {
    fn new(name: &str, baht: i64, rooms: &[&str], bed_info: &str) -> Self {
        RoomType {
            name: name.to_string(),
            price_per_night: Money::from_baht(baht),
            rooms: rooms.iter().map(|r| r.to_string()).collect(),
            bed_info: bed_info.to_string(),
            amenities: STANDARD_AMENITIES.iter().map(|a| a.to_string()).collect(),
        }
    }
}

/// Price breakdown for a stay in one room.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct RoomQuote {
    pub room_number: String,
    pub room_type: String,
    pub nights: i64,
    pub price_per_night: Money,
    pub extra_guests: u32,
    pub base_amount: Money,
    pub extra_guest_amount: Money,
    pub total_amount: Money,
}

/// All room types of the resort.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomCatalog {
    pub room_types: Vec<RoomType>,
    pub extra_guest_price: Money,
}

impl Default for RoomCatalog {
    fn default() -> Self {
        RoomCatalog {
            room_types: vec![
                RoomType::new(
                    "Deluxe Double Room (A)",
                    800,
                    &["1", "2", "3", "5", "6", "7", "8", "9"],
                    "เตียง 5 ฟุต + โซฟาตัว L",
                ),
                RoomType::new(
                    "Deluxe Double Room (B)",
                    750,
                    &["13"],
                    "เตียง 5 ฟุต + โต๊ะชุด",
                ),
                RoomType::new(
                    "Deluxe Double Room (C)",
                    850,
                    &["14"],
                    "เตียง 6 ฟุต King Bed + โซฟาสั้น",
                ),
                RoomType::new(
                    "Deluxe Triple Room (A)",
                    1200,
                    &["4"],
                    "เตียง 5 ฟุต กับ 3.5 ฟุต + โซฟาสั้น + ชุดโต๊ะ",
                ),
                RoomType::new(
                    "Deluxe Triple Room (B)",
                    1200,
                    &["10", "11", "12"],
                    "เตียง 5 ฟุตกับ 3.5 ฟุต + โซฟาตัว L",
                ),
                RoomType::new(
                    "Deluxe Twin Room",
                    950,
                    &["15"],
                    "เตียง 3.5 ฟุตกับ 3.5 ฟุต + ชุดโต๊ะ",
                ),
            ],
            extra_guest_price: EXTRA_GUEST_PRICE,
        }
    }
}

impl RoomCatalog {
    pub fn room_type_for(&self, room_number: &str) -> Option<&RoomType> {
        self.room_types
            .iter()
            .find(|room_type| room_type.rooms.iter().any(|r| r == room_number))
    }

    /// Every room number, in catalog order.
    pub fn rooms(&self) -> impl Iterator<Item = &str> {
        self.room_types
            .iter()
            .flat_map(|room_type| room_type.rooms.iter().map(String::as_str))
    }

    pub fn room_count(&self) -> usize {
        self.room_types.iter().map(|t| t.rooms.len()).sum()
    }

    /// Billable nights: never fewer than one.
    pub fn nights(stay: &StayRange) -> i64 {
        stay.nights().max(1)
    }

    /// Full price breakdown, or `None` for a room outside the catalog.
    pub fn breakdown(
        &self,
        room_number: &str,
        stay: &StayRange,
        extra_guests: u32,
    ) -> Option<RoomQuote> {
        let room_type = self.room_type_for(room_number)?;
        let nights = Self::nights(stay);
        let base_amount = room_type.price_per_night * nights;
        let extra_guest_amount = self.extra_guest_price * (i64::from(extra_guests) * nights);
        Some(RoomQuote {
            room_number: room_number.to_string(),
            room_type: room_type.name.clone(),
            nights,
            price_per_night: room_type.price_per_night,
            extra_guests,
            base_amount,
            extra_guest_amount,
            total_amount: base_amount + extra_guest_amount,
        })
    }

    /// Total price of a stay.
    pub fn quote(&self, room_number: &str, stay: &StayRange, extra_guests: u32) -> Option<Money> {
        self.breakdown(room_number, stay, extra_guests)
            .map(|q| q.total_amount)
    }
}
