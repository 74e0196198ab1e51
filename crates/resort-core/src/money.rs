//! # Money Module
//!
//! Provides the `Money` type for handling baht amounts safely.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │    0.1 + 0.2 = 0.30000000000000004  ❌                                   │
//! │                                                                         │
//! │  OUR SOLUTION: Integer Satang (1 THB = 100 satang)                      │
//! │    Storage, sums and comparisons all use i64 satang.                    │
//! │    Floats only appear at the JSON boundary, where the front desk        │
//! │    UI and OTA imports send plain numbers like `1600` or `1600.5`.       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Wire Format
//! `Money` serializes as a baht number (`1600.5`), and deserializes from a
//! number or a numeric string. The database stores `satang()`.
//!
//! ## Usage
//! ```rust
//! use resort_core::money::Money;
//!
//! let nightly = Money::from_baht(800);
//! let stay = nightly * 2;
//! assert_eq!(stay.satang(), 160_000);
//! assert_eq!(stay.to_string(), "฿1600.00");
//! ```

use serde::de::{self, Deserializer, Visitor};
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Sub, SubAssign};
use ts_rs::TS;

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in satang (the smallest THB unit).
///
/// ## Design Decisions
/// - **i64 (signed)**: refunds and net figures can be negative
/// - **Single field tuple struct**: zero-cost abstraction over i64
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, TS)]
#[ts(export)]
pub struct Money(#[ts(type = "number")] i64);

impl Money {
    /// Creates a Money value from satang.
    #[inline]
    pub const fn from_satang(satang: i64) -> Self {
        Money(satang)
    }

    /// Creates a Money value from whole baht.
    ///
    /// ## Example
    /// ```rust
    /// use resort_core::money::Money;
    ///
    /// assert_eq!(Money::from_baht(750).satang(), 75_000);
    /// ```
    #[inline]
    pub const fn from_baht(baht: i64) -> Self {
        Money(baht * 100)
    }

    /// Converts a baht figure received over the wire.
    ///
    /// Returns `None` for NaN, infinities and values outside the i64 satang
    /// range. Rounds half away from zero to the nearest satang.
    pub fn from_baht_f64(baht: f64) -> Option<Self> {
        if !baht.is_finite() {
            return None;
        }
        let satang = (baht * 100.0).round();
        if satang < i64::MIN as f64 || satang > i64::MAX as f64 {
            return None;
        }
        Some(Money(satang as i64))
    }

    /// Parses a numeric string such as `"1600"`, `" 1,600.50 "` or `"-20"`.
    ///
    /// Thousands separators are accepted. Empty or non-numeric text
    /// returns `None`.
    ///
    /// ## Example
    /// ```rust
    /// use resort_core::money::Money;
    ///
    /// assert_eq!(Money::parse_baht("1,600.5"), Some(Money::from_satang(160_050)));
    /// assert_eq!(Money::parse_baht("abc"), None);
    /// assert_eq!(Money::parse_baht(""), None);
    /// ```
    pub fn parse_baht(text: &str) -> Option<Self> {
        Money::from_baht_f64(parse_baht_number(text)?)
    }

    /// Returns the value in satang.
    #[inline]
    pub const fn satang(&self) -> i64 {
        self.0
    }

    /// Returns the whole baht portion.
    #[inline]
    pub const fn baht(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the satang portion (always 0-99).
    #[inline]
    pub const fn satang_part(&self) -> i64 {
        (self.0 % 100).abs()
    }

    /// Returns the amount as a baht float, for JSON output and for comparing
    /// against figures that were never converted to satang.
    #[inline]
    pub fn as_baht_f64(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }
}

/// Reads a finite baht figure from text, accepting thousands separators.
pub(crate) fn parse_baht_number(text: &str) -> Option<f64> {
    let cleaned: String = text.trim().chars().filter(|c| *c != ',').collect();
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse::<f64>().ok().filter(|value| value.is_finite())
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Display is for logs and debugging; the UI formats with locale rules.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{}฿{}.{:02}", sign, self.baht().abs(), self.satang_part())
    }
}

impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0 + other.0)
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0 - other.0)
    }
}

impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 -= other.0;
    }
}

impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i64) -> Self {
        Money(self.0 * qty)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), |acc, m| acc + m)
    }
}

impl<'a> Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), |acc, m| acc + *m)
    }
}

// =============================================================================
// Serde (baht numbers on the wire)
// =============================================================================

impl Serialize for Money {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if self.0 % 100 == 0 {
            serializer.serialize_i64(self.baht())
        } else {
            serializer.serialize_f64(self.as_baht_f64())
        }
    }
}

impl<'de> Deserialize<'de> for Money {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct MoneyVisitor;

        impl<'de> Visitor<'de> for MoneyVisitor {
            type Value = Money;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a baht amount as a number or numeric string")
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<Money, E> {
                v.checked_mul(100)
                    .map(Money::from_satang)
                    .ok_or_else(|| E::custom("amount out of range"))
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<Money, E> {
                i64::try_from(v)
                    .ok()
                    .and_then(|v| v.checked_mul(100))
                    .map(Money::from_satang)
                    .ok_or_else(|| E::custom("amount out of range"))
            }

            fn visit_f64<E: de::Error>(self, v: f64) -> Result<Money, E> {
                Money::from_baht_f64(v).ok_or_else(|| E::custom("amount is not a finite number"))
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<Money, E> {
                Money::parse_baht(v).ok_or_else(|| E::custom("amount is not numeric"))
            }
        }

        deserializer.deserialize_any(MoneyVisitor)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_satang_and_baht() {
        let money = Money::from_satang(160_050);
        assert_eq!(money.baht(), 1600);
        assert_eq!(money.satang_part(), 50);
        assert_eq!(Money::from_baht(800).satang(), 80_000);
    }

    #[test]
    fn test_display() {
        assert_eq!(Money::from_satang(160_050).to_string(), "฿1600.50");
        assert_eq!(Money::from_satang(-550).to_string(), "-฿5.50");
        assert_eq!(Money::zero().to_string(), "฿0.00");
    }

    #[test]
    fn test_from_baht_f64_rejects_non_finite() {
        assert_eq!(Money::from_baht_f64(1600.5), Some(Money::from_satang(160_050)));
        assert_eq!(Money::from_baht_f64(f64::NAN), None);
        assert_eq!(Money::from_baht_f64(f64::INFINITY), None);
        assert_eq!(Money::from_baht_f64(1e30), None);
    }

    #[test]
    fn test_parse_baht() {
        assert_eq!(Money::parse_baht("1600"), Some(Money::from_baht(1600)));
        assert_eq!(Money::parse_baht(" 1,600.25 "), Some(Money::from_satang(160_025)));
        assert_eq!(Money::parse_baht("-20"), Some(Money::from_baht(-20)));
        assert_eq!(Money::parse_baht("twelve"), None);
        assert_eq!(Money::parse_baht("   "), None);
        assert_eq!(Money::parse_baht("inf"), None);
        assert_eq!(parse_baht_number("1e20"), Some(1e20));
    }

    #[test]
    fn test_arithmetic_and_sum() {
        let a = Money::from_baht(10);
        let b = Money::from_baht(5);
        assert_eq!((a + b).satang(), 1500);
        assert_eq!((a - b).satang(), 500);
        assert_eq!((a * 3).satang(), 3000);

        let total: Money = vec![a, b, b].into_iter().sum();
        assert_eq!(total, Money::from_baht(20));
    }

    #[test]
    fn test_serde_wire_format() {
        assert_eq!(serde_json::to_string(&Money::from_baht(1600)).unwrap(), "1600");
        assert_eq!(serde_json::to_string(&Money::from_satang(160_050)).unwrap(), "1600.5");

        let from_number: Money = serde_json::from_str("1600.5").unwrap();
        assert_eq!(from_number.satang(), 160_050);
        let from_text: Money = serde_json::from_str("\"750\"").unwrap();
        assert_eq!(from_text, Money::from_baht(750));
        assert!(serde_json::from_str::<Money>("\"n/a\"").is_err());
    }
}
