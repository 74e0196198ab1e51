//! # Business Clock
//!
//! "Today" for the resort is the calendar date in the resort's own UTC
//! offset, not the server's. Validators take `today` as a plain argument;
//! the layers that call them ask a [`Clock`].
//!
//! The system-backed clock lives in `resort-db`, since reading the wall
//! clock is I/O. This crate only provides [`FixedClock`] for tests and
//! replays.

use chrono::{DateTime, FixedOffset, NaiveDate, Offset, Utc};

/// Source of the current instant and the resort's current date.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;

    /// The calendar date at the resort.
    fn today(&self) -> NaiveDate;
}

/// A clock that never moves.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock {
    instant: DateTime<Utc>,
    offset: FixedOffset,
}

impl FixedClock {
    /// A clock frozen at `instant`, with the resort in `offset`.
    pub fn new(instant: DateTime<Utc>, offset: FixedOffset) -> Self {
        FixedClock { instant, offset }
    }

    /// A clock frozen at noon (UTC) on `date`, with a UTC resort.
    pub fn on(date: NaiveDate) -> Self {
        let instant = date
            .and_hms_opt(12, 0, 0)
            .map(|naive| naive.and_utc())
            .unwrap_or_default();
        FixedClock {
            instant,
            offset: Utc.fix(),
        }
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.instant
    }

    fn today(&self) -> NaiveDate {
        self.instant.with_timezone(&self.offset).date_naive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_today_uses_resort_offset() {
        // 20:00 UTC on the 17th is already the 18th in Bangkok.
        let instant = DateTime::parse_from_rfc3339("2026-02-17T20:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        let bangkok = FixedOffset::east_opt(7 * 3600).unwrap();
        let clock = FixedClock::new(instant, bangkok);
        assert_eq!(clock.today(), NaiveDate::from_ymd_opt(2026, 2, 18).unwrap());
        assert_eq!(clock.now(), instant);
    }

    #[test]
    fn test_on_date() {
        let date = NaiveDate::from_ymd_opt(2026, 2, 1).unwrap();
        assert_eq!(FixedClock::on(date).today(), date);
    }
}
