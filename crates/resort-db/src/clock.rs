//! # System Clock
//!
//! Wall-clock implementation of [`Clock`], with "today" taken in the
//! resort's UTC offset (Asia/Bangkok is `+07:00`, 420 minutes).

use chrono::{DateTime, FixedOffset, NaiveDate, Offset, Utc};
use resort_core::Clock;
use tracing::warn;

/// Reads the system time.
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    offset: FixedOffset,
}

impl SystemClock {
    /// A clock for a resort `minutes` east of UTC.
    ///
    /// Offsets outside ±24h fall back to UTC.
    pub fn from_offset_minutes(minutes: i32) -> Self {
        let offset = minutes
            .checked_mul(60)
            .and_then(FixedOffset::east_opt)
            .unwrap_or_else(|| {
                warn!(minutes, "UTC offset out of range, using UTC");
                Utc.fix()
            });
        SystemClock { offset }
    }

    pub fn offset(&self) -> FixedOffset {
        self.offset
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        SystemClock { offset: Utc.fix() }
    }
}

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    fn today(&self) -> NaiveDate {
        Utc::now().with_timezone(&self.offset).date_naive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bangkok_offset() {
        let clock = SystemClock::from_offset_minutes(420);
        assert_eq!(clock.offset().local_minus_utc(), 7 * 3600);
    }

    #[test]
    fn test_out_of_range_offset_falls_back_to_utc() {
        let clock = SystemClock::from_offset_minutes(60 * 30);
        assert_eq!(clock.offset().local_minus_utc(), 0);
    }

    #[test]
    fn test_today_is_near_utc_date() {
        let clock = SystemClock::from_offset_minutes(420);
        let utc_today = Utc::now().date_naive();
        let diff = (clock.today() - utc_today).num_days();
        assert!((0..=1).contains(&diff));
    }
}
