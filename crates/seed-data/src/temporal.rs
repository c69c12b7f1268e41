//! Date helpers and ban/block windows.

use rand::Rng;
use time::{Date, Duration, OffsetDateTime, PrimitiveDateTime, Time};

/// Current UTC time without offset, matching `timestamp` columns.
pub fn now_utc() -> PrimitiveDateTime {
    let now = OffsetDateTime::now_utc();
    PrimitiveDateTime::new(now.date(), now.time())
}

/// `date` shifted by `days`, saturating at the calendar bounds.
pub fn add_days(date: Date, days: i64) -> Date {
    date.checked_add(Duration::days(days)).unwrap_or(if days < 0 {
        Date::MIN
    } else {
        Date::MAX
    })
}

pub fn midnight(date: Date) -> PrimitiveDateTime {
    PrimitiveDateTime::new(date, Time::MIDNIGHT)
}

/// Uniform date in `[start, end]`; `start` when the range is empty.
pub fn random_date_between(rng: &mut impl Rng, start: Date, end: Date) -> Date {
    let span = (end - start).whole_days();
    if span <= 0 {
        return start;
    }
    add_days(start, rng.gen_range(0..=span))
}

/// Uniform timestamp in `[start, end]` at second resolution.
pub fn random_datetime_between(
    rng: &mut impl Rng,
    start: PrimitiveDateTime,
    end: PrimitiveDateTime,
) -> PrimitiveDateTime {
    let span = (end - start).whole_seconds();
    if span <= 0 {
        return start;
    }
    start + Duration::seconds(rng.gen_range(0..=span))
}

/// Inclusive `[start, end]` date interval of a ban or block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TemporalWindow {
    pub start: Date,
    pub end: Date,
}

impl TemporalWindow {
    pub fn new(start: Date, length_days: i64) -> Self {
        Self {
            start,
            end: add_days(start, length_days),
        }
    }

    pub fn contains(&self, date: Date) -> bool {
        self.start <= date && date <= self.end
    }

    /// A window is active until the end of its last day.
    pub fn is_active(&self, today: Date) -> bool {
        self.end >= today
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use time::macros::{date, datetime};

    #[test]
    fn test_window_bounds_inclusive() {
        let window = TemporalWindow::new(date!(2024 - 01 - 01), 10);
        assert_eq!(window.end, date!(2024 - 01 - 11));
        assert!(window.contains(date!(2024 - 01 - 01)));
        assert!(window.contains(date!(2024 - 01 - 11)));
        assert!(!window.contains(date!(2024 - 01 - 12)));
        assert!(!window.contains(date!(2023 - 12 - 31)));
    }

    #[test]
    fn test_window_activity() {
        let window = TemporalWindow::new(date!(2024 - 01 - 01), 10);
        assert!(window.is_active(date!(2024 - 01 - 11)));
        assert!(!window.is_active(date!(2024 - 01 - 12)));
    }

    #[test]
    fn test_random_date_between() {
        let mut rng = StdRng::seed_from_u64(5);
        let start = date!(2024 - 02 - 27);
        let end = date!(2024 - 03 - 02);
        for _ in 0..200 {
            let d = random_date_between(&mut rng, start, end);
            assert!(d >= start && d <= end);
        }
        assert_eq!(random_date_between(&mut rng, end, start), end);
    }

    #[test]
    fn test_random_datetime_between() {
        let mut rng = StdRng::seed_from_u64(5);
        let start = datetime!(2020-01-01 10:00);
        let end = datetime!(2020-01-01 10:05);
        for _ in 0..200 {
            let t = random_datetime_between(&mut rng, start, end);
            assert!(t >= start && t <= end);
        }
    }
}
