//! Time Provider and Site Calendar
//!
//! Record ages and report slugs are computed on calendar days of a fixed site
//! reference time zone, never on elapsed seconds: a record created at 23:50
//! is one day old at 00:10 the next site day, and a record created earlier
//! today is zero days old no matter how many hours have passed.
//!
//! # Examples
//!
//! ```rust
//! use perfmon_core::models::time::{SiteCalendar, TimeProvider, SystemTimeProvider};
//! use chrono::{FixedOffset, TimeZone, Utc};
//!
//! let calendar = SiteCalendar::new(FixedOffset::east_opt(2 * 3600).unwrap());
//! let created = Utc.with_ymd_and_hms(2025, 3, 1, 21, 30, 0).unwrap(); // 23:30 site time
//! let now = Utc.with_ymd_and_hms(2025, 3, 1, 22, 15, 0).unwrap(); // 00:15 next site day
//! assert_eq!(calendar.days_between(created, now), 1);
//!
//! let provider = SystemTimeProvider;
//! assert!(provider.now() <= Utc::now());
//! ```

use chrono::{DateTime, FixedOffset, NaiveDate, Offset, Utc};
use std::sync::Mutex;

/// Trait for providing current time
///
/// Lets tests pin "now" instead of sleeping.
pub trait TimeProvider: Send + Sync {
    /// Get the current UTC time
    fn now(&self) -> DateTime<Utc>;
}

/// System time provider using actual system clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemTimeProvider;

impl TimeProvider for SystemTimeProvider {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Manually driven time provider
///
/// Shared behind an `Arc` between a store and the data context so both see
/// the same clock; `advance` takes `&self` for that reason.
///
/// ```rust
/// use perfmon_core::models::time::{TimeProvider, MockTimeProvider};
/// use chrono::Duration;
///
/// let provider = MockTimeProvider::new();
/// let before = provider.now();
/// provider.advance(Duration::hours(1));
/// assert_eq!(provider.now() - before, Duration::hours(1));
/// ```
#[derive(Debug)]
pub struct MockTimeProvider {
    current_time: Mutex<DateTime<Utc>>,
}

impl MockTimeProvider {
    /// Start at the current system time
    pub fn new() -> Self {
        Self::with_time(Utc::now())
    }

    /// Start at a specific time
    pub fn with_time(time: DateTime<Utc>) -> Self {
        Self {
            current_time: Mutex::new(time),
        }
    }

    /// Set the current time to a specific value
    pub fn set_time(&self, time: DateTime<Utc>) {
        *self.lock() = time;
    }

    /// Advance time by the given duration
    pub fn advance(&self, duration: chrono::Duration) {
        *self.lock() += duration;
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, DateTime<Utc>> {
        self.current_time
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl TimeProvider for MockTimeProvider {
    fn now(&self) -> DateTime<Utc> {
        *self.lock()
    }
}

impl Default for MockTimeProvider {
    fn default() -> Self {
        Self::new()
    }
}

/// Calendar arithmetic in the site reference time zone
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SiteCalendar {
    offset: FixedOffset,
}

impl SiteCalendar {
    pub fn new(offset: FixedOffset) -> Self {
        Self { offset }
    }

    pub fn offset(&self) -> FixedOffset {
        self.offset
    }

    /// `instant` in site local time
    pub fn local(&self, instant: DateTime<Utc>) -> DateTime<FixedOffset> {
        instant.with_timezone(&self.offset)
    }

    /// Site calendar date of `instant`
    pub fn date_of(&self, instant: DateTime<Utc>) -> NaiveDate {
        self.local(instant).date_naive()
    }

    /// Whole site-calendar days from `earlier` to `later`
    ///
    /// Negative when `later` falls on an earlier site day.
    pub fn days_between(&self, earlier: DateTime<Utc>, later: DateTime<Utc>) -> i64 {
        (self.date_of(later) - self.date_of(earlier)).num_days()
    }
}

impl Default for SiteCalendar {
    fn default() -> Self {
        Self::new(Utc.fix())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn calendar(hours: i32) -> SiteCalendar {
        SiteCalendar::new(FixedOffset::east_opt(hours * 3600).unwrap())
    }

    #[test]
    fn test_system_time_provider() {
        let provider = SystemTimeProvider;
        let now1 = provider.now();
        let now2 = Utc::now();

        assert!((now2 - now1).num_milliseconds().abs() < 1000);
    }

    #[test]
    fn test_mock_time_provider_set_and_advance() {
        let start = Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap();
        let provider = MockTimeProvider::with_time(start);

        provider.advance(Duration::minutes(30));
        assert_eq!(provider.now(), start + Duration::minutes(30));

        provider.set_time(start);
        assert_eq!(provider.now(), start);
    }

    #[test]
    fn test_same_site_day_is_zero_days() {
        let created = Utc.with_ymd_and_hms(2025, 6, 1, 0, 5, 0).unwrap();
        let now = Utc.with_ymd_and_hms(2025, 6, 1, 23, 55, 0).unwrap();
        assert_eq!(calendar(0).days_between(created, now), 0);
    }

    #[test]
    fn test_crossing_midnight_is_one_day_even_under_24_hours() {
        let created = Utc.with_ymd_and_hms(2025, 6, 1, 23, 50, 0).unwrap();
        let now = Utc.with_ymd_and_hms(2025, 6, 2, 0, 10, 0).unwrap();
        assert_eq!(calendar(0).days_between(created, now), 1);
    }

    #[test]
    fn test_offset_moves_day_boundary() {
        // 22:30 UTC on June 1st is already June 2nd at UTC+3
        let created = Utc.with_ymd_and_hms(2025, 6, 1, 20, 0, 0).unwrap();
        let now = Utc.with_ymd_and_hms(2025, 6, 1, 22, 30, 0).unwrap();

        assert_eq!(calendar(0).days_between(created, now), 0);
        assert_eq!(calendar(3).days_between(created, now), 1);
        assert_eq!(calendar(3).date_of(now), NaiveDate::from_ymd_opt(2025, 6, 2).unwrap());
    }

    #[test]
    fn test_multi_day_span() {
        let created = Utc.with_ymd_and_hms(2025, 1, 30, 8, 0, 0).unwrap();
        let now = Utc.with_ymd_and_hms(2025, 3, 1, 7, 0, 0).unwrap();
        assert_eq!(calendar(0).days_between(created, now), 30);
    }
}
