//! Time source abstraction for real and fixed clocks.
//!
//! The forecast cache decides freshness from "now" and from today's local
//! calendar date. Routing both through a trait lets tests pin the clock,
//! advance it past a TTL, or roll it over midnight without sleeping.

use chrono::{DateTime, Duration, Local, NaiveDate};
use once_cell::sync::OnceCell;
use std::sync::{Arc, Mutex};

/// Global time source instance, defaults to RealTimeSource
static TIME_SOURCE: OnceCell<Arc<dyn TimeSource>> = OnceCell::new();

/// Trait for abstracting time operations
pub trait TimeSource: Send + Sync {
    /// Get the current time
    fn now(&self) -> DateTime<Local>;

    /// Today's date in the local calendar
    fn today(&self) -> NaiveDate {
        self.now().date_naive()
    }

    /// Check if this is a fixed or simulated time source
    fn is_simulated(&self) -> bool;
}

/// Real-time implementation that uses actual system time
pub struct RealTimeSource;

impl TimeSource for RealTimeSource {
    fn now(&self) -> DateTime<Local> {
        Local::now()
    }

    fn is_simulated(&self) -> bool {
        false
    }
}

/// Manually driven clock.
///
/// Time only moves when `set` or `advance` is called, which makes TTL expiry
/// and midnight rollover reproducible.
pub struct FixedTimeSource {
    current: Mutex<DateTime<Local>>,
}

impl FixedTimeSource {
    pub fn new(start: DateTime<Local>) -> Self {
        Self {
            current: Mutex::new(start),
        }
    }

    /// Jump to an absolute instant.
    pub fn set(&self, time: DateTime<Local>) {
        let mut guard = self.current.lock().unwrap_or_else(|p| p.into_inner());
        *guard = time;
    }

    /// Move the clock forward (or backward for negative durations).
    pub fn advance(&self, by: Duration) {
        let mut guard = self.current.lock().unwrap_or_else(|p| p.into_inner());
        *guard += by;
    }
}

impl TimeSource for FixedTimeSource {
    fn now(&self) -> DateTime<Local> {
        *self.current.lock().unwrap_or_else(|p| p.into_inner())
    }

    fn is_simulated(&self) -> bool {
        true
    }
}

/// Initialize the global time source (call once at startup)
pub fn init_time_source(source: Arc<dyn TimeSource>) {
    TIME_SOURCE.set(source).ok();
}

/// Check if the time source has been initialized
pub fn is_initialized() -> bool {
    TIME_SOURCE.get().is_some()
}

/// Shared handle to the global time source, for components that store one.
pub fn shared() -> Arc<dyn TimeSource> {
    TIME_SOURCE
        .get_or_init(|| Arc::new(RealTimeSource))
        .clone()
}

/// Get the current time from the global time source
pub fn now() -> DateTime<Local> {
    TIME_SOURCE.get_or_init(|| Arc::new(RealTimeSource)).now()
}

/// Check if we're running on a non-wall clock
pub fn is_simulated() -> bool {
    TIME_SOURCE
        .get_or_init(|| Arc::new(RealTimeSource))
        .is_simulated()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_fixed_time_source_advances_only_on_demand() {
        let start = Local.with_ymd_and_hms(2024, 6, 21, 12, 0, 0).unwrap();
        let clock = FixedTimeSource::new(start);

        assert_eq!(clock.now(), start);
        assert_eq!(clock.now(), start);

        clock.advance(Duration::minutes(90));
        assert_eq!(clock.now(), start + Duration::minutes(90));
        assert!(clock.is_simulated());
    }

    #[test]
    fn test_fixed_time_source_today_rolls_over_at_midnight() {
        let start = Local.with_ymd_and_hms(2024, 6, 21, 23, 30, 0).unwrap();
        let clock = FixedTimeSource::new(start);
        assert_eq!(clock.today(), NaiveDate::from_ymd_opt(2024, 6, 21).unwrap());

        clock.advance(Duration::hours(1));
        assert_eq!(clock.today(), NaiveDate::from_ymd_opt(2024, 6, 22).unwrap());
    }
}
