// Time Provider Port (for testability)

use chrono::NaiveDate;

/// Time provider interface (allows mocking in tests)
pub trait TimeProvider: Send + Sync {
    /// Get current time in milliseconds since epoch
    fn now_millis(&self) -> i64;

    /// Calendar date stamped on crawled records
    fn today(&self) -> NaiveDate;
}

/// System time provider (production)
pub struct SystemTimeProvider;

impl TimeProvider for SystemTimeProvider {
    fn now_millis(&self) -> i64 {
        chrono::Utc::now().timestamp_millis()
    }

    fn today(&self) -> NaiveDate {
        chrono::Local::now().date_naive()
    }
}

pub mod mocks {
    use super::*;

    /// Frozen clock for deterministic tests
    pub struct FixedTimeProvider {
        pub today: NaiveDate,
    }

    impl FixedTimeProvider {
        pub fn new(today: NaiveDate) -> Self {
            Self { today }
        }
    }

    impl TimeProvider for FixedTimeProvider {
        fn now_millis(&self) -> i64 {
            self.today
                .and_hms_opt(0, 0, 0)
                .map(|dt| dt.and_utc().timestamp_millis())
                .unwrap_or_default()
        }

        fn today(&self) -> NaiveDate {
            self.today
        }
    }
}
