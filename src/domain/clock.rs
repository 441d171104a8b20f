/// Date providers
///
/// Everything that needs "today" receives it from a `Clock` so the cycle
/// rules never read the system time themselves. All dates are UTC calendar
/// dates.

use chrono::{NaiveDate, Utc};

/// Source of the current calendar date
pub trait Clock: Send + Sync {
    /// Today's date in UTC
    fn today(&self) -> NaiveDate;
}

/// Clock backed by the system time
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Utc::now().date_naive()
    }
}

/// Clock pinned to one date (tests and the `--today` override)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedClock(pub NaiveDate);

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.0
    }
}
