/// Daily cycle evaluation
///
/// Decides, for one habit record and a given day, whether yesterday's
/// progress has to be cleared and whether the streak survives. The
/// evaluator never marks anything as done and never reads the clock.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::domain::{DomainError, HabitRecord};

/// What has to happen to a record before it is shown or used today
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Decision {
    /// The record is current
    NoChange,
    /// Clear `is_done` and `filled_cup`; also clear the streak if asked to
    ResetProgress { clear_streak: bool },
}

impl Decision {
    /// Whether the streak gets cleared
    pub fn clears_streak(&self) -> bool {
        matches!(self, Decision::ResetProgress { clear_streak: true })
    }
}

/// How to treat a record whose `last_change_at` is missing or unparsable
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum StalePolicy {
    /// Refuse with `DomainError::InvalidInput`
    #[default]
    Reject,
    /// Treat the record as infinitely stale and reset everything
    ForceReset,
}

/// Evaluate one record against `today`, rejecting unusable change dates
pub fn evaluate(record: &HabitRecord, today: NaiveDate) -> Result<Decision, DomainError> {
    evaluate_with_policy(record, today, StalePolicy::Reject)
}

/// Evaluate one record against `today` with an explicit stale-date policy
///
/// A change date after `today` is rejected under every policy.
pub fn evaluate_with_policy(
    record: &HabitRecord,
    today: NaiveDate,
    policy: StalePolicy,
) -> Result<Decision, DomainError> {
    let last_change = match (record.last_change_date(), policy) {
        (Ok(date), _) => date,
        (Err(_), StalePolicy::ForceReset) => {
            return Ok(Decision::ResetProgress { clear_streak: true });
        }
        (Err(e), StalePolicy::Reject) => return Err(e),
    };

    decide(last_change, today).ok_or_else(|| {
        DomainError::InvalidInput(format!(
            "habit {} was changed on {} which is after {}",
            record.id, last_change, today
        ))
    })
}

/// Core rule on two calendar dates; `None` when `last_change` is in the future
pub fn decide(last_change: NaiveDate, today: NaiveDate) -> Option<Decision> {
    let diff_days = (today - last_change).num_days();
    if diff_days < 0 {
        return None;
    }

    let is_month_boundary = today.day() == 1
        && last_day_of_month(last_change.year(), last_change.month()) == Some(last_change.day());

    // Any gap of two or more days is one reset, not a bigger penalty
    let decision = if diff_days >= 2 || is_month_boundary {
        Decision::ResetProgress { clear_streak: true }
    } else if last_change != today {
        Decision::ResetProgress { clear_streak: false }
    } else {
        Decision::NoChange
    };

    Some(decision)
}

/// Number of the last day in the given month
///
/// `None` for a month number outside 1..=12 or a year outside chrono's range.
pub fn last_day_of_month(year: i32, month: u32) -> Option<u32> {
    (28..=31)
        .rev()
        .find(|&day| NaiveDate::from_ymd_opt(year, month, day).is_some())
}
