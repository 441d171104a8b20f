/// Applying cycle decisions to records
///
/// The evaluator only decides; these helpers perform the field changes on
/// an in-memory record. Writing the record back is left to the caller.

use chrono::NaiveDate;

use crate::cycle::{evaluate_with_policy, Decision, StalePolicy};
use crate::domain::{DomainError, HabitRecord};

/// Apply a decision to a record, returning whether any field changed
///
/// Only `is_done`, `filled_cup` and `streak_days` are touched. In particular
/// `last_change_at` stays as it was, so a missed day is still visible to the
/// next evaluation.
pub fn apply(record: &mut HabitRecord, decision: Decision) -> bool {
    let clear_streak = match decision {
        Decision::NoChange => return false,
        Decision::ResetProgress { clear_streak } => clear_streak,
    };

    let mut changed = false;

    if record.is_done {
        record.is_done = false;
        changed = true;
    }
    if record.filled_cup != 0 {
        record.filled_cup = 0;
        changed = true;
    }
    if clear_streak && record.streak_days != 0 {
        record.streak_days = 0;
        changed = true;
    }

    changed
}

/// Evaluate and apply in one step, returning whether the record changed
pub fn refresh(
    record: &mut HabitRecord,
    today: NaiveDate,
    policy: StalePolicy,
) -> Result<bool, DomainError> {
    let decision = evaluate_with_policy(record, today, policy)?;
    let changed = apply(record, decision);

    if changed {
        tracing::debug!(
            "Reset daily progress of habit {} ({:?})",
            record.id,
            decision
        );
    }
    Ok(changed)
}
