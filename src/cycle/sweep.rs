/// Daily sweep over every habit in a store
///
/// Each record is evaluated on its own and written back only when the
/// reset actually changed something, so running the sweep twice on the same
/// day performs no second round of writes.

use chrono::NaiveDate;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::cycle::{apply, evaluate_with_policy, StalePolicy};
use crate::domain::HabitRecord;
use crate::storage::{HabitStore, StorageError};

/// Outcome counts of one sweep
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SweepReport {
    /// The day the sweep evaluated against
    pub today: Option<NaiveDate>,
    /// Records looked at
    pub evaluated: u32,
    /// Records whose daily progress was cleared and written back
    pub reset: u32,
    /// Of those, records whose streak was cleared as well
    pub streaks_cleared: u32,
    /// Records skipped because their change date was unusable
    pub invalid: u32,
    /// Records whose write back failed; they are retried on the next sweep
    pub write_failures: u32,
}

/// Evaluate and apply one record, recording the outcome in `report`
pub(crate) fn sweep_record<S: HabitStore>(
    store: &S,
    mut habit: HabitRecord,
    today: NaiveDate,
    policy: StalePolicy,
    report: &mut SweepReport,
) {
    report.evaluated += 1;

    let decision = match evaluate_with_policy(&habit, today, policy) {
        Ok(decision) => decision,
        Err(e) => {
            warn!("Skipping habit {}: {}", habit.id, e);
            report.invalid += 1;
            return;
        }
    };

    if !apply(&mut habit, decision) {
        return;
    }

    match store.update_habit(&habit) {
        Ok(()) => {
            report.reset += 1;
            if decision.clears_streak() {
                report.streaks_cleared += 1;
            }
            debug!("Reset habit '{}' ({:?})", habit.name, decision);
        }
        Err(e) => {
            warn!("Failed to write reset for habit {}: {}", habit.id, e);
            report.write_failures += 1;
        }
    }
}

/// Run the daily sweep over all non-archived habits
///
/// Only listing the habits can fail; per-record problems are counted in the
/// report and logged.
pub fn sweep<S: HabitStore>(
    store: &S,
    today: NaiveDate,
    policy: StalePolicy,
) -> Result<SweepReport, StorageError> {
    let habits = store.list_habits(false)?;

    let mut report = SweepReport {
        today: Some(today),
        ..SweepReport::default()
    };

    for habit in habits {
        sweep_record(store, habit, today, policy, &mut report);
    }

    info!(
        "Sweep for {}: {} evaluated, {} reset ({} streaks cleared), {} invalid, {} write failures",
        today,
        report.evaluated,
        report.reset,
        report.streaks_cleared,
        report.invalid,
        report.write_failures
    );
    Ok(report)
}

impl SweepReport {
    /// Whether the sweep changed nothing and hit no problems
    pub fn is_quiet(&self) -> bool {
        self.reset == 0 && self.invalid == 0 && self.write_failures == 0
    }
}
