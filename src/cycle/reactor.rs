/// Change-driven evaluation
///
/// Instead of re-reading every habit on a timer, the reactor listens to the
/// store's change feed and evaluates only the habits that were created or
/// updated since the last drain.

use std::collections::HashMap;

use chrono::NaiveDate;
use tokio::sync::broadcast::{error::TryRecvError, Receiver};
use tracing::{debug, warn};

use crate::cycle::sweep::{sweep, sweep_record, SweepReport};
use crate::cycle::StalePolicy;
use crate::domain::HabitId;
use crate::storage::{ChangeKind, HabitChange, HabitStore, StorageError};

/// Subscription to a store's change feed
pub struct ChangeReactor {
    changes: Receiver<HabitChange>,
}

impl ChangeReactor {
    /// Subscribe to `store`; only writes after this call are seen
    pub fn subscribe<S: HabitStore>(store: &S) -> Self {
        Self {
            changes: store.subscribe(),
        }
    }

    /// Evaluate every habit touched since the last drain
    ///
    /// Each habit is evaluated at most once per drain. When the feed
    /// overflowed and notifications were lost, a full sweep runs instead.
    pub fn drain<S: HabitStore>(
        &mut self,
        store: &S,
        today: NaiveDate,
        policy: StalePolicy,
    ) -> Result<SweepReport, StorageError> {
        let mut order: Vec<HabitId> = Vec::new();
        let mut last_kind: HashMap<HabitId, ChangeKind> = HashMap::new();
        let mut lagged = false;

        loop {
            match self.changes.try_recv() {
                Ok(change) => {
                    if last_kind.insert(change.habit_id.clone(), change.kind).is_none() {
                        order.push(change.habit_id);
                    }
                }
                Err(TryRecvError::Lagged(missed)) => {
                    warn!("Change feed lagged by {} notifications, running a full sweep", missed);
                    lagged = true;
                }
                Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => break,
            }
        }

        if lagged {
            return sweep(store, today, policy);
        }

        let mut report = SweepReport {
            today: Some(today),
            ..SweepReport::default()
        };

        for habit_id in order {
            if last_kind.get(&habit_id) == Some(&ChangeKind::Deleted) {
                continue;
            }

            let habit = match store.get_habit(&habit_id) {
                Ok(habit) => habit,
                Err(StorageError::HabitNotFound { .. }) => continue,
                Err(e) => {
                    warn!("Could not load changed habit {}: {}", habit_id, e);
                    continue;
                }
            };

            if habit.is_archieved {
                continue;
            }

            sweep_record(store, habit, today, policy, &mut report);
        }

        if report.evaluated > 0 {
            debug!(
                "Reacted to {} changed habits, {} reset",
                report.evaluated, report.reset
            );
        }
        Ok(report)
    }
}
