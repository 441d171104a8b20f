/// Tool for checking a single habit's progress
///
/// This module implements the habit_status MCP tool. Looking at a habit
/// brings its daily progress up to date first, the same way opening the
/// habit would.

use chrono::NaiveDate;
use serde::Serialize;

use crate::domain::HabitRecord;
use crate::storage::{HabitStore, StorageError};
use crate::tools::{days, load_current, parse_habit_id, HabitIdParams};

/// Information about a single habit's status
#[derive(Debug, Serialize)]
pub struct HabitStatus {
    pub habit_id: String,
    pub name: String,
    pub variant: String,
    pub is_done: bool,
    pub streak_days: u32,
    pub done_number: u32,
    pub goal_number: u32,
    pub filled_cup: Option<u32>,
    pub cups_needed: Option<u32>,
    pub last_change_at: Option<String>,
    pub is_archieved: bool,
}

impl From<&HabitRecord> for HabitStatus {
    fn from(habit: &HabitRecord) -> Self {
        Self {
            habit_id: habit.id.to_string(),
            name: habit.name.clone(),
            variant: habit.variant.as_storage_str(),
            is_done: habit.is_done,
            streak_days: habit.streak_days,
            done_number: habit.done_number,
            goal_number: habit.goal_number,
            filled_cup: habit.cups_needed.map(|_| habit.filled_cup),
            cups_needed: habit.cups_needed,
            last_change_at: habit.last_change_at.clone(),
            is_archieved: habit.is_archieved,
        }
    }
}

impl HabitStatus {
    /// One-line human readable summary
    pub fn summary_line(&self) -> String {
        let state = if self.is_archieved {
            "🏆 achieved".to_string()
        } else if self.is_done {
            "✅ done today".to_string()
        } else {
            match (self.filled_cup, self.cups_needed) {
                (Some(filled), Some(needed)) => format!("⏳ {}/{} cups", filled, needed),
                _ => "⏳ pending".to_string(),
            }
        };

        format!(
            "🎯 {} [{}] {} | Streak: {}/{} {} | Total: {}",
            self.name,
            self.variant,
            state,
            self.streak_days,
            self.goal_number,
            days(self.goal_number),
            self.done_number
        )
    }
}

/// Response from checking habit status
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub habit: HabitStatus,
    pub message: String,
}

/// Get the status of one habit as of `today`
pub fn get_habit_status<S: HabitStore>(
    storage: &S,
    params: HabitIdParams,
    today: NaiveDate,
) -> Result<StatusResponse, StorageError> {
    let habit_id = parse_habit_id(&params.habit_id)?;

    // Archived habits are frozen, so they are shown as stored
    let stored = storage.get_habit(&habit_id)?;
    let habit = if stored.is_archieved {
        stored
    } else {
        load_current(storage, &habit_id, today)?
    };

    let status = HabitStatus::from(&habit);
    let message = match &status.last_change_at {
        Some(last) => format!("{}\n   Last change: {}", status.summary_line(), last),
        None => format!("{}\n   No change date recorded", status.summary_line()),
    };

    Ok(StatusResponse { habit: status, message })
}
