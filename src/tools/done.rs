/// Tool for marking a habit as done for today
///
/// This module implements the habit_done MCP tool.

use chrono::NaiveDate;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::storage::{HabitStore, StorageError};
use crate::tools::{days, load_current, parse_habit_id};

/// Parameters naming a single habit
#[derive(Debug, Deserialize, JsonSchema)]
pub struct HabitIdParams {
    /// ID of the habit
    pub habit_id: String,
}

/// Response from a progress-changing tool
#[derive(Debug, Serialize)]
pub struct ProgressResponse {
    pub success: bool,
    pub message: String,
    pub is_done: bool,
    pub streak_days: u32,
    pub is_archieved: bool,
}

/// Mark a habit as done for `today`
pub fn mark_habit_done<S: HabitStore>(
    storage: &S,
    params: HabitIdParams,
    today: NaiveDate,
) -> Result<ProgressResponse, StorageError> {
    let habit_id = parse_habit_id(&params.habit_id)?;
    let mut habit = load_current(storage, &habit_id, today)?;

    let changed = habit.mark_done(today)?;
    if changed {
        storage.update_habit(&habit)?;
    }

    let message = if !changed {
        format!("'{}' is already done today. Streak: {} {}", habit.name, habit.streak_days, days(habit.streak_days))
    } else if habit.is_archieved {
        format!("🏆 '{}' reached its {}-day goal and is now archived!", habit.name, habit.goal_number)
    } else {
        format!(
            "🔥 '{}' done! Current streak: {} {} ({} to go)",
            habit.name,
            habit.streak_days,
            days(habit.streak_days),
            habit.days_to_goal()
        )
    };

    Ok(ProgressResponse {
        success: true,
        message,
        is_done: habit.is_done,
        streak_days: habit.streak_days,
        is_archieved: habit.is_archieved,
    })
}
