/// Tool for logging a cup of water
///
/// This module implements the habit_fill_cup MCP tool.

use chrono::NaiveDate;

use crate::storage::{HabitStore, StorageError};
use crate::tools::{days, load_current, parse_habit_id, HabitIdParams, ProgressResponse};

/// Add one cup to a water habit's progress for `today`
pub fn fill_cup<S: HabitStore>(
    storage: &S,
    params: HabitIdParams,
    today: NaiveDate,
) -> Result<ProgressResponse, StorageError> {
    let habit_id = parse_habit_id(&params.habit_id)?;
    let mut habit = load_current(storage, &habit_id, today)?;

    let changed = habit.fill_cup(today)?;
    if changed {
        storage.update_habit(&habit)?;
    }

    let cups_needed = habit.cups_needed.unwrap_or_default();
    let message = if !changed {
        format!("💧 '{}' quota already met today ({}/{})", habit.name, habit.filled_cup, cups_needed)
    } else if habit.is_archieved {
        format!("🏆 '{}' reached its {}-day goal and is now archived!", habit.name, habit.goal_number)
    } else if habit.is_done {
        format!(
            "💧 {}/{} cups, '{}' done for today! Streak: {} {}",
            habit.filled_cup, cups_needed, habit.name, habit.streak_days, days(habit.streak_days)
        )
    } else {
        format!("💧 {}/{} cups for '{}'", habit.filled_cup, cups_needed, habit.name)
    };

    Ok(ProgressResponse {
        success: true,
        message,
        is_done: habit.is_done,
        streak_days: habit.streak_days,
        is_archieved: habit.is_archieved,
    })
}
