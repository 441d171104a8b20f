/// Tool for deleting habits
///
/// This module implements the habit_delete MCP tool. Deletion is always a
/// user decision; nothing in the daily cycle removes habits.

use serde::Serialize;

use crate::storage::{HabitStore, StorageError};
use crate::tools::{parse_habit_id, HabitIdParams};

/// Response from deleting a habit
#[derive(Debug, Serialize)]
pub struct DeleteHabitResponse {
    pub success: bool,
    pub message: String,
}

/// Delete a habit using the provided storage
pub fn delete_habit<S: HabitStore>(
    storage: &S,
    params: HabitIdParams,
) -> Result<DeleteHabitResponse, StorageError> {
    let habit_id = parse_habit_id(&params.habit_id)?;
    let habit = storage.get_habit(&habit_id)?;

    storage.delete_habit(&habit_id)?;

    Ok(DeleteHabitResponse {
        success: true,
        message: format!("🗑️ Deleted habit '{}'", habit.name),
    })
}
