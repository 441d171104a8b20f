/// Tool for creating new habits
///
/// This module implements the habit_create MCP tool.

use chrono::NaiveDate;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::domain::{HabitRecord, HabitVariant};
use crate::storage::{HabitStore, StorageError};

/// Parameters for creating a new habit
#[derive(Debug, Deserialize, JsonSchema)]
pub struct CreateHabitParams {
    /// Name of the habit
    pub name: String,
    /// Kind of habit: water, book, sport, vocabulary, or custom:label
    pub variant: String,
    /// Streak length in days at which the habit is achieved
    pub goal_number: u32,
    /// Cups of water per day (water habits only)
    #[serde(default)]
    pub cups_needed: Option<u32>,
}

/// Response from creating a habit
#[derive(Debug, Serialize)]
pub struct CreateHabitResponse {
    pub success: bool,
    pub habit_id: Option<String>,
    pub message: String,
}

/// Create a new habit using the provided storage
///
/// The habit is stamped with `today`, so it is current from the start.
pub fn create_habit<S: HabitStore>(
    storage: &S,
    params: CreateHabitParams,
    today: NaiveDate,
) -> Result<CreateHabitResponse, StorageError> {
    let variant: HabitVariant = params.variant.parse()?;

    let mut habit = HabitRecord::new(params.name, variant, params.goal_number, params.cups_needed)?;
    habit.touch(today);
    storage.create_habit(&habit)?;

    let quota = habit
        .cups_needed
        .map(|cups| format!(" ({} cups a day)", cups))
        .unwrap_or_default();

    Ok(CreateHabitResponse {
        success: true,
        habit_id: Some(habit.id.to_string()),
        message: format!(
            "✅ Created {} habit '{}'{}! Goal: a {}-day streak.",
            habit.variant, habit.name, quota, habit.goal_number
        ),
    })
}
