/// Tool for listing all habits
///
/// This module implements the habit_list MCP tool.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::storage::{HabitStore, StorageError};
use crate::tools::HabitStatus;

/// Parameters for listing habits
#[derive(Debug, Default, Deserialize, JsonSchema)]
pub struct ListHabitsParams {
    /// Also show habits that reached their goal (default: false)
    #[serde(default)]
    pub include_archived: Option<bool>,
}

/// Summary statistics for all habits
#[derive(Debug, Serialize)]
pub struct HabitListSummary {
    pub total_habits: u32,
    pub done_today: u32,
    pub archived: u32,
    pub longest_streak: u32,
}

/// Response from listing habits
#[derive(Debug, Serialize)]
pub struct ListHabitsResponse {
    pub habits: Vec<HabitStatus>,
    pub summary: HabitListSummary,
}

/// List habits using the provided storage
///
/// Records are shown as stored. The server sweeps on the first request of
/// each day and its change reactor handles writes in between, which keeps
/// them current.
pub fn list_habits<S: HabitStore>(
    storage: &S,
    params: ListHabitsParams,
) -> Result<ListHabitsResponse, StorageError> {
    let include_archived = params.include_archived.unwrap_or(false);
    let habits = storage.list_habits(include_archived)?;

    let statuses: Vec<HabitStatus> = habits.iter().map(HabitStatus::from).collect();

    let summary = HabitListSummary {
        total_habits: statuses.len() as u32,
        done_today: statuses.iter().filter(|h| h.is_done && !h.is_archieved).count() as u32,
        archived: statuses.iter().filter(|h| h.is_archieved).count() as u32,
        longest_streak: statuses.iter().map(|h| h.streak_days).max().unwrap_or(0),
    };

    Ok(ListHabitsResponse {
        habits: statuses,
        summary,
    })
}
