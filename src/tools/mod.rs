/// MCP tools for habit management
///
/// This module contains all the MCP tools that external clients can call
/// to interact with the habit tracker. Every tool receives "today" from the
/// caller rather than reading the clock.

pub mod create;
pub mod done;
pub mod cup;
pub mod status;
pub mod list;
pub mod sweep;
pub mod delete;

// Re-export tool functions for easy access
pub use create::*;
pub use done::*;
pub use cup::*;
pub use status::*;
pub use list::*;
pub use sweep::*;
pub use delete::*;

use chrono::NaiveDate;

use crate::cycle::{refresh, StalePolicy};
use crate::domain::{HabitId, HabitRecord};
use crate::storage::{HabitStore, StorageError};

/// Parse a habit ID argument
pub(crate) fn parse_habit_id(raw: &str) -> Result<HabitId, StorageError> {
    if raw.trim().is_empty() {
        return Err(StorageError::InvalidArgument("Habit ID cannot be empty".to_string()));
    }

    HabitId::from_string(raw)
        .map_err(|_| StorageError::InvalidArgument(format!("Invalid habit ID format: '{}'", raw)))
}

/// Load a habit and bring its daily progress up to date for `today`
///
/// A habit that was never touched has nothing to reset, so missing change
/// dates are treated as infinitely stale here. The reset is written back
/// before the caller sees the record.
pub(crate) fn load_current<S: HabitStore>(
    store: &S,
    habit_id: &HabitId,
    today: NaiveDate,
) -> Result<HabitRecord, StorageError> {
    let mut habit = store.get_habit(habit_id)?;

    if refresh(&mut habit, today, StalePolicy::ForceReset)? {
        store.update_habit(&habit)?;
    }

    Ok(habit)
}

/// "day" or "days"
pub(crate) fn days(n: u32) -> &'static str {
    if n == 1 { "day" } else { "days" }
}
