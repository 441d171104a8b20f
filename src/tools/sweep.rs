/// Tool for running the daily sweep on demand
///
/// This module implements the habit_sweep MCP tool.

use chrono::NaiveDate;
use serde::Serialize;

use crate::cycle::{sweep, StalePolicy, SweepReport};
use crate::storage::{HabitStore, StorageError};

/// Response from a sweep
#[derive(Debug, Serialize)]
pub struct SweepResponse {
    pub report: SweepReport,
    pub message: String,
}

/// Run the daily sweep over every active habit
pub fn run_sweep<S: HabitStore>(
    storage: &S,
    today: NaiveDate,
    policy: StalePolicy,
) -> Result<SweepResponse, StorageError> {
    let report = sweep(storage, today, policy)?;

    let mut message = format!(
        "🧹 Checked {} habits for {}: {} reset, {} streaks cleared",
        report.evaluated, today, report.reset, report.streaks_cleared
    );
    if report.invalid > 0 {
        message.push_str(&format!("\n⚠️ {} habits have an unusable last change date", report.invalid));
    }
    if report.write_failures > 0 {
        message.push_str(&format!("\n⚠️ {} resets could not be saved and will be retried", report.write_failures));
    }

    Ok(SweepResponse { report, message })
}
