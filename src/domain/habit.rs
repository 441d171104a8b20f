/// Habit record entity and the user actions that move it forward
///
/// A `HabitRecord` mirrors one document of the habit store: daily progress
/// (`is_done`, `filled_cup`), the running streak and lifetime counters, and
/// the raw `last_change_at` date that the cycle evaluator compares against
/// today.

use serde::{Deserialize, Serialize};
use chrono::{DateTime, NaiveDate, Utc};
use crate::domain::{DomainError, HabitId, HabitVariant};

/// Date format used when writing `last_change_at`
pub const CHANGE_DATE_FORMAT: &str = "%Y-%m-%d";

const MAX_NAME_LEN: usize = 100;
const MAX_GOAL_NUMBER: u32 = 3650;
const MAX_CUPS_NEEDED: u32 = 50;

/// One tracked habit together with its daily progress
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HabitRecord {
    /// Unique identifier for this habit
    pub id: HabitId,
    /// Display name (e.g., "Drink water", "Read 20 pages")
    pub name: String,
    /// What kind of habit this is
    pub variant: HabitVariant,
    /// Whether today's quota has been met
    pub is_done: bool,
    /// Consecutive completed days
    pub streak_days: u32,
    /// Lifetime completion count
    pub done_number: u32,
    /// Cups drunk today (water habits only)
    pub filled_cup: u32,
    /// Daily cup quota (water habits only)
    pub cups_needed: Option<u32>,
    /// Streak length at which the habit counts as achieved
    pub goal_number: u32,
    /// Raw date of the last progress change, as stored
    pub last_change_at: Option<String>,
    /// Whether the goal has been reached and the habit retired
    pub is_archieved: bool,
    /// When this habit was created
    pub created_at: DateTime<Utc>,
}

impl HabitRecord {
    /// Create a new habit with validation
    ///
    /// `last_change_at` starts out empty; callers stamp the creation day with
    /// [`HabitRecord::touch`] before storing the record.
    pub fn new(
        name: String,
        variant: HabitVariant,
        goal_number: u32,
        cups_needed: Option<u32>,
    ) -> Result<Self, DomainError> {
        Self::validate_name(&name)?;
        Self::validate_goal(goal_number)?;
        Self::validate_cups(&variant, cups_needed)?;

        Ok(Self {
            id: HabitId::new(),
            name: name.trim().to_string(),
            variant,
            is_done: false,
            streak_days: 0,
            done_number: 0,
            filled_cup: 0,
            cups_needed,
            goal_number,
            last_change_at: None,
            is_archieved: false,
            created_at: Utc::now(),
        })
    }

    /// Create a habit from existing data (used when loading from database)
    #[allow(clippy::too_many_arguments)]
    pub fn from_existing(
        id: HabitId,
        name: String,
        variant: HabitVariant,
        is_done: bool,
        streak_days: u32,
        done_number: u32,
        filled_cup: u32,
        cups_needed: Option<u32>,
        goal_number: u32,
        last_change_at: Option<String>,
        is_archieved: bool,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            name,
            variant,
            is_done,
            streak_days,
            done_number,
            filled_cup,
            cups_needed,
            goal_number,
            last_change_at,
            is_archieved,
            created_at,
        }
    }

    /// Parse `last_change_at` into a UTC calendar date
    ///
    /// Fails with `InvalidInput` when the field is missing or unparsable.
    pub fn last_change_date(&self) -> Result<NaiveDate, DomainError> {
        let raw = self.last_change_at.as_deref().ok_or_else(|| {
            DomainError::InvalidInput(format!("habit {} has no lastChangeAt", self.id))
        })?;

        parse_change_date(raw).ok_or_else(|| {
            DomainError::InvalidInput(format!(
                "habit {} has unparsable lastChangeAt '{}'",
                self.id, raw
            ))
        })
    }

    /// Mark today's quota as met
    ///
    /// Returns `Ok(false)` when the habit was already done today. The record
    /// must already be current for `today` (see `cycle::refresh`).
    pub fn mark_done(&mut self, today: NaiveDate) -> Result<bool, DomainError> {
        self.ensure_active()?;

        if self.is_done {
            return Ok(false);
        }

        self.complete(today);
        Ok(true)
    }

    /// Add one cup of water to today's progress
    ///
    /// Filling the last cup completes the habit.
    pub fn fill_cup(&mut self, today: NaiveDate) -> Result<bool, DomainError> {
        self.ensure_active()?;

        let cups_needed = match (&self.variant, self.cups_needed) {
            (HabitVariant::Water, Some(cups)) => cups,
            _ => {
                return Err(DomainError::Validation {
                    message: format!("'{}' is not a water habit", self.name),
                });
            }
        };

        if self.is_done {
            return Ok(false);
        }

        self.filled_cup = (self.filled_cup + 1).min(cups_needed);
        self.touch(today);

        if self.filled_cup >= cups_needed {
            self.complete(today);
        }
        Ok(true)
    }

    /// Record `today` as the day of the last progress change
    pub fn touch(&mut self, today: NaiveDate) {
        self.last_change_at = Some(today.format(CHANGE_DATE_FORMAT).to_string());
    }

    /// Cups still missing today, for water habits
    pub fn cups_remaining(&self) -> Option<u32> {
        self.cups_needed
            .map(|needed| needed.saturating_sub(self.filled_cup))
    }

    /// Days left until the goal streak is reached
    pub fn days_to_goal(&self) -> u32 {
        self.goal_number.saturating_sub(self.streak_days)
    }

    fn complete(&mut self, today: NaiveDate) {
        self.is_done = true;
        self.streak_days = self.streak_days.saturating_add(1);
        self.done_number = self.done_number.saturating_add(1);
        if let Some(cups) = self.cups_needed {
            self.filled_cup = cups;
        }
        self.touch(today);

        if self.streak_days >= self.goal_number {
            self.is_archieved = true;
        }
    }

    fn ensure_active(&self) -> Result<(), DomainError> {
        if self.is_archieved {
            return Err(DomainError::Validation {
                message: format!("'{}' already reached its goal and is archived", self.name),
            });
        }
        Ok(())
    }

    // Validation helper methods

    /// Validate habit name according to business rules
    fn validate_name(name: &str) -> Result<(), DomainError> {
        let trimmed = name.trim();

        if trimmed.is_empty() {
            return Err(DomainError::InvalidHabitName(
                "Habit name cannot be empty".to_string()
            ));
        }

        if trimmed.chars().count() > MAX_NAME_LEN {
            return Err(DomainError::InvalidHabitName(format!(
                "Habit name cannot be longer than {} characters",
                MAX_NAME_LEN
            )));
        }

        Ok(())
    }

    fn validate_goal(goal_number: u32) -> Result<(), DomainError> {
        if goal_number == 0 || goal_number > MAX_GOAL_NUMBER {
            return Err(DomainError::InvalidValue {
                message: format!("Goal must be between 1 and {} days", MAX_GOAL_NUMBER),
            });
        }
        Ok(())
    }

    /// Water habits need a cup quota, every other variant must not have one
    fn validate_cups(variant: &HabitVariant, cups_needed: Option<u32>) -> Result<(), DomainError> {
        match (variant.tracks_cups(), cups_needed) {
            (true, Some(cups)) if cups == 0 || cups > MAX_CUPS_NEEDED => {
                Err(DomainError::InvalidValue {
                    message: format!("Cups needed must be between 1 and {}", MAX_CUPS_NEEDED),
                })
            }
            (true, None) => Err(DomainError::InvalidValue {
                message: "Water habits need a daily cup quota".to_string(),
            }),
            (false, Some(_)) => Err(DomainError::InvalidValue {
                message: format!("{} habits do not track cups", variant),
            }),
            _ => Ok(()),
        }
    }
}

/// Parse a stored change date
///
/// Accepts plain `YYYY-MM-DD` dates and RFC 3339 timestamps; timestamps are
/// reduced to their UTC calendar date.
pub fn parse_change_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();

    if let Ok(date) = NaiveDate::parse_from_str(raw, CHANGE_DATE_FORMAT) {
        return Some(date);
    }

    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|ts| ts.with_timezone(&Utc).date_naive())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn water(cups: u32, goal: u32) -> HabitRecord {
        HabitRecord::new("Drink water".to_string(), HabitVariant::Water, goal, Some(cups)).unwrap()
    }

    #[test]
    fn test_create_valid_habit() {
        let habit = HabitRecord::new("  Read ".to_string(), HabitVariant::Book, 30, None).unwrap();

        assert_eq!(habit.name, "Read");
        assert!(!habit.is_done);
        assert_eq!(habit.streak_days, 0);
        assert_eq!(habit.last_change_at, None);
        assert_eq!(habit.days_to_goal(), 30);
        assert_eq!(habit.cups_remaining(), None);
    }

    #[test]
    fn test_invalid_habit_fields() {
        assert!(HabitRecord::new("".to_string(), HabitVariant::Sport, 10, None).is_err());
        assert!(HabitRecord::new("Run".to_string(), HabitVariant::Sport, 0, None).is_err());
        assert!(HabitRecord::new("Run".to_string(), HabitVariant::Sport, 10, Some(3)).is_err());
        assert!(HabitRecord::new("Water".to_string(), HabitVariant::Water, 10, None).is_err());
        assert!(HabitRecord::new("Water".to_string(), HabitVariant::Water, 10, Some(0)).is_err());
    }

    #[test]
    fn test_mark_done_updates_counters_once() {
        let mut habit = HabitRecord::new("Read".to_string(), HabitVariant::Book, 30, None).unwrap();
        let today = date(2024, 3, 14);

        assert!(habit.mark_done(today).unwrap());
        assert!(!habit.mark_done(today).unwrap());

        assert!(habit.is_done);
        assert_eq!(habit.streak_days, 1);
        assert_eq!(habit.done_number, 1);
        assert_eq!(habit.last_change_at.as_deref(), Some("2024-03-14"));
    }

    #[test]
    fn test_reaching_goal_archives_habit() {
        let mut habit = HabitRecord::new("Words".to_string(), HabitVariant::Vocabulary, 2, None).unwrap();
        habit.streak_days = 1;

        habit.mark_done(date(2024, 3, 14)).unwrap();

        assert!(habit.is_archieved);
        assert!(habit.mark_done(date(2024, 3, 15)).is_err());
    }

    #[test]
    fn test_fill_cup_completes_on_last_cup() {
        let mut habit = water(3, 30);
        let today = date(2024, 3, 14);

        habit.fill_cup(today).unwrap();
        habit.fill_cup(today).unwrap();
        assert!(!habit.is_done);
        assert_eq!(habit.cups_remaining(), Some(1));
        assert_eq!(habit.last_change_at.as_deref(), Some("2024-03-14"));

        habit.fill_cup(today).unwrap();
        assert!(habit.is_done);
        assert_eq!(habit.filled_cup, 3);
        assert_eq!(habit.streak_days, 1);

        // Further cups are ignored once the quota is met
        assert!(!habit.fill_cup(today).unwrap());
        assert_eq!(habit.filled_cup, 3);
    }

    #[test]
    fn test_fill_cup_rejects_non_water() {
        let mut habit = HabitRecord::new("Run".to_string(), HabitVariant::Sport, 10, None).unwrap();
        assert!(habit.fill_cup(date(2024, 3, 14)).is_err());
    }

    #[test]
    fn test_mark_done_fills_water_quota() {
        let mut habit = water(8, 30);
        habit.mark_done(date(2024, 3, 14)).unwrap();
        assert_eq!(habit.filled_cup, 8);
    }

    #[test]
    fn test_parse_change_date_formats() {
        assert_eq!(parse_change_date("2024-03-14"), Some(date(2024, 3, 14)));
        assert_eq!(parse_change_date("2024-03-14T23:30:00Z"), Some(date(2024, 3, 14)));
        // Local evening in UTC-05:00 is already the next UTC day
        assert_eq!(parse_change_date("2024-03-14T21:00:00-05:00"), Some(date(2024, 3, 15)));
        assert_eq!(parse_change_date("14/03/2024"), None);
        assert_eq!(parse_change_date(""), None);
    }

    #[test]
    fn test_last_change_date_missing_is_invalid_input() {
        let habit = HabitRecord::new("Read".to_string(), HabitVariant::Book, 30, None).unwrap();
        assert!(matches!(habit.last_change_date(), Err(DomainError::InvalidInput(_))));
    }
}
