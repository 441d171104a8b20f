/// Core types used throughout the domain layer
///
/// This module defines the habit ID wrapper and the variant tag that tells
/// a water habit apart from the reading, sport and vocabulary ones.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::DomainError;

/// Unique identifier for a habit
///
/// This is a wrapper around UUID so a habit ID can't be mixed up with
/// any other string flowing through the tool layer.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HabitId(pub Uuid);

impl HabitId {
    /// Generate a new random habit ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create a habit ID from a string (useful for database loading)
    pub fn from_string(s: &str) -> Result<Self, uuid::Error> {
        Ok(Self(Uuid::parse_str(s.trim())?))
    }
}

impl Default for HabitId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for HabitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Which kind of habit a record tracks
///
/// Only `Water` habits carry cup progress; every other variant is completed
/// in one step.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HabitVariant {
    /// Drink a number of cups of water every day
    Water,
    /// Read every day
    Book,
    /// Exercise every day
    Sport,
    /// Learn new words every day
    Vocabulary,
    /// User-defined habit with a custom label
    Custom(String),
}

impl HabitVariant {
    /// Get the display name for this variant
    pub fn display_name(&self) -> &str {
        match self {
            HabitVariant::Water => "Water",
            HabitVariant::Book => "Book",
            HabitVariant::Sport => "Sport",
            HabitVariant::Vocabulary => "Vocabulary",
            HabitVariant::Custom(label) => label,
        }
    }

    /// Whether progress is counted in cups
    pub fn tracks_cups(&self) -> bool {
        matches!(self, HabitVariant::Water)
    }

    /// Storage form: `water`, `book`, `sport`, `vocabulary` or `custom:<label>`
    pub fn as_storage_str(&self) -> String {
        match self {
            HabitVariant::Water => "water".to_string(),
            HabitVariant::Book => "book".to_string(),
            HabitVariant::Sport => "sport".to_string(),
            HabitVariant::Vocabulary => "vocabulary".to_string(),
            HabitVariant::Custom(label) => format!("custom:{}", label),
        }
    }
}

impl FromStr for HabitVariant {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();

        // Custom labels keep their case, only the prefix is matched loosely
        let is_custom = trimmed
            .get(..7)
            .map_or(false, |prefix| prefix.eq_ignore_ascii_case("custom:"));
        if is_custom {
            let label = trimmed[7..].trim();
            if label.is_empty() {
                return Err(DomainError::InvalidVariant(
                    "Custom habit label cannot be empty".to_string()
                ));
            }
            return Ok(HabitVariant::Custom(label.to_string()));
        }

        match trimmed.to_lowercase().as_str() {
            "water" => Ok(HabitVariant::Water),
            "book" => Ok(HabitVariant::Book),
            "sport" => Ok(HabitVariant::Sport),
            "vocabulary" => Ok(HabitVariant::Vocabulary),
            _ => Err(DomainError::InvalidVariant(format!(
                "'{}'. Valid options: water, book, sport, vocabulary, or custom:label",
                s
            ))),
        }
    }
}

impl fmt::Display for HabitVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}
