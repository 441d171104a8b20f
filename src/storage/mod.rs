/// Storage layer for persisting habit records
///
/// This module handles all database operations using SQLite and publishes a
/// change notification for every successful write, so callers can react to
/// changes instead of polling.

pub mod sqlite;
pub mod migrations;

// Re-export the main storage types
pub use sqlite::*;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::broadcast;

use crate::domain::{DomainError, HabitId, HabitRecord};

/// Errors that can occur during storage operations
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Database connection error: {0}")]
    Connection(String),

    #[error("Database query error: {0}")]
    Query(#[from] rusqlite::Error),

    #[error("Habit not found: {habit_id}")]
    HabitNotFound { habit_id: String },

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error("Migration error: {0}")]
    Migration(String),
}

/// What happened to a habit record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChangeKind {
    Created,
    Updated,
    Deleted,
}

/// Notification published after every successful write
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HabitChange {
    pub habit_id: HabitId,
    pub kind: ChangeKind,
}

/// Trait defining the storage interface for habit records
///
/// This keeps the cycle logic and the tools independent of SQLite.
pub trait HabitStore {
    /// Create a new habit record
    fn create_habit(&self, habit: &HabitRecord) -> Result<(), StorageError>;

    /// Get a habit record by ID
    fn get_habit(&self, habit_id: &HabitId) -> Result<HabitRecord, StorageError>;

    /// Overwrite an existing habit record
    fn update_habit(&self, habit: &HabitRecord) -> Result<(), StorageError>;

    /// Permanently delete a habit record
    fn delete_habit(&self, habit_id: &HabitId) -> Result<(), StorageError>;

    /// List habit records, oldest first
    fn list_habits(&self, include_archived: bool) -> Result<Vec<HabitRecord>, StorageError>;

    /// Subscribe to change notifications for writes made after this call
    fn subscribe(&self) -> broadcast::Receiver<HabitChange>;
}
