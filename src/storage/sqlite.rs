/// SQLite implementation of the habit store
///
/// This module provides the concrete SQLite implementation for storing
/// and retrieving habit records. It handles all SQL queries, data conversion,
/// and publishing change notifications after writes.

use std::path::PathBuf;

use rusqlite::{params, Connection, Row};
use tokio::sync::broadcast;

use crate::domain::{HabitId, HabitRecord, HabitVariant};
use crate::storage::{migrations, ChangeKind, HabitChange, HabitStore, StorageError};

/// How many change notifications a slow subscriber may fall behind
const CHANGE_FEED_CAPACITY: usize = 256;

const HABIT_COLUMNS: &str = "id, name, variant, is_done, streak_days, done_number, filled_cup, \
     cups_needed, goal_number, last_change_at, is_archieved, created_at";

/// SQLite-based storage implementation
///
/// This struct holds a connection to the SQLite database and the sending
/// half of the change feed.
pub struct SqliteStorage {
    conn: Connection,
    changes: broadcast::Sender<HabitChange>,
}

impl SqliteStorage {
    /// Create a new SQLite storage instance
    ///
    /// This opens the database file and runs any necessary migrations
    /// to ensure the schema is up to date.
    pub fn new(db_path: PathBuf) -> Result<Self, StorageError> {
        let conn = Connection::open(&db_path)
            .map_err(|e| StorageError::Connection(format!("Failed to open database: {}", e)))?;

        let storage = Self::with_connection(conn)?;
        tracing::info!("SQLite storage initialized at: {:?}", db_path);
        Ok(storage)
    }

    /// Create a storage instance backed by a private in-memory database
    pub fn open_in_memory() -> Result<Self, StorageError> {
        let conn = Connection::open_in_memory()
            .map_err(|e| StorageError::Connection(format!("Failed to open database: {}", e)))?;
        Self::with_connection(conn)
    }

    fn with_connection(conn: Connection) -> Result<Self, StorageError> {
        migrations::initialize_database(&conn)?;
        let (changes, _) = broadcast::channel(CHANGE_FEED_CAPACITY);
        Ok(Self { conn, changes })
    }

    fn publish(&self, habit_id: &HabitId, kind: ChangeKind) {
        // A send only fails when nobody is listening
        let _ = self.changes.send(HabitChange {
            habit_id: habit_id.clone(),
            kind,
        });
    }

    /// Convert one `habits` row into a record
    fn row_to_habit(row: &Row<'_>) -> rusqlite::Result<HabitRecord> {
        let id_str: String = row.get(0)?;
        let id = HabitId::from_string(&id_str).map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(0, rusqlite::types::Type::Text, Box::new(e))
        })?;

        let variant_str: String = row.get(2)?;
        let variant = variant_str.parse::<HabitVariant>().map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(2, rusqlite::types::Type::Text, Box::new(e))
        })?;

        let created_at_str: String = row.get(11)?;
        let created_at = chrono::DateTime::parse_from_rfc3339(&created_at_str)
            .map_err(|e| {
                rusqlite::Error::FromSqlConversionFailure(11, rusqlite::types::Type::Text, Box::new(e))
            })?
            .with_timezone(&chrono::Utc);

        Ok(HabitRecord::from_existing(
            id,
            row.get(1)?,  // name
            variant,
            row.get(3)?,  // is_done
            row.get(4)?,  // streak_days
            row.get(5)?,  // done_number
            row.get(6)?,  // filled_cup
            row.get(7)?,  // cups_needed
            row.get(8)?,  // goal_number
            row.get(9)?,  // last_change_at
            row.get(10)?, // is_archieved
            created_at,
        ))
    }
}

impl HabitStore for SqliteStorage {
    /// Create a new habit in the database
    fn create_habit(&self, habit: &HabitRecord) -> Result<(), StorageError> {
        self.conn.execute(
            "INSERT INTO habits (
                id, name, variant, is_done, streak_days, done_number, filled_cup,
                cups_needed, goal_number, last_change_at, is_archieved, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
            params![
                habit.id.to_string(),
                habit.name,
                habit.variant.as_storage_str(),
                habit.is_done,
                habit.streak_days,
                habit.done_number,
                habit.filled_cup,
                habit.cups_needed,
                habit.goal_number,
                habit.last_change_at,
                habit.is_archieved,
                habit.created_at.to_rfc3339(),
            ],
        )?;

        tracing::debug!("Created habit: {} ({})", habit.name, habit.id);
        self.publish(&habit.id, ChangeKind::Created);
        Ok(())
    }

    /// Get a habit by its ID
    fn get_habit(&self, habit_id: &HabitId) -> Result<HabitRecord, StorageError> {
        let sql = format!("SELECT {} FROM habits WHERE id = ?1", HABIT_COLUMNS);
        let mut stmt = self.conn.prepare(&sql)?;

        match stmt.query_row(params![habit_id.to_string()], Self::row_to_habit) {
            Ok(habit) => Ok(habit),
            Err(rusqlite::Error::QueryReturnedNoRows) => Err(StorageError::HabitNotFound {
                habit_id: habit_id.to_string(),
            }),
            Err(e) => Err(StorageError::Query(e)),
        }
    }

    /// Overwrite an existing habit record
    fn update_habit(&self, habit: &HabitRecord) -> Result<(), StorageError> {
        let rows_affected = self.conn.execute(
            "UPDATE habits SET
                name = ?2,
                variant = ?3,
                is_done = ?4,
                streak_days = ?5,
                done_number = ?6,
                filled_cup = ?7,
                cups_needed = ?8,
                goal_number = ?9,
                last_change_at = ?10,
                is_archieved = ?11
             WHERE id = ?1",
            params![
                habit.id.to_string(),
                habit.name,
                habit.variant.as_storage_str(),
                habit.is_done,
                habit.streak_days,
                habit.done_number,
                habit.filled_cup,
                habit.cups_needed,
                habit.goal_number,
                habit.last_change_at,
                habit.is_archieved,
            ],
        )?;

        if rows_affected == 0 {
            return Err(StorageError::HabitNotFound {
                habit_id: habit.id.to_string(),
            });
        }

        tracing::debug!("Updated habit: {} ({})", habit.name, habit.id);
        self.publish(&habit.id, ChangeKind::Updated);
        Ok(())
    }

    /// Delete a habit permanently
    fn delete_habit(&self, habit_id: &HabitId) -> Result<(), StorageError> {
        let rows_affected = self.conn.execute(
            "DELETE FROM habits WHERE id = ?1",
            params![habit_id.to_string()],
        )?;

        if rows_affected == 0 {
            return Err(StorageError::HabitNotFound {
                habit_id: habit_id.to_string(),
            });
        }

        tracing::debug!("Deleted habit: {}", habit_id);
        self.publish(habit_id, ChangeKind::Deleted);
        Ok(())
    }

    /// List habits, optionally including archived ones
    fn list_habits(&self, include_archived: bool) -> Result<Vec<HabitRecord>, StorageError> {
        let mut sql = format!("SELECT {} FROM habits", HABIT_COLUMNS);

        if !include_archived {
            sql.push_str(" WHERE is_archieved = 0");
        }

        sql.push_str(" ORDER BY created_at ASC, name ASC");

        let mut stmt = self.conn.prepare(&sql)?;
        let habits = stmt
            .query_map([], Self::row_to_habit)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(habits)
    }

    fn subscribe(&self) -> broadcast::Receiver<HabitChange> {
        self.changes.subscribe()
    }
}
