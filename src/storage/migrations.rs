/// Database migration management
///
/// This module handles creating and updating the SQLite database schema.
/// It ensures the database has all the required tables and indexes.

use rusqlite::Connection;
use crate::storage::StorageError;

/// Current database schema version
///
/// Increment this when you add new migrations
const CURRENT_VERSION: i32 = 1;

/// Initialize the database schema
///
/// This creates all required tables and indexes if they don't exist.
/// It also sets up the version tracking for future migrations.
pub fn initialize_database(conn: &Connection) -> Result<(), StorageError> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY
        )",
        [],
    )?;

    let current_version = get_current_version(conn)?;

    if current_version > CURRENT_VERSION {
        return Err(StorageError::Migration(format!(
            "database schema v{} is newer than supported v{}",
            current_version, CURRENT_VERSION
        )));
    }

    if current_version < CURRENT_VERSION {
        run_migrations(conn, current_version)?;
        set_version(conn, CURRENT_VERSION)?;
    }

    Ok(())
}

/// Get the current database schema version
fn get_current_version(conn: &Connection) -> Result<i32, StorageError> {
    let version = conn
        .query_row("SELECT MAX(version) FROM schema_version", [], |row| {
            row.get::<_, Option<i32>>(0)
        })?
        .unwrap_or(0); // No version record yet

    Ok(version)
}

/// Set the database schema version
fn set_version(conn: &Connection, version: i32) -> Result<(), StorageError> {
    conn.execute("DELETE FROM schema_version", [])?;
    conn.execute(
        "INSERT INTO schema_version (version) VALUES (?1)",
        [version],
    )?;
    Ok(())
}

/// Run database migrations from the current version to the latest
fn run_migrations(conn: &Connection, from_version: i32) -> Result<(), StorageError> {
    if from_version < 1 {
        migration_v1(conn)?;
    }

    Ok(())
}

/// Migration to version 1: the habits table
fn migration_v1(conn: &Connection) -> Result<(), StorageError> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS habits (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            variant TEXT NOT NULL,
            is_done BOOLEAN NOT NULL DEFAULT FALSE,
            streak_days INTEGER NOT NULL DEFAULT 0 CHECK (streak_days >= 0),
            done_number INTEGER NOT NULL DEFAULT 0 CHECK (done_number >= 0),
            filled_cup INTEGER NOT NULL DEFAULT 0 CHECK (filled_cup >= 0),
            cups_needed INTEGER,
            goal_number INTEGER NOT NULL CHECK (goal_number > 0),
            last_change_at TEXT,
            is_archieved BOOLEAN NOT NULL DEFAULT FALSE,
            created_at TEXT NOT NULL
        )",
        [],
    )?;

    // Index for the daily sweep, which skips archived habits
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_habits_archieved
         ON habits (is_archieved)",
        [],
    )?;

    tracing::info!("Applied migration v1: Created habits table");
    Ok(())
}
