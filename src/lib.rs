/// Public library interface for the Habit Cycle MCP server
///
/// This module exports the server, the habit store, and the daily cycle
/// rules so they can be used by other applications or tests.

use std::path::PathBuf;

use chrono::NaiveDate;
use thiserror::Error;

// Internal modules
mod domain;
mod storage;
mod cycle;
mod tools;
mod mcp;

// Re-export public modules and types
pub use domain::*;
pub use storage::{ChangeKind, HabitChange, HabitStore, SqliteStorage, StorageError};
pub use cycle::{
    apply, decide, evaluate, evaluate_with_policy, last_day_of_month, refresh, sweep,
    ChangeReactor, Decision, StalePolicy, SweepReport,
};
pub use tools::{
    create_habit, delete_habit, fill_cup, get_habit_status, list_habits, mark_habit_done,
    run_sweep, CreateHabitParams, CreateHabitResponse, DeleteHabitResponse, HabitIdParams,
    HabitListSummary, HabitStatus, ListHabitsParams, ListHabitsResponse, ProgressResponse,
    StatusResponse, SweepResponse,
};
pub use mcp::McpServer;
pub use mcp::protocol::{JsonRpcResponse, MCP_VERSION};

/// Errors that can occur during server operation
#[derive(Error, Debug)]
pub enum ServerError {
    #[error("Database error: {0}")]
    Database(#[from] storage::StorageError),

    #[error("Domain validation error: {0}")]
    Domain(#[from] domain::DomainError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Habit store plus the clock and stale-date policy used to keep it current
///
/// The server reacts to store changes instead of polling: every write is
/// published on the store's change feed and drained after each request.
/// A change of day has no write to announce it, so the first request on a
/// new day runs the full sweep.
pub struct HabitCycleServer {
    storage: SqliteStorage,
    clock: Box<dyn Clock>,
    stale_policy: StalePolicy,
    reactor: ChangeReactor,
    /// Day of the last successful full sweep
    last_swept: Option<NaiveDate>,
}

impl HabitCycleServer {
    /// Create a new server with the specified database path
    ///
    /// This will initialize the SQLite database with the required schema
    /// if it doesn't already exist. The system clock and the rejecting
    /// stale-date policy are used until overridden.
    pub fn new(db_path: PathBuf) -> Result<Self, ServerError> {
        tracing::info!("Initializing Habit Cycle server with database: {:?}", db_path);
        Ok(Self::with_storage(SqliteStorage::new(db_path)?))
    }

    /// Create a server around an already opened store
    pub fn with_storage(storage: SqliteStorage) -> Self {
        let reactor = ChangeReactor::subscribe(&storage);
        Self {
            storage,
            clock: Box::new(SystemClock),
            stale_policy: StalePolicy::default(),
            reactor,
            last_swept: None,
        }
    }

    /// Replace the clock that supplies "today"
    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    /// Replace the policy for records with an unusable change date
    pub fn with_stale_policy(mut self, policy: StalePolicy) -> Self {
        self.stale_policy = policy;
        self
    }

    /// Today's date according to the configured clock
    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    pub fn stale_policy(&self) -> StalePolicy {
        self.stale_policy
    }

    /// Get a reference to the storage layer (useful for testing)
    pub fn storage(&self) -> &SqliteStorage {
        &self.storage
    }

    /// Run the daily sweep for today
    pub fn sweep_today(&self) -> Result<SweepReport, ServerError> {
        Ok(cycle::sweep(&self.storage, self.today(), self.stale_policy)?)
    }

    /// Run the daily sweep unless it already ran for today
    ///
    /// Returns `None` when today was already swept. A failed sweep is retried
    /// on the next call.
    pub fn sweep_if_new_day(&mut self) -> Result<Option<SweepReport>, ServerError> {
        let today = self.clock.today();
        if self.last_swept == Some(today) {
            return Ok(None);
        }

        let report = cycle::sweep(&self.storage, today, self.stale_policy)?;
        self.last_swept = Some(today);
        Ok(Some(report))
    }

    /// Evaluate the habits changed since the last call
    pub fn react_to_changes(&mut self) -> Result<SweepReport, ServerError> {
        let today = self.clock.today();
        Ok(self.reactor.drain(&self.storage, today, self.stale_policy)?)
    }

    /// Run the MCP server, handling JSON-RPC requests over stdin/stdout
    ///
    /// A sweep runs first so the session starts with current records. This
    /// method will block until stdin is closed or an error occurs.
    pub async fn run(mut self) -> Result<(), ServerError> {
        tracing::info!("Starting MCP server...");

        if let Some(report) = self.sweep_if_new_day()? {
            tracing::info!(
                "Server started successfully, {} active habits ({} reset for {})",
                report.evaluated,
                report.reset,
                self.today()
            );
        }

        let mut mcp_server = McpServer::new(self);
        mcp_server.run().await?;

        Ok(())
    }
}
