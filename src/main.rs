/// Main entry point for the Habit Cycle MCP server
///
/// This file sets up logging, parses command line arguments, and starts the MCP server.
/// The server listens for JSON-RPC requests over stdin/stdout following the MCP protocol.

use chrono::NaiveDate;
use clap::Parser;
use std::path::PathBuf;
use tracing::info;

use habit_cycle_mcp::{FixedClock, HabitCycleServer, StalePolicy, CHANGE_DATE_FORMAT};

/// Get the default database path with robust fallback strategy
fn get_default_database_path() -> Result<PathBuf, Box<dyn std::error::Error>> {
    // Try various locations in order of preference
    let potential_paths = [
        dirs::home_dir().map(|mut p| {
            p.push(".habit_cycle");
            p
        }),
        dirs::data_dir().map(|mut p| {
            p.push("habit_cycle");
            p
        }),
        dirs::config_dir().map(|mut p| {
            p.push("habit_cycle");
            p
        }),
        // Current working directory (last resort)
        std::env::current_dir().ok().map(|mut p| {
            p.push(".habit_cycle");
            p
        }),
    ];

    for potential_path in potential_paths.iter().flatten() {
        if std::fs::create_dir_all(potential_path).is_ok() {
            // Test if we can write to this directory
            let test_file = potential_path.join(".test_write");
            if std::fs::write(&test_file, "test").is_ok() {
                let _ = std::fs::remove_file(&test_file);
                return Ok(potential_path.join("habits.db"));
            }
        }
    }

    // Ultimate fallback: use a temporary directory
    let mut temp_path = std::env::temp_dir();
    temp_path.push("habit_cycle");
    std::fs::create_dir_all(&temp_path)?;
    temp_path.push("habits.db");

    tracing::warn!("Using temporary directory for database: {}", temp_path.display());
    Ok(temp_path)
}

fn parse_today(s: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(s, CHANGE_DATE_FORMAT)
        .map_err(|e| format!("expected YYYY-MM-DD: {}", e))
}

/// Command line arguments for the Habit Cycle MCP server
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the SQLite database file
    /// If not provided, uses a default location in the user's home directory
    #[arg(long)]
    database: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,

    /// Enable verbose output (implies debug)
    #[arg(short, long)]
    verbose: bool,

    /// Pretend today is this UTC date (YYYY-MM-DD) instead of reading the clock
    #[arg(long, value_parser = parse_today)]
    today: Option<NaiveDate>,

    /// Run one sweep, print its report as JSON and exit
    #[arg(long)]
    sweep_only: bool,

    /// Reset habits whose last change date is missing or unreadable instead of skipping them
    #[arg(long)]
    force_stale_reset: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let log_level = if args.verbose {
        "debug"
    } else if args.debug {
        "info"
    } else {
        "warn"
    };

    tracing_subscriber::fmt()
        .with_env_filter(format!("habit_cycle_mcp={}", log_level))
        .with_writer(std::io::stderr) // Send logs to stderr, not stdout
        .init();

    info!("Starting Habit Cycle MCP server");

    let db_path = match args.database {
        Some(path) => {
            if let Some(parent) = path.parent() {
                if !parent.as_os_str().is_empty() && !parent.exists() {
                    std::fs::create_dir_all(parent)?;
                }
            }
            path
        }
        None => get_default_database_path()?,
    };

    info!("Using database at: {}", db_path.display());

    let policy = if args.force_stale_reset {
        StalePolicy::ForceReset
    } else {
        StalePolicy::Reject
    };

    let mut server = HabitCycleServer::new(db_path)?.with_stale_policy(policy);
    if let Some(today) = args.today {
        info!("Clock fixed at {}", today);
        server = server.with_clock(FixedClock(today));
    }

    if args.sweep_only {
        let report = server.sweep_today()?;
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    server.run().await?;

    info!("Habit Cycle MCP server shutdown complete");
    Ok(())
}
