/// Integration tests for the SQLite store and the daily sweep across restarts
use chrono::NaiveDate;
use habit_cycle_mcp::*;
use tempfile::NamedTempFile;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[test]
fn test_streak_survives_restart_and_breaks_after_gap() {
    let temp_file = NamedTempFile::new().expect("Failed to create temp file");
    let db_path = temp_file.path().to_path_buf();

    let habit_id = {
        let server = HabitCycleServer::new(db_path.clone())
            .expect("Failed to create first server")
            .with_clock(FixedClock(date(2024, 3, 12)));
        let created = create_habit(server.storage(), CreateHabitParams {
            name: "Read".to_string(),
            variant: "book".to_string(),
            goal_number: 30,
            cups_needed: None,
        }, server.today())
        .unwrap();
        let habit_id = created.habit_id.unwrap();
        mark_habit_done(server.storage(), HabitIdParams { habit_id: habit_id.clone() }, server.today()).unwrap();
        habit_id
    };

    // Next day: streak kept, progress cleared
    {
        let server = HabitCycleServer::new(db_path.clone())
            .expect("Failed to reopen server")
            .with_clock(FixedClock(date(2024, 3, 13)));
        let report = server.sweep_today().unwrap();
        assert_eq!(report.reset, 1);
        assert_eq!(report.streaks_cleared, 0);

        let id = HabitId::from_string(&habit_id).unwrap();
        let habit = server.storage().get_habit(&id).unwrap();
        assert!(!habit.is_done);
        assert_eq!(habit.streak_days, 1);
    }

    // Two days after the last completion the streak is gone
    let server = HabitCycleServer::new(db_path)
        .expect("Failed to reopen server")
        .with_clock(FixedClock(date(2024, 3, 14)));
    let report = server.sweep_today().unwrap();
    assert_eq!(report.streaks_cleared, 1);

    let habit = server.storage().get_habit(&HabitId::from_string(&habit_id).unwrap()).unwrap();
    assert_eq!(habit.streak_days, 0);
    assert_eq!(habit.done_number, 1);
}

#[test]
fn test_sweep_is_write_idempotent() {
    let storage = SqliteStorage::open_in_memory().unwrap();
    let mut habit = HabitRecord::new("Words".to_string(), HabitVariant::Vocabulary, 30, None).unwrap();
    habit.is_done = true;
    habit.streak_days = 2;
    habit.last_change_at = Some("2024-02-29".to_string());
    storage.create_habit(&habit).unwrap();

    let server = HabitCycleServer::with_storage(storage).with_clock(FixedClock(date(2024, 3, 1)));
    let first = server.sweep_today().unwrap();
    let second = server.sweep_today().unwrap();

    assert_eq!(first.streaks_cleared, 1);
    assert!(second.is_quiet());
    assert_eq!(second.evaluated, 1);
}

#[test]
fn test_force_reset_policy_repairs_unreadable_dates() {
    let storage = SqliteStorage::open_in_memory().unwrap();
    let mut habit = HabitRecord::new("Run".to_string(), HabitVariant::Sport, 30, None).unwrap();
    habit.is_done = true;
    habit.streak_days = 7;
    habit.last_change_at = Some("Thu Mar 14".to_string());
    storage.create_habit(&habit).unwrap();

    let server = HabitCycleServer::with_storage(storage)
        .with_clock(FixedClock(date(2024, 3, 14)))
        .with_stale_policy(StalePolicy::ForceReset);
    let report = server.sweep_today().unwrap();

    assert_eq!(report.invalid, 0);
    assert_eq!(report.streaks_cleared, 1);
    assert_eq!(server.storage().get_habit(&habit.id).unwrap().streak_days, 0);
}
