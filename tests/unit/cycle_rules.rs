/// Unit tests for the daily cycle rules through the public API
use chrono::{Datelike, Duration, NaiveDate};
use habit_cycle_mcp::*;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn record(last_change_at: Option<&str>) -> HabitRecord {
    let mut habit = HabitRecord::new("Drink water".to_string(), HabitVariant::Water, 30, Some(8))
        .expect("valid habit");
    habit.is_done = true;
    habit.filled_cup = 8;
    habit.streak_days = 9;
    habit.last_change_at = last_change_at.map(str::to_string);
    habit
}

fn at(day: NaiveDate) -> HabitRecord {
    record(Some(&day.format(CHANGE_DATE_FORMAT).to_string()))
}

#[test]
fn test_documented_scenarios() {
    let today = date(2024, 3, 14);

    assert_eq!(evaluate(&record(Some("2024-03-14")), today).unwrap(), Decision::NoChange);
    assert_eq!(
        evaluate(&record(Some("2024-03-13")), today).unwrap(),
        Decision::ResetProgress { clear_streak: false }
    );
    assert_eq!(
        evaluate(&record(Some("2024-03-12")), today).unwrap(),
        Decision::ResetProgress { clear_streak: true }
    );
    assert_eq!(
        evaluate(&record(Some("2024-02-29")), date(2024, 3, 1)).unwrap(),
        Decision::ResetProgress { clear_streak: true }
    );
    assert!(matches!(
        evaluate(&record(None), today),
        Err(DomainError::InvalidInput(_))
    ));
}

#[test]
fn test_same_day_over_a_whole_year() {
    let mut day = date(2023, 1, 1);
    while day.year() == 2023 {
        assert_eq!(evaluate(&at(day), day).unwrap(), Decision::NoChange, "{}", day);
        day += Duration::days(1);
    }
}

#[test]
fn test_one_day_gap_over_a_whole_year() {
    let mut today = date(2024, 1, 2);
    while today.year() == 2024 {
        let yesterday = today - Duration::days(1);
        let expected = if today.day() == 1 {
            Decision::ResetProgress { clear_streak: true }
        } else {
            Decision::ResetProgress { clear_streak: false }
        };
        assert_eq!(evaluate(&at(yesterday), today).unwrap(), expected, "{}", today);
        today += Duration::days(1);
    }
}

#[test]
fn test_gaps_of_two_or_more_days_clear_streak() {
    let today = date(2024, 3, 14);
    for gap in [2, 3, 7, 45, 400] {
        let decision = evaluate(&at(today - Duration::days(gap)), today).unwrap();
        assert_eq!(decision, Decision::ResetProgress { clear_streak: true }, "gap {}", gap);
    }
}

#[test]
fn test_month_boundary_from_last_day_of_prior_month() {
    for (last, first) in [
        (date(2023, 12, 31), date(2024, 1, 1)),
        (date(2023, 2, 28), date(2023, 3, 1)),
        (date(2024, 4, 30), date(2024, 5, 1)),
        (date(2024, 1, 31), date(2024, 4, 1)),
    ] {
        assert!(evaluate(&at(last), first).unwrap().clears_streak(), "{} -> {}", last, first);
    }
}

#[test]
fn test_policy_controls_unusable_dates() {
    let today = date(2024, 3, 14);
    for raw in [None, Some("not-a-date"), Some("2024-13-40")] {
        let habit = record(raw);
        assert!(evaluate_with_policy(&habit, today, StalePolicy::Reject).is_err());
        assert_eq!(
            evaluate_with_policy(&habit, today, StalePolicy::ForceReset).unwrap(),
            Decision::ResetProgress { clear_streak: true }
        );
    }
}

#[test]
fn test_refresh_twice_is_stable() {
    let mut habit = record(Some("2024-03-13"));
    let today = date(2024, 3, 14);

    assert!(refresh(&mut habit, today, StalePolicy::Reject).unwrap());
    let after_first = habit.clone();
    assert!(!refresh(&mut habit, today, StalePolicy::Reject).unwrap());

    assert_eq!(habit, after_first);
    assert_eq!(habit.streak_days, 9);
    assert_eq!(habit.filled_cup, 0);
}

#[test]
fn test_fixed_clock_drives_server_today() {
    let storage = SqliteStorage::open_in_memory().unwrap();
    let server = HabitCycleServer::with_storage(storage).with_clock(FixedClock(date(2024, 3, 14)));
    assert_eq!(server.today(), date(2024, 3, 14));
    assert_eq!(server.stale_policy(), StalePolicy::Reject);
}
