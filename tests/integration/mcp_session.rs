/// End-to-end tests driving the MCP server with JSON-RPC messages
use std::sync::{Arc, Mutex};

use chrono::NaiveDate;
use habit_cycle_mcp::*;
use serde_json::{json, Value};

/// Clock whose date the test can move forward mid-session
#[derive(Clone)]
struct SharedClock(Arc<Mutex<NaiveDate>>);

impl SharedClock {
    fn set(&self, day: NaiveDate) {
        *self.0.lock().unwrap() = day;
    }
}

impl Clock for SharedClock {
    fn today(&self) -> NaiveDate {
        *self.0.lock().unwrap()
    }
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn server_on(day: NaiveDate) -> McpServer {
    let storage = SqliteStorage::open_in_memory().expect("in-memory storage");
    McpServer::new(HabitCycleServer::with_storage(storage).with_clock(FixedClock(day)))
}

fn call(server: &mut McpServer, id: u64, tool: &str, arguments: Value) -> Value {
    let request = json!({
        "jsonrpc": "2.0",
        "id": id,
        "method": "tools/call",
        "params": { "name": tool, "arguments": arguments }
    });
    let response = server
        .handle_message(&request.to_string())
        .expect("requests get a response");
    assert!(response.error.is_none(), "unexpected error: {:?}", response.error);
    response.result.expect("result")
}

fn create_water(server: &mut McpServer) -> String {
    let result = call(server, 1, "habit_create", json!({
        "name": "Drink water",
        "variant": "water",
        "goal_number": 30,
        "cups_needed": 2
    }));
    assert_eq!(result["isError"], false);
    result["structuredContent"]["habit_id"].as_str().unwrap().to_string()
}

#[test]
fn test_initialize_and_list_tools() {
    let mut server = server_on(date(2024, 3, 14));

    let init = server
        .handle_message(r#"{"jsonrpc":"2.0","id":1,"method":"initialize","params":{}}"#)
        .unwrap();
    let result = init.result.unwrap();
    assert_eq!(result["protocolVersion"], MCP_VERSION);
    assert_eq!(result["serverInfo"]["name"], "Habit Cycle MCP");

    assert!(server
        .handle_message(r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#)
        .is_none());
    assert!(server.is_initialized());

    let tools = server
        .handle_message(r#"{"jsonrpc":"2.0","id":2,"method":"tools/list"}"#)
        .unwrap()
        .result
        .unwrap();
    let names: Vec<&str> = tools["tools"]
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["name"].as_str().unwrap())
        .collect();
    assert!(names.contains(&"habit_fill_cup"));
    assert!(names.contains(&"habit_sweep"));
}

#[test]
fn test_protocol_errors() {
    let mut server = server_on(date(2024, 3, 14));

    let parse_error = server.handle_message("{not json").unwrap();
    assert_eq!(parse_error.error.unwrap().code, -32700);

    let unknown = server
        .handle_message(r#"{"jsonrpc":"2.0","id":3,"method":"resources/list"}"#)
        .unwrap();
    assert_eq!(unknown.error.unwrap().code, -32601);

    let missing_params = server
        .handle_message(r#"{"jsonrpc":"2.0","id":4,"method":"tools/call"}"#)
        .unwrap();
    assert_eq!(missing_params.error.unwrap().code, -32602);

    assert!(server.handle_message("   ").is_none());
}

#[test]
fn test_tool_errors_are_reported_in_result() {
    let mut server = server_on(date(2024, 3, 14));

    let result = call(&mut server, 5, "habit_done", json!({ "habit_id": HabitId::new().to_string() }));
    assert_eq!(result["isError"], true);
    assert_eq!(result["structuredContent"]["code"], -32001);

    let result = call(&mut server, 6, "habit_create", json!({ "name": "No goal" }));
    assert_eq!(result["isError"], true);
    assert_eq!(result["structuredContent"]["code"], -32602);

    let result = call(&mut server, 7, "habit_teleport", json!({}));
    assert_eq!(result["isError"], true);
}

#[test]
fn test_water_day_through_tools() {
    let mut server = server_on(date(2024, 3, 14));
    let habit_id = create_water(&mut server);

    let first = call(&mut server, 2, "habit_fill_cup", json!({ "habit_id": habit_id }));
    assert_eq!(first["structuredContent"]["is_done"], false);

    let second = call(&mut server, 3, "habit_fill_cup", json!({ "habit_id": habit_id }));
    assert_eq!(second["structuredContent"]["is_done"], true);
    assert_eq!(second["structuredContent"]["streak_days"], 1);

    let status = call(&mut server, 4, "habit_status", json!({ "habit_id": habit_id }));
    assert_eq!(status["structuredContent"]["habit"]["filled_cup"], 2);
    assert_eq!(status["structuredContent"]["habit"]["last_change_at"], "2024-03-14");

    let list = call(&mut server, 5, "habit_list", json!({}));
    assert_eq!(list["structuredContent"]["summary"]["done_today"], 1);

    let deleted = call(&mut server, 6, "habit_delete", json!({ "habit_id": habit_id }));
    assert_eq!(deleted["isError"], false);
    let list = call(&mut server, 7, "habit_list", json!({}));
    assert_eq!(list["structuredContent"]["summary"]["total_habits"], 0);
}

#[test]
fn test_reactor_resets_changed_stale_habit() {
    let mut server = server_on(date(2024, 3, 14));

    // A record written by another writer with a stale change date
    let mut habit = HabitRecord::new("Read".to_string(), HabitVariant::Book, 30, None).unwrap();
    habit.is_done = true;
    habit.streak_days = 4;
    habit.last_change_at = Some("2024-03-11".to_string());
    server.habits().storage().create_habit(&habit).unwrap();

    // Any request drains the change feed afterwards
    server.handle_message(r#"{"jsonrpc":"2.0","id":1,"method":"ping"}"#);

    let stored = server.habits().storage().get_habit(&habit.id).unwrap();
    assert!(!stored.is_done);
    assert_eq!(stored.streak_days, 0);
    assert_eq!(stored.last_change_at.as_deref(), Some("2024-03-11"));
}

#[test]
fn test_day_change_mid_session_resets_progress() {
    let clock = SharedClock(Arc::new(Mutex::new(date(2024, 3, 14))));
    let storage = SqliteStorage::open_in_memory().unwrap();
    let mut server = McpServer::new(HabitCycleServer::with_storage(storage).with_clock(clock.clone()));

    let created = call(&mut server, 1, "habit_create", json!({
        "name": "Read",
        "variant": "book",
        "goal_number": 30
    }));
    let habit_id = created["structuredContent"]["habit_id"].as_str().unwrap().to_string();
    call(&mut server, 2, "habit_done", json!({ "habit_id": habit_id }));

    let list = call(&mut server, 3, "habit_list", json!({}));
    assert_eq!(list["structuredContent"]["summary"]["done_today"], 1);
    assert_eq!(list["structuredContent"]["summary"]["longest_streak"], 1);

    // Next day: progress cleared, streak kept
    clock.set(date(2024, 3, 15));
    let list = call(&mut server, 4, "habit_list", json!({}));
    assert_eq!(list["structuredContent"]["summary"]["done_today"], 0);
    assert_eq!(list["structuredContent"]["summary"]["longest_streak"], 1);

    // Days skipped: streak broken
    clock.set(date(2024, 3, 17));
    let list = call(&mut server, 5, "habit_list", json!({}));
    assert_eq!(list["structuredContent"]["summary"]["done_today"], 0);
    assert_eq!(list["structuredContent"]["summary"]["longest_streak"], 0);
}

#[test]
fn test_new_habit_is_not_reported_invalid() {
    let mut server = server_on(date(2024, 3, 14));
    create_water(&mut server);

    let result = call(&mut server, 2, "habit_sweep", json!({}));
    assert_eq!(result["structuredContent"]["report"]["evaluated"], 1);
    assert_eq!(result["structuredContent"]["report"]["invalid"], 0);
}

#[test]
fn test_sweep_tool_reports_counts() {
    let mut server = server_on(date(2024, 3, 14));
    let mut habit = HabitRecord::new("Run".to_string(), HabitVariant::Sport, 30, None).unwrap();
    habit.last_change_at = Some("garbage".to_string());
    server.habits().storage().create_habit(&habit).unwrap();

    let result = call(&mut server, 1, "habit_sweep", json!({}));
    assert_eq!(result["structuredContent"]["report"]["evaluated"], 1);
    assert_eq!(result["structuredContent"]["report"]["invalid"], 1);
}

#[tokio::test]
async fn test_serve_over_async_streams() {
    let mut server = server_on(date(2024, 3, 14));
    let input = concat!(
        r#"{"jsonrpc":"2.0","id":1,"method":"initialize","params":{}}"#, "\n",
        r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#, "\n",
        r#"{"jsonrpc":"2.0","id":2,"method":"ping"}"#, "\n",
    );
    let mut output: Vec<u8> = Vec::new();

    server.serve(input.as_bytes(), &mut output).await.unwrap();

    let lines: Vec<JsonRpcResponse> = String::from_utf8(output)
        .unwrap()
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0].id, json!(1));
    assert_eq!(lines[1].id, json!(2));
}
