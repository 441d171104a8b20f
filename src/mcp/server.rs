/// MCP server implementation that handles JSON-RPC communication
///
/// This module implements the actual MCP server that:
/// 1. Reads JSON-RPC requests line by line
/// 2. Processes tool calls against the habit store
/// 3. Writes JSON-RPC responses, one per line
///
/// After every request the server drains the store's change feed so that
/// any changed habit is brought up to date right away.

use schemars::{schema_for, JsonSchema};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Map, Value};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{debug, error, info, warn};

use crate::mcp::protocol::*;
use crate::storage::StorageError;
use crate::tools;
use crate::{HabitCycleServer, ServerError};

/// MCP server wrapping a habit cycle server
pub struct McpServer {
    /// The underlying habit cycle server
    habits: HabitCycleServer,
    /// Whether the client has confirmed initialization
    initialized: bool,
}

impl McpServer {
    /// Create a new MCP server
    pub fn new(habits: HabitCycleServer) -> Self {
        Self {
            habits,
            initialized: false,
        }
    }

    /// Whether the client sent its `initialized` notification
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Access the wrapped habit cycle server
    pub fn habits(&self) -> &HabitCycleServer {
        &self.habits
    }

    /// Run the MCP server over stdin/stdout
    pub async fn run(&mut self) -> Result<(), ServerError> {
        let stdin = tokio::io::BufReader::new(tokio::io::stdin());
        let stdout = tokio::io::stdout();
        self.serve(stdin, stdout).await
    }

    /// Serve JSON-RPC messages from `reader` until it is closed
    pub async fn serve<R, W>(&mut self, mut reader: R, mut writer: W) -> Result<(), ServerError>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        info!("Starting MCP server, waiting for JSON-RPC requests...");

        let mut line = String::new();

        loop {
            line.clear();

            match reader.read_line(&mut line).await {
                Ok(0) => {
                    info!("MCP server shutting down (input closed)");
                    break;
                }
                Ok(_) => {
                    if let Some(response) = self.handle_message(&line) {
                        let response_str = serde_json::to_string(&response)?;

                        writer.write_all(response_str.as_bytes()).await?;
                        writer.write_all(b"\n").await?;
                        writer.flush().await?;

                        debug!("Sent response: {}", response_str);
                    }
                }
                Err(e) => {
                    error!("Failed to read request: {}", e);
                    return Err(e.into());
                }
            }
        }

        Ok(())
    }

    /// Process a single line of JSON-RPC input
    ///
    /// Returns `None` for blank lines and notifications.
    pub fn handle_message(&mut self, line: &str) -> Option<JsonRpcResponse> {
        let line = line.trim();
        if line.is_empty() {
            return None;
        }

        debug!("Processing request: {}", line);

        let request: JsonRpcRequest = match serde_json::from_str(line) {
            Ok(req) => req,
            Err(e) => {
                error!("Failed to parse JSON-RPC request: {}", e);
                return Some(JsonRpcResponse::error(
                    Value::Null,
                    error_codes::PARSE_ERROR,
                    format!("Invalid JSON: {}", e),
                    None,
                ));
            }
        };

        // Bring every habit up to date before the request sees it
        if let Err(e) = self.habits.sweep_if_new_day() {
            warn!("Daily sweep failed: {}", e);
        }

        let response = self.handle_request(request);

        if let Err(e) = self.habits.react_to_changes() {
            warn!("Failed to react to habit changes: {}", e);
        }

        response
    }

    /// Handle a JSON-RPC request
    fn handle_request(&mut self, request: JsonRpcRequest) -> Option<JsonRpcResponse> {
        let id = match request.id {
            Some(id) => id,
            None => {
                self.handle_notification(&request.method);
                return None;
            }
        };

        if request.jsonrpc != "2.0" {
            return Some(JsonRpcResponse::error(
                id,
                error_codes::INVALID_REQUEST,
                format!("Unsupported JSON-RPC version '{}'", request.jsonrpc),
                None,
            ));
        }

        let response = match request.method.as_str() {
            "initialize" => self.handle_initialize(id),
            "ping" => JsonRpcResponse::success(id, json!({})),
            "tools/list" => JsonRpcResponse::success(id, json!({ "tools": tool_definitions() })),
            "tools/call" => self.handle_tools_call(id, request.params),
            _ => JsonRpcResponse::error(
                id,
                error_codes::METHOD_NOT_FOUND,
                format!("Method '{}' not found", request.method),
                None,
            ),
        };

        Some(response)
    }

    fn handle_notification(&mut self, method: &str) {
        match method {
            "initialized" | "notifications/initialized" => {
                self.initialized = true;
                info!("MCP client initialized");
            }
            other => debug!("Ignoring notification '{}'", other),
        }
    }

    /// Handle MCP initialization request
    fn handle_initialize(&mut self, id: Value) -> JsonRpcResponse {
        info!("MCP client connected");

        let result = InitializeResult {
            protocol_version: MCP_VERSION.to_string(),
            capabilities: ServerCapabilities {
                tools: Some(ToolsCapability {
                    list_changed: false,
                }),
            },
            server_info: ServerInfo {
                name: "Habit Cycle MCP".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
            },
        };

        to_response(id, &result)
    }

    /// Handle tools/call request
    fn handle_tools_call(&mut self, id: Value, params: Option<Value>) -> JsonRpcResponse {
        let tool_params: ToolCallParams = match params.map(serde_json::from_value) {
            Some(Ok(p)) => p,
            Some(Err(e)) => {
                return JsonRpcResponse::error(
                    id,
                    error_codes::INVALID_PARAMS,
                    format!("Invalid parameters: {}", e),
                    None,
                );
            }
            None => {
                return JsonRpcResponse::error(
                    id,
                    error_codes::INVALID_PARAMS,
                    "Missing parameters".to_string(),
                    None,
                );
            }
        };

        let result = self.call_tool(&tool_params.name, tool_params.arguments);
        to_response(id, &result)
    }

    /// Dispatch a tool call by name
    fn call_tool(&self, name: &str, args: Map<String, Value>) -> ToolCallResult {
        let storage = self.habits.storage();
        let today = self.habits.today();

        match name {
            "habit_create" => run_tool(args, |params| tools::create_habit(storage, params, today), |r| {
                match &r.habit_id {
                    Some(habit_id) => format!("{}\nHabit ID: {}", r.message, habit_id),
                    None => r.message.clone(),
                }
            }),
            "habit_done" => run_tool(
                args,
                |params| tools::mark_habit_done(storage, params, today),
                |r| r.message.clone(),
            ),
            "habit_fill_cup" => run_tool(
                args,
                |params| tools::fill_cup(storage, params, today),
                |r| r.message.clone(),
            ),
            "habit_status" => run_tool(
                args,
                |params| tools::get_habit_status(storage, params, today),
                |r| r.message.clone(),
            ),
            "habit_list" => run_tool(
                args,
                |params| tools::list_habits(storage, params),
                format_habit_list,
            ),
            "habit_sweep" => run_tool(
                args,
                |_: Map<String, Value>| tools::run_sweep(storage, today, self.habits.stale_policy()),
                |r| r.message.clone(),
            ),
            "habit_delete" => run_tool(
                args,
                |params| tools::delete_habit(storage, params),
                |r| r.message.clone(),
            ),
            _ => ToolCallResult::error(format!("Unknown tool: {}", name), error_codes::METHOD_NOT_FOUND),
        }
    }
}

/// Deserialize tool arguments, run the tool and wrap its response
fn run_tool<P, T, F, M>(args: Map<String, Value>, tool: F, message: M) -> ToolCallResult
where
    P: DeserializeOwned,
    T: Serialize,
    F: FnOnce(P) -> Result<T, StorageError>,
    M: FnOnce(&T) -> String,
{
    let params: P = match serde_json::from_value(Value::Object(args)) {
        Ok(params) => params,
        Err(e) => {
            return ToolCallResult::error(format!("Invalid arguments: {}", e), error_codes::INVALID_PARAMS);
        }
    };

    match tool(params) {
        Ok(response) => {
            let text = message(&response);
            ToolCallResult::success(text, serde_json::to_value(&response).ok())
        }
        Err(e) => {
            warn!("Tool call failed: {}", e);
            ToolCallResult::error(e.to_string(), storage_error_to_json_rpc_code(&e))
        }
    }
}

fn to_response<T: Serialize>(id: Value, result: &T) -> JsonRpcResponse {
    match serde_json::to_value(result) {
        Ok(value) => JsonRpcResponse::success(id, value),
        Err(e) => JsonRpcResponse::error(
            id,
            error_codes::INTERNAL_ERROR,
            format!("Failed to serialize result: {}", e),
            None,
        ),
    }
}

fn format_habit_list(response: &tools::ListHabitsResponse) -> String {
    if response.habits.is_empty() {
        return "No habits found. Create your first habit to get started!".to_string();
    }

    let header = format!(
        "📋 **Habits** ({} total, {} done today, {} achieved)\n\n",
        response.summary.total_habits, response.summary.done_today, response.summary.archived
    );

    let lines = response
        .habits
        .iter()
        .map(|h| format!("{}\n   ID: {}", h.summary_line(), h.habit_id))
        .collect::<Vec<_>>()
        .join("\n\n");

    format!("{}{}", header, lines)
}

fn schema_of<T: JsonSchema>() -> Value {
    serde_json::to_value(schema_for!(T)).unwrap_or_else(|_| json!({ "type": "object" }))
}

/// Definitions advertised by tools/list
pub fn tool_definitions() -> Vec<ToolDefinition> {
    vec![
        ToolDefinition {
            name: "habit_create".to_string(),
            description: "Create a new habit (water, book, sport, vocabulary or custom:label) with a goal streak".to_string(),
            input_schema: schema_of::<tools::CreateHabitParams>(),
        },
        ToolDefinition {
            name: "habit_done".to_string(),
            description: "Mark a habit as done for today, extending its streak".to_string(),
            input_schema: schema_of::<tools::HabitIdParams>(),
        },
        ToolDefinition {
            name: "habit_fill_cup".to_string(),
            description: "Log one cup of water for a water habit; the last cup completes the day".to_string(),
            input_schema: schema_of::<tools::HabitIdParams>(),
        },
        ToolDefinition {
            name: "habit_status".to_string(),
            description: "Show a habit's progress for today, streak and goal".to_string(),
            input_schema: schema_of::<tools::HabitIdParams>(),
        },
        ToolDefinition {
            name: "habit_list".to_string(),
            description: "List habits with today's progress and streaks".to_string(),
            input_schema: schema_of::<tools::ListHabitsParams>(),
        },
        ToolDefinition {
            name: "habit_sweep".to_string(),
            description: "Reset stale daily progress and broken streaks for every habit".to_string(),
            input_schema: json!({ "type": "object", "properties": {} }),
        },
        ToolDefinition {
            name: "habit_delete".to_string(),
            description: "Permanently delete a habit".to_string(),
            input_schema: schema_of::<tools::HabitIdParams>(),
        },
    ]
}
