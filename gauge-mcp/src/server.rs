//! MCP stdio server
//!
//! Line-delimited JSON-RPC 2.0 on stdin/stdout. Logs go to stderr.
//!
//! Tools:
//! - convert: Convert a value between two units of a category
//! - convert_all: Convert a value into every unit of its category
//! - list_categories: List measurement categories
//! - list_units: List the units of a category
//! - help: Documentation for the conversion functions

use anyhow::{Context, Result};
use gauge_core::Value;
use gauge_plugin::EvalContext;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value as JsonValue};
use std::io::{self, BufRead, Write};
use tracing::{debug, info, warn};

pub const PROTOCOL_VERSION: &str = "2025-11-25";
const SERVER_NAME: &str = "gauge";
const SERVER_VERSION: &str = env!("CARGO_PKG_VERSION");

const PARSE_ERROR: i32 = -32700;
const METHOD_NOT_FOUND: i32 = -32601;
const INVALID_PARAMS: i32 = -32602;

// MCP Protocol types
#[derive(Debug, Deserialize)]
pub struct McpRequest {
    #[allow(dead_code)]
    pub jsonrpc: String,
    pub id: Option<JsonValue>,
    pub method: String,
    #[serde(default)]
    pub params: Option<JsonValue>,
}

#[derive(Debug, Serialize)]
pub struct McpResponse {
    pub jsonrpc: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<JsonValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<JsonValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<McpError>,
}

#[derive(Debug, Serialize)]
pub struct McpError {
    pub code: i32,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<JsonValue>,
}

impl McpError {
    fn invalid_params(message: impl Into<String>) -> Self {
        McpError { code: INVALID_PARAMS, message: message.into(), data: None }
    }
}

/// Serve requests from stdin until EOF
pub fn serve(ctx: &EvalContext) -> Result<()> {
    info!(version = SERVER_VERSION, protocol = PROTOCOL_VERSION, "Gauge MCP server started");

    let stdin = io::stdin();
    let reader = io::BufReader::new(stdin.lock());
    let stdout = io::stdout();

    info!("Server ready, waiting for requests...");

    for line in reader.lines() {
        let line = line.context("reading request from stdin")?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        debug!(bytes = line.len(), "received request");

        let request: McpRequest = match serde_json::from_str(line) {
            Ok(r) => r,
            Err(e) => {
                warn!(error = %e, "error parsing request");
                let response = McpResponse {
                    jsonrpc: "2.0".to_string(),
                    id: None,
                    result: None,
                    error: Some(McpError {
                        code: PARSE_ERROR,
                        message: format!("Parse error: {}", e),
                        data: None,
                    }),
                };
                write_response(&mut stdout.lock(), &response)?;
                continue;
            }
        };

        debug!(method = %request.method, "processing");

        let response = handle_request(ctx, &request);

        // Notifications (no id) get no response
        if request.id.is_none() {
            debug!(method = %request.method, "notification processed");
            continue;
        }

        write_response(&mut stdout.lock(), &response)?;
        debug!(method = %request.method, "sent response");
    }

    info!("Client disconnected (EOF), server shutting down");
    Ok(())
}

fn write_response<W: Write>(out: &mut W, response: &McpResponse) -> Result<()> {
    let json = serde_json::to_string(response).context("serializing response")?;
    writeln!(out, "{}", json).context("writing response")?;
    out.flush().context("flushing stdout")?;
    Ok(())
}

pub fn handle_request(ctx: &EvalContext, request: &McpRequest) -> McpResponse {
    let result = match request.method.as_str() {
        // Lifecycle
        "initialize" => handle_initialize(&request.params),
        "initialized" | "notifications/initialized" => Ok(json!({})),
        "ping" => Ok(json!({})),

        // Tools
        "tools/list" => handle_tools_list(),
        "tools/call" => handle_tool_call(ctx, &request.params),

        _ => Err(McpError {
            code: METHOD_NOT_FOUND,
            message: format!("Method not found: {}", request.method),
            data: None,
        }),
    };

    match result {
        Ok(r) => McpResponse {
            jsonrpc: "2.0".to_string(),
            id: request.id.clone(),
            result: Some(r),
            error: None,
        },
        Err(e) => {
            warn!(method = %request.method, code = e.code, message = %e.message, "request failed");
            McpResponse {
                jsonrpc: "2.0".to_string(),
                id: request.id.clone(),
                result: None,
                error: Some(e),
            }
        }
    }
}

fn handle_initialize(params: &Option<JsonValue>) -> Result<JsonValue, McpError> {
    let client_info = params.as_ref()
        .and_then(|p| p.get("clientInfo"))
        .and_then(|c| c.get("name"))
        .and_then(|n| n.as_str())
        .unwrap_or("unknown");

    // Use client's protocol version for compatibility
    let client_protocol = params.as_ref()
        .and_then(|p| p.get("protocolVersion"))
        .and_then(|v| v.as_str())
        .unwrap_or(PROTOCOL_VERSION);

    info!(client = client_info, protocol = client_protocol, "client connected");

    Ok(json!({
        "protocolVersion": client_protocol,
        "serverInfo": {
            "name": SERVER_NAME,
            "version": SERVER_VERSION,
            "description": "Unit converter with explained formulas"
        },
        "capabilities": {
            "tools": {
                "listChanged": false
            }
        },
        "instructions": "Gauge converts values between units of one category (length, weight, temperature, time, speed, area, volume, energy, pressure, digital storage). Use 'list_units' to see valid unit names; names are case-sensitive."
    }))
}

fn handle_tools_list() -> Result<JsonValue, McpError> {
    let categories = gauge_units::categories();

    Ok(json!({
        "tools": [
            {
                "name": "convert",
                "description": "Convert a value between two units of the same category. Returns the result and the formula used.",
                "inputSchema": {
                    "type": "object",
                    "properties": {
                        "value": {
                            "type": "number",
                            "minimum": 0,
                            "description": "Value to convert"
                        },
                        "from_unit": {
                            "type": "string",
                            "description": "Source unit, e.g. \"meters\""
                        },
                        "to_unit": {
                            "type": "string",
                            "description": "Target unit, e.g. \"feet\""
                        },
                        "category": {
                            "type": "string",
                            "enum": categories
                        }
                    },
                    "required": ["value", "from_unit", "to_unit", "category"]
                }
            },
            {
                "name": "convert_all",
                "description": "Convert a value into every unit of its category.",
                "inputSchema": {
                    "type": "object",
                    "properties": {
                        "value": {
                            "type": "number",
                            "minimum": 0,
                            "description": "Value to convert"
                        },
                        "from_unit": {
                            "type": "string",
                            "description": "Source unit"
                        },
                        "category": {
                            "type": "string",
                            "enum": categories
                        }
                    },
                    "required": ["value", "from_unit", "category"]
                }
            },
            {
                "name": "list_categories",
                "description": "List the measurement categories.",
                "inputSchema": {
                    "type": "object",
                    "properties": {}
                }
            },
            {
                "name": "list_units",
                "description": "List the units of a category, in display order.",
                "inputSchema": {
                    "type": "object",
                    "properties": {
                        "category": {
                            "type": "string",
                            "enum": categories
                        }
                    },
                    "required": ["category"]
                }
            },
            {
                "name": "help",
                "description": "Get documentation for a conversion function. Omit name for an overview.",
                "inputSchema": {
                    "type": "object",
                    "properties": {
                        "name": {
                            "type": "string",
                            "description": "Function name"
                        }
                    }
                }
            }
        ]
    }))
}

fn handle_tool_call(ctx: &EvalContext, params: &Option<JsonValue>) -> Result<JsonValue, McpError> {
    let params = params.as_ref().ok_or_else(|| McpError::invalid_params("Missing params"))?;

    let name = params.get("name")
        .and_then(|v| v.as_str())
        .ok_or_else(|| McpError::invalid_params("Missing tool name"))?;

    let args = params.get("arguments").cloned().unwrap_or(json!({}));

    match name {
        "convert" => tool_convert(ctx, &args),
        "convert_all" => tool_convert_all(ctx, &args),
        "list_categories" => tool_call_function(ctx, "categories", Vec::new()),
        "list_units" => {
            let category = required_arg(&args, "category")?;
            tool_call_function(ctx, "units_of", vec![category])
        }
        "help" => tool_help(ctx, &args),
        _ => Err(McpError::invalid_params(format!("Unknown tool: {}", name))),
    }
}

fn required_arg(args: &JsonValue, name: &str) -> Result<Value, McpError> {
    args.get(name)
        .map(json_to_value)
        .ok_or_else(|| McpError::invalid_params(format!("Missing {} argument", name)))
}

fn tool_convert(ctx: &EvalContext, args: &JsonValue) -> Result<JsonValue, McpError> {
    let call_args = vec![
        required_arg(args, "value")?,
        required_arg(args, "from_unit")?,
        required_arg(args, "to_unit")?,
        required_arg(args, "category")?,
    ];

    let result = ctx.registry.call_function("convert", &call_args, ctx);
    if let Value::Error(_) = result {
        return Ok(tool_error(result));
    }

    let text = format!(
        "{}\nFormula: {}",
        result.get("summary").as_text().unwrap_or_default(),
        result.get("formula").as_text().unwrap_or_default()
    );

    Ok(json!({
        "content": [{ "type": "text", "text": text }],
        "data": JsonValue::from(result),
        "isError": false
    }))
}

fn tool_convert_all(ctx: &EvalContext, args: &JsonValue) -> Result<JsonValue, McpError> {
    let call_args = vec![
        required_arg(args, "value")?,
        required_arg(args, "from_unit")?,
        required_arg(args, "category")?,
    ];

    let result = ctx.registry.call_function("convert_all", &call_args, ctx);
    if let Value::Error(_) = result {
        return Ok(tool_error(result));
    }

    let lines: Vec<String> = result.as_list().unwrap_or_default().iter()
        .map(|row| format!("{} {}", row.get("display"), row.get("unit")))
        .collect();

    Ok(json!({
        "content": [{ "type": "text", "text": lines.join("\n") }],
        "data": JsonValue::from(result),
        "isError": false
    }))
}

fn tool_call_function(ctx: &EvalContext, function: &str, call_args: Vec<Value>) -> Result<JsonValue, McpError> {
    let result = ctx.registry.call_function(function, &call_args, ctx);
    if let Value::Error(_) = result {
        return Ok(tool_error(result));
    }

    let text = match result.as_list() {
        Some(items) => items.iter().map(|v| v.to_string()).collect::<Vec<_>>().join("\n"),
        None => result.to_string(),
    };

    Ok(json!({
        "content": [{ "type": "text", "text": text }],
        "data": JsonValue::from(result),
        "isError": false
    }))
}

fn tool_help(ctx: &EvalContext, args: &JsonValue) -> Result<JsonValue, McpError> {
    let name = args.get("name").and_then(|v| v.as_str());
    let help = ctx.registry.help(name);
    if let Value::Error(_) = help {
        return Ok(tool_error(help));
    }

    Ok(json!({
        "content": [{ "type": "text", "text": format_help(&help) }],
        "data": JsonValue::from(help),
        "isError": false
    }))
}

/// Conversion failures are tool results, not protocol errors
fn tool_error(result: Value) -> JsonValue {
    let text = match result.as_error() {
        Some(e) => e.to_string(),
        None => result.to_string(),
    };
    warn!(error = %text, "tool call rejected");
    json!({
        "content": [{ "type": "text", "text": text }],
        "data": JsonValue::from(result),
        "isError": true
    })
}

fn format_help(help: &Value) -> String {
    let mut out = String::new();
    if let Some(name) = help.get("name").as_text() {
        out.push_str(&format!("# {}\n\n", name));
        if let Some(d) = help.get("description").as_text() { out.push_str(&format!("{}\n\n", d)); }
        if let Some(u) = help.get("usage").as_text() { out.push_str(&format!("**Usage:** `{}`\n\n", u)); }
        if let Some(examples) = help.get("examples").as_list() {
            for e in examples {
                out.push_str(&format!("- `{}`\n", e));
            }
        }
        return out;
    }

    out.push_str("# Gauge functions\n\n");
    if let Some(groups) = help.get("functions").as_object() {
        for (category, names) in groups {
            out.push_str(&format!("**{}:** {}\n", category, names));
        }
    }
    if let Some(usage) = help.get("usage").as_text() {
        out.push_str(&format!("\n{}\n", usage));
    }
    out
}

fn json_to_value(json: &JsonValue) -> Value {
    match json {
        JsonValue::Null => Value::Null,
        JsonValue::Bool(b) => Value::Bool(*b),
        JsonValue::Number(n) => match n.as_f64() {
            Some(f) => Value::from(f),
            None => Value::Text(n.to_string()),
        },
        JsonValue::String(s) => Value::Text(s.clone()),
        JsonValue::Array(arr) => Value::List(arr.iter().map(json_to_value).collect()),
        JsonValue::Object(obj) => Value::Object(obj.iter().map(|(k, v)| (k.clone(), json_to_value(v))).collect()),
    }
}
