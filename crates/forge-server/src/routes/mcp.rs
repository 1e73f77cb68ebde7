//! Hand-rolled JSON-RPC 2.0 surface exposing the Router's tool catalog
//! (§9 "Dynamic plugin discovery of tools is replaced by an explicit
//! registry"; §4.7 front door).

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct JsonRpcRequest {
    #[serde(default)]
    pub jsonrpc: Option<String>,
    pub id: Option<Value>,
    pub method: String,
    #[serde(default)]
    pub params: Value,
}

#[derive(Debug, Serialize)]
pub struct JsonRpcResponse {
    jsonrpc: &'static str,
    id: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<JsonRpcError>,
}

#[derive(Debug, Serialize)]
struct JsonRpcError {
    code: i32,
    message: String,
}

impl JsonRpcResponse {
    fn ok(id: Option<Value>, result: Value) -> Self {
        Self { jsonrpc: "2.0", id, result: Some(result), error: None }
    }

    fn err(id: Option<Value>, code: i32, message: impl Into<String>) -> Self {
        Self { jsonrpc: "2.0", id, result: None, error: Some(JsonRpcError { code, message: message.into() }) }
    }
}

const METHOD_NOT_FOUND: i32 = -32601;
const INVALID_PARAMS: i32 = -32602;

/// `POST /mcp`: the single entrypoint for `initialize`, `tools/list`,
/// `tools/call`, and notifications such as `notifications/initialized`.
///
/// A request with no `id` is a JSON-RPC notification (§6): it carries no
/// response, so it's handled for effect only and answered with a bare
/// `204 No Content`, never a JSON-RPC envelope.
pub async fn handle(State(state): State<AppState>, Json(request): Json<JsonRpcRequest>) -> Response {
    let id = request.id.clone();
    if id.is_none() {
        return StatusCode::NO_CONTENT.into_response();
    }
    match request.method.as_str() {
        "initialize" => Json(JsonRpcResponse::ok(
            id,
            json!({
                "protocolVersion": "2025-03-26",
                "serverInfo": { "name": "forge", "version": env!("CARGO_PKG_VERSION") },
                "capabilities": { "tools": {} },
            }),
        ))
        .into_response(),
        "tools/list" => {
            let names: Vec<Value> = state.router.tool_names().into_iter().map(|name| json!({ "name": name })).collect();
            Json(JsonRpcResponse::ok(id, json!({ "tools": names }))).into_response()
        }
        "tools/call" => handle_tools_call(&state, id, request.params).await,
        other => Json(JsonRpcResponse::err(id, METHOD_NOT_FOUND, format!("unknown method '{other}'"))).into_response(),
    }
}

async fn handle_tools_call(state: &AppState, id: Option<Value>, params: Value) -> Response {
    let Some(tool_name) = params.get("name").and_then(Value::as_str) else {
        return Json(JsonRpcResponse::err(id, INVALID_PARAMS, "missing 'name'")).into_response();
    };
    let args = params.get("arguments").cloned().unwrap_or(Value::Null);
    let request_text = args.get("request").and_then(Value::as_str).unwrap_or(tool_name).to_owned();

    let result = state.router.execute_task(tool_name, &request_text, args).await;
    let outcomes: Vec<Value> = result
        .outcomes
        .iter()
        .map(|(step_id, outcome)| json!({ "step": step_id, "outcome": outcome }))
        .collect();
    Json(JsonRpcResponse::ok(id, json!({ "outcomes": outcomes }))).into_response()
}
