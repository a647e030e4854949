//! JSON-RPC tool server.
//!
//! Speaks the subset of the Model Context Protocol an agent runtime needs to
//! discover and call tools: `initialize`, `ping`, `tools/list` and
//! `tools/call`, all POSTed to `/mcp`.

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Value, json};
use tower_http::trace::TraceLayer;
use tracing::{debug, info};

use crate::error::Result;
use crate::tools::{ToolContext, ToolRegistry};

pub const PROTOCOL_VERSION: &str = "2024-11-05";

pub const PARSE_ERROR: i64 = -32700;
pub const METHOD_NOT_FOUND: i64 = -32601;
pub const INVALID_PARAMS: i64 = -32602;

pub struct ServerState {
    pub tools: ToolRegistry,
    pub ctx: ToolContext,
}

#[derive(Debug, Deserialize)]
pub struct RpcRequest {
    /// Absent for notifications. An explicit `null` is still a request.
    #[serde(default, deserialize_with = "present_id")]
    pub id: Option<Value>,
    pub method: String,
    #[serde(default)]
    pub params: Value,
}

fn present_id<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Value>, D::Error> {
    Value::deserialize(deserializer).map(Some)
}

#[derive(Debug, Serialize)]
pub struct RpcResponse {
    pub jsonrpc: &'static str,
    pub id: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<RpcError>,
}

#[derive(Debug, Serialize)]
pub struct RpcError {
    pub code: i64,
    pub message: String,
}

impl RpcResponse {
    fn success(id: Value, result: Value) -> Self {
        Self {
            jsonrpc: "2.0",
            id,
            result: Some(result),
            error: None,
        }
    }

    fn failure(id: Value, code: i64, message: impl Into<String>) -> Self {
        Self {
            jsonrpc: "2.0",
            id,
            result: None,
            error: Some(RpcError {
                code,
                message: message.into(),
            }),
        }
    }
}

pub fn build_router(state: Arc<ServerState>) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/mcp", post(rpc_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn serve(state: Arc<ServerState>, bind_addr: &str) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(bind_addr).await?;
    info!("Listening on {}", listener.local_addr()?);
    axum::serve(listener, build_router(state)).await?;
    Ok(())
}

async fn health_handler(State(state): State<Arc<ServerState>>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
        "active_runs": state.ctx.orchestrator.registry().active_count(),
    }))
}

async fn rpc_handler(State(state): State<Arc<ServerState>>, body: Bytes) -> Response {
    let request = match serde_json::from_slice::<RpcRequest>(&body) {
        Ok(request) => request,
        Err(e) => {
            return Json(RpcResponse::failure(
                Value::Null,
                PARSE_ERROR,
                format!("Parse error: {e}"),
            ))
            .into_response();
        }
    };

    match dispatch(&state, request).await {
        Some(response) => Json(response).into_response(),
        None => StatusCode::ACCEPTED.into_response(),
    }
}

/// Handle one request. Notifications get no response.
pub async fn dispatch(state: &ServerState, request: RpcRequest) -> Option<RpcResponse> {
    let Some(id) = request.id else {
        debug!(method = %request.method, "notification");
        return None;
    };

    let response = match request.method.as_str() {
        "initialize" => {
            let version = request
                .params
                .get("protocolVersion")
                .and_then(Value::as_str)
                .unwrap_or(PROTOCOL_VERSION);
            RpcResponse::success(
                id,
                json!({
                    "protocolVersion": version,
                    "capabilities": { "tools": { "listChanged": false } },
                    "serverInfo": {
                        "name": env!("CARGO_PKG_NAME"),
                        "version": env!("CARGO_PKG_VERSION"),
                    }
                }),
            )
        }
        "ping" => RpcResponse::success(id, json!({})),
        "tools/list" => RpcResponse::success(id, json!({ "tools": state.tools.schemas() })),
        "tools/call" => call_tool(state, id, request.params).await,
        other => RpcResponse::failure(id, METHOD_NOT_FOUND, format!("Method not found: {other}")),
    };
    Some(response)
}

async fn call_tool(state: &ServerState, id: Value, params: Value) -> RpcResponse {
    let Some(name) = params.get("name").and_then(Value::as_str) else {
        return RpcResponse::failure(id, INVALID_PARAMS, "tools/call requires a tool `name`");
    };
    let arguments = match params.get("arguments") {
        None | Some(Value::Null) => json!({}),
        Some(args) => args.clone(),
    };

    match state.tools.invoke(&state.ctx, name, arguments).await {
        Ok(text) => RpcResponse::success(
            id,
            json!({
                "content": [{ "type": "text", "text": text }],
                "isError": false,
            }),
        ),
        // Only an unknown tool surfaces here.
        Err(e) => RpcResponse::failure(id, INVALID_PARAMS, e.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::JobpilotConfig;
    use crate::testing::tool_context;

    fn state() -> ServerState {
        let (ctx, _) = tool_context(JobpilotConfig::default());
        ServerState {
            tools: ToolRegistry::with_defaults(),
            ctx,
        }
    }

    fn request(id: Option<Value>, method: &str, params: Value) -> RpcRequest {
        RpcRequest {
            id,
            method: method.to_string(),
            params,
        }
    }

    #[tokio::test]
    async fn initialize_echoes_protocol_version() {
        let response = dispatch(
            &state(),
            request(
                Some(json!(1)),
                "initialize",
                json!({"protocolVersion": "2025-03-26"}),
            ),
        )
        .await
        .unwrap();

        let result = response.result.unwrap();
        assert_eq!(result["protocolVersion"], "2025-03-26");
        assert_eq!(result["serverInfo"]["name"], "jobpilot");
    }

    #[tokio::test]
    async fn notifications_get_no_response() {
        let response = dispatch(
            &state(),
            request(None, "notifications/initialized", Value::Null),
        )
        .await;
        assert!(response.is_none());
    }

    #[tokio::test]
    async fn tools_list_returns_catalogue() {
        let response = dispatch(&state(), request(Some(json!("a")), "tools/list", Value::Null))
            .await
            .unwrap();
        let value = serde_json::to_value(&response).unwrap();

        assert_eq!(value["id"], "a");
        let tools = value["result"]["tools"].as_array().unwrap();
        assert_eq!(tools.len(), 8);
        assert!(tools.iter().any(|t| t["name"] == "fill_form"
            && t["inputSchema"]["required"] == json!(["url"])));
    }

    #[tokio::test]
    async fn tools_call_wraps_text_content() {
        let response = dispatch(
            &state(),
            request(
                Some(json!(7)),
                "tools/call",
                json!({"name": "export_applications"}),
            ),
        )
        .await
        .unwrap();
        let value = serde_json::to_value(&response).unwrap();

        assert_eq!(
            value["result"],
            json!({
                "content": [{"type": "text", "text": "company_name,job_title"}],
                "isError": false
            })
        );
        assert!(value.get("error").is_none());
    }

    #[tokio::test]
    async fn tool_failure_stays_in_result() {
        let response = dispatch(
            &state(),
            request(
                Some(json!(8)),
                "tools/call",
                json!({"name": "fill_form", "arguments": {"url": "https://jobs.example"}}),
            ),
        )
        .await
        .unwrap();

        let result = response.result.unwrap();
        assert_eq!(result["isError"], false);
        assert!(
            result["content"][0]["text"]
                .as_str()
                .unwrap()
                .starts_with("fill_form failed: Config error: missing BROWSERBASE_API_KEY")
        );
    }

    #[tokio::test]
    async fn unknown_tool_and_method_are_protocol_errors() {
        let state = state();

        let response = dispatch(
            &state,
            request(Some(json!(2)), "tools/call", json!({"name": "nope"})),
        )
        .await
        .unwrap();
        let error = response.error.unwrap();
        assert_eq!(error.code, INVALID_PARAMS);
        assert_eq!(error.message, "Unknown tool: nope");

        let response = dispatch(&state, request(Some(json!(3)), "resources/list", Value::Null))
            .await
            .unwrap();
        assert_eq!(response.error.unwrap().code, METHOD_NOT_FOUND);

        let response = dispatch(&state, request(Some(json!(4)), "tools/call", json!({})))
            .await
            .unwrap();
        assert_eq!(response.error.unwrap().code, INVALID_PARAMS);
    }

    #[tokio::test]
    async fn null_id_is_answered() {
        let req: RpcRequest =
            serde_json::from_str(r#"{"jsonrpc":"2.0","id":null,"method":"ping"}"#).unwrap();
        assert_eq!(req.id, Some(Value::Null));

        let response = dispatch(&state(), req).await.unwrap();
        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(value["id"], Value::Null);
        assert_eq!(value["result"], json!({}));
    }

    #[test]
    fn missing_id_is_a_notification() {
        let req: RpcRequest =
            serde_json::from_str(r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#)
                .unwrap();
        assert!(req.id.is_none());
    }

    #[test]
    fn request_parses_without_params() {
        let req: RpcRequest =
            serde_json::from_str(r#"{"jsonrpc":"2.0","id":1,"method":"ping"}"#).unwrap();
        assert_eq!(req.id, Some(json!(1)));
        assert!(req.params.is_null());
    }
}
