//! The central Model Context Protocol engine
//!
//! Provides the primary MCP JSON-RPC method execution routing: the `initialize`
//! handshake, tool listing, tool invocation, and the method-not-found fallback.

use rust_mcp_sdk::schema::{
    Implementation, InitializeResult, ListToolsResult, ProtocolVersion, ServerCapabilities,
    ServerCapabilitiesTools,
};
use serde_json::{json, Value};
use tracing::info;

use crate::domain::tools::handle_tools_call;
use crate::errors::AppError;
use crate::mcp::rpc::{is_error_result, json_rpc_result, method_not_found};
use crate::AppState;

pub const PROTOCOL_VERSION: &str = "2024-11-05";

/// Routes one parsed request to its handler and folds the outcome into a
/// response envelope carrying the request's `id` (`null` when the request
/// carried none).
///
/// The request shape is deliberately not validated: `method` and `params` are
/// extracted untyped and an unrecognized method still gets an answer. The one
/// unrecoverable case is a payload that is not a JSON object, which surfaces
/// as an `Err` for the session loop to log and swallow.
pub async fn handle_request(state: &AppState, payload: Value) -> Result<Value, AppError> {
    let Some(request) = payload.as_object() else {
        return Err(AppError::invalid_request(
            "non_object_request",
            "request payload must be a JSON object",
        ));
    };

    let id = request.get("id").cloned();
    let method = request
        .get("method")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();
    let params = request.get("params").cloned().unwrap_or_else(|| json!({}));
    let audit_params = redacted_params(&params);

    let response = match method.as_str() {
        "initialize" => handle_initialize(id),
        "tools/list" => handle_tools_list(state, id),
        "tools/call" => handle_tools_call(state, id, &params).await,
        _ => method_not_found(id, &method),
    };

    info!(
        method = %method,
        params = %audit_params,
        outcome = if is_error_result(&response) { "failure" } else { "success" },
        "request handled"
    );

    Ok(response)
}

/// The handshake is advisory, not negotiated: the peer's declared protocol
/// version and capabilities are ignored and the same payload is returned for
/// every `initialize`.
fn handle_initialize(id: Option<Value>) -> Value {
    let initialize_result = InitializeResult {
        server_info: Implementation {
            name: env!("CARGO_PKG_NAME").to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            title: None,
            description: None,
            icons: vec![],
            website_url: None,
        },
        capabilities: ServerCapabilities {
            tools: Some(ServerCapabilitiesTools { list_changed: None }),
            ..Default::default()
        },
        protocol_version: ProtocolVersion::V2024_11_05.into(),
        instructions: None,
        meta: None,
    };

    json_rpc_result(
        id,
        serde_json::to_value(initialize_result).expect("initialize result serialization"),
    )
}

fn handle_tools_list(state: &AppState, id: Option<Value>) -> Value {
    json_rpc_result(
        id,
        serde_json::to_value(ListToolsResult {
            meta: None,
            next_cursor: None,
            tools: state.registry.list(),
        })
        .expect("tools list result serialization"),
    )
}

fn redacted_params(params: &Value) -> Value {
    match params {
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(key, item)| {
                    if is_sensitive_key(key) {
                        (key.clone(), Value::String("[REDACTED]".to_string()))
                    } else {
                        (key.clone(), redacted_params(item))
                    }
                })
                .collect(),
        ),
        Value::Array(items) => Value::Array(items.iter().map(redacted_params).collect()),
        _ => params.clone(),
    }
}

fn is_sensitive_key(key: &str) -> bool {
    let normalized = key.trim().to_ascii_lowercase();
    ["token", "secret", "password", "credential", "api_key", "apikey", "authorization"]
        .iter()
        .any(|marker| normalized.contains(marker))
}

#[cfg(test)]
mod tests {
    use super::{handle_request, redacted_params, PROTOCOL_VERSION};
    use crate::domain::tools::ToolRegistry;
    use crate::AppState;
    use serde_json::json;
    use std::sync::Arc;

    fn state() -> AppState {
        AppState::new(Arc::new(ToolRegistry::with_builtin_tools()))
    }

    #[tokio::test]
    async fn initialize_reports_fixed_identity_regardless_of_params() {
        let request = json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": "initialize",
            "params": {"protocolVersion": "1870-01-01", "capabilities": {"everything": true}}
        });

        let response = handle_request(&state(), request).await.expect("envelope");

        assert_eq!(response["jsonrpc"], "2.0");
        assert_eq!(response["id"], 1);
        assert_eq!(response["result"]["protocolVersion"], PROTOCOL_VERSION);
        assert_eq!(response["result"]["serverInfo"]["name"], env!("CARGO_PKG_NAME"));
        assert_eq!(
            response["result"]["serverInfo"]["version"],
            env!("CARGO_PKG_VERSION")
        );
        assert!(response["result"]["capabilities"]["tools"].is_object());
    }

    #[tokio::test]
    async fn tools_list_wraps_registry_descriptors() {
        let request = json!({"jsonrpc": "2.0", "id": 2, "method": "tools/list", "params": {}});

        let response = handle_request(&state(), request).await.expect("envelope");

        assert_eq!(response["id"], 2);
        let tools = response["result"]["tools"].as_array().expect("tools array");
        assert_eq!(tools.len(), 1);
        assert_eq!(tools[0]["name"], "add");
    }

    #[tokio::test]
    async fn tools_call_routes_to_the_registry() {
        let request = json!({
            "jsonrpc": "2.0",
            "id": 3,
            "method": "tools/call",
            "params": {"name": "add", "arguments": {"a": 2, "b": 2}}
        });

        let response = handle_request(&state(), request).await.expect("envelope");

        assert_eq!(response["id"], 3);
        assert_eq!(response["result"]["isError"], false);
        assert_eq!(
            response["result"]["content"][0]["text"],
            "The sum of 2 and 2 is 4"
        );
    }

    #[tokio::test]
    async fn tools_call_defaults_to_an_empty_argument_map() {
        let request = json!({
            "jsonrpc": "2.0",
            "id": 4,
            "method": "tools/call",
            "params": {"name": "add"}
        });

        let response = handle_request(&state(), request).await.expect("envelope");

        assert_eq!(response["result"]["isError"], true);
        assert_eq!(
            response["result"]["content"][0]["text"],
            "Missing required arguments 'a' and/or 'b'"
        );
    }

    #[tokio::test]
    async fn unknown_method_answers_with_nested_error() {
        let request = json!({"jsonrpc": "2.0", "id": 5, "method": "tools/destroy"});

        let response = handle_request(&state(), request).await.expect("envelope");

        assert_eq!(response["id"], 5);
        assert!(response.get("error").is_none());
        assert_eq!(response["result"]["error"]["code"], -32601);
        assert_eq!(
            response["result"]["error"]["message"],
            "Method not found: tools/destroy"
        );
    }

    #[tokio::test]
    async fn missing_id_echoes_null() {
        let request = json!({"jsonrpc": "2.0", "method": "tools/list"});

        let response = handle_request(&state(), request).await.expect("envelope");

        assert!(response["id"].is_null());
        assert!(response["result"]["tools"].is_array());
    }

    #[tokio::test]
    async fn missing_method_falls_through_to_method_not_found() {
        let request = json!({"jsonrpc": "2.0", "id": 6});

        let response = handle_request(&state(), request).await.expect("envelope");

        assert_eq!(response["id"], 6);
        assert_eq!(response["result"]["error"]["code"], -32601);
    }

    #[tokio::test]
    async fn non_object_payload_is_a_handler_fault() {
        let result = handle_request(&state(), json!([1, 2, 3])).await;

        assert!(result.is_err());
    }

    #[test]
    fn redacts_secret_bearing_argument_keys() {
        let params = json!({
            "name": "add",
            "arguments": {
                "a": 1,
                "api_key": "should-not-appear",
                "nested": {"password": "should-not-appear"}
            }
        });

        let redacted = redacted_params(&params);

        assert_eq!(redacted["arguments"]["a"], 1);
        assert_eq!(redacted["arguments"]["api_key"], "[REDACTED]");
        assert_eq!(redacted["arguments"]["nested"]["password"], "[REDACTED]");
    }
}
