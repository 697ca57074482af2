//! JSON-RPC response envelope construction and formatting utilities
//!
//! Every reply this server emits is a `result` envelope; see [`method_not_found`]
//! for how protocol-level errors are folded into that shape.

use rust_mcp_sdk::schema::{JsonrpcResultResponse, RequestId, Result as McpResult};
use serde_json::{json, Value};

pub const METHOD_NOT_FOUND: i64 = -32601;

pub fn json_rpc_result(id: Option<Value>, result: Value) -> Value {
    if let Some(request_id) = id.as_ref().and_then(value_to_request_id) {
        let extra = result.as_object().cloned();
        let response = JsonrpcResultResponse::new(request_id, McpResult { meta: None, extra });
        return serde_json::to_value(response).expect("jsonrpc result response serialization");
    }

    json!({
        "jsonrpc": "2.0",
        "id": id,
        "result": result
    })
}

/// Unknown methods answer with the error object nested inside `result`.
/// JSON-RPC 2.0 puts errors at the top level, but deployed peers of this
/// endpoint parse `result.error`, so the nesting is part of the wire contract.
pub fn method_not_found(id: Option<Value>, method: &str) -> Value {
    json_rpc_result(
        id,
        json!({
            "error": {
                "code": METHOD_NOT_FOUND,
                "message": format!("Method not found: {method}"),
            }
        }),
    )
}

pub fn is_error_result(response: &Value) -> bool {
    response.pointer("/result/error").is_some()
        || response
            .pointer("/result/isError")
            .and_then(Value::as_bool)
            .unwrap_or(false)
}

pub fn value_to_request_id(value: &Value) -> Option<RequestId> {
    if let Some(string_id) = value.as_str() {
        return Some(RequestId::String(string_id.to_string()));
    }

    value.as_i64().map(RequestId::Integer)
}
