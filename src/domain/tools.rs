//! Interactive tools exposed via Model Context Protocol
//!
//! Provides the tool registry and the `add` arithmetic tool. Tool failures of
//! any kind are reported as `isError` outcomes, never as protocol errors, so
//! a misbehaving tool can never take the session down with it.

use std::sync::Arc;

use async_trait::async_trait;
use rust_mcp_sdk::{
    macros,
    schema::{CallToolResult, ContentBlock, TextContent, Tool},
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};

use crate::errors::AppError;
use crate::mcp::rpc::json_rpc_result;
use crate::AppState;

/// A named, schema-described unit of server-side logic invocable by a peer.
#[async_trait]
pub trait ToolHandler: Send + Sync {
    fn descriptor(&self) -> Tool;

    /// Errors returned here are converted into `isError` outcomes by the
    /// registry; handlers never need to build their own failure envelopes
    /// except where an exact message is required.
    async fn call(&self, arguments: &Map<String, Value>) -> Result<CallToolResult, AppError>;
}

struct RegisteredTool {
    name: String,
    handler: Arc<dyn ToolHandler>,
}

/// Fully populated before the dispatcher starts, immutable thereafter.
#[derive(Default)]
pub struct ToolRegistry {
    tools: Vec<RegisteredTool>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_builtin_tools() -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(AddHandler));
        registry
    }

    pub fn register(&mut self, handler: Arc<dyn ToolHandler>) {
        self.tools.push(RegisteredTool {
            name: handler.descriptor().name,
            handler,
        });
    }

    pub fn tool_names(&self) -> Vec<String> {
        self.tools.iter().map(|tool| tool.name.clone()).collect()
    }

    /// Descriptors in registration order.
    pub fn list(&self) -> Vec<Tool> {
        self.tools
            .iter()
            .map(|tool| tool.handler.descriptor())
            .collect()
    }

    /// Infallible by contract: unknown names and handler faults both come
    /// back as `isError` outcomes.
    pub async fn invoke(&self, name: &str, arguments: &Map<String, Value>) -> CallToolResult {
        let Some(entry) = self.tools.iter().find(|tool| tool.name == name) else {
            return error_outcome(format!("Unknown tool: {name}"));
        };

        match entry.handler.call(arguments).await {
            Ok(outcome) => outcome,
            Err(err) => error_outcome(format!("Error performing {name}: {err}")),
        }
    }
}

/// `tools/call` entry point: extracts the target name and argument map and
/// wraps the invocation outcome in a result envelope. A missing `arguments`
/// member means an empty argument map, not an error.
pub async fn handle_tools_call(state: &AppState, id: Option<Value>, params: &Value) -> Value {
    let name = params.get("name").and_then(Value::as_str).unwrap_or_default();
    let arguments = params
        .get("arguments")
        .and_then(Value::as_object)
        .cloned()
        .unwrap_or_default();

    let outcome = state.registry.invoke(name, &arguments).await;
    json_rpc_result(
        id,
        serde_json::to_value(outcome).expect("tool outcome serialization"),
    )
}

pub fn text_outcome(text: impl Into<String>) -> CallToolResult {
    CallToolResult {
        content: vec![ContentBlock::from(TextContent::new(text.into(), None, None))],
        is_error: Some(false),
        meta: None,
        structured_content: None,
    }
}

pub fn error_outcome(text: impl Into<String>) -> CallToolResult {
    CallToolResult {
        content: vec![ContentBlock::from(TextContent::new(text.into(), None, None))],
        is_error: Some(true),
        meta: None,
        structured_content: None,
    }
}

#[macros::mcp_tool(name = "add", description = "Add two numbers together")]
#[derive(Debug, Deserialize, Serialize, macros::JsonSchema)]
pub struct AddTool {
    /// First number to add
    pub a: f64,
    /// Second number to add
    pub b: f64,
}

/// The declared schema marks `a` and `b` as required, but the schema is
/// advisory metadata only: the handler extracts operands by hand and reports
/// missing ones as a normal outcome.
#[derive(Debug, Default)]
pub struct AddHandler;

#[async_trait]
impl ToolHandler for AddHandler {
    fn descriptor(&self) -> Tool {
        AddTool::tool()
    }

    async fn call(&self, arguments: &Map<String, Value>) -> Result<CallToolResult, AppError> {
        let (Some(a), Some(b)) = (operand(arguments, "a"), operand(arguments, "b")) else {
            return Ok(error_outcome("Missing required arguments 'a' and/or 'b'"));
        };

        let (Value::Number(a), Value::Number(b)) = (a, b) else {
            return Err(AppError::invalid_arguments(
                "non_numeric_operand",
                "arguments 'a' and 'b' must be numbers",
            ));
        };

        let sum = add_numbers(a, b)?;
        Ok(text_outcome(format!(
            "The sum of {} and {} is {}",
            format_number(a),
            format_number(b),
            format_number(&sum)
        )))
    }
}

/// JSON `null` counts as absent, matching `Map::get` on a missing key.
fn operand<'a>(arguments: &'a Map<String, Value>, key: &str) -> Option<&'a Value> {
    arguments.get(key).filter(|value| !value.is_null())
}

/// Two integers stay exact; anything else promotes to `f64`.
fn add_numbers(a: &Number, b: &Number) -> Result<Number, AppError> {
    if let (Some(lhs), Some(rhs)) = (a.as_i64(), b.as_i64()) {
        let sum = lhs.checked_add(rhs).ok_or_else(|| {
            AppError::invalid_arguments(
                "integer_overflow",
                format!("integer addition of {lhs} and {rhs} overflowed"),
            )
        })?;
        return Ok(Number::from(sum));
    }

    let (Some(lhs), Some(rhs)) = (a.as_f64(), b.as_f64()) else {
        return Err(AppError::invalid_arguments(
            "out_of_range",
            "operands exceed the representable numeric range",
        ));
    };

    Number::from_f64(lhs + rhs).ok_or_else(|| {
        AppError::invalid_arguments("non_finite_sum", "addition produced a non-finite value")
    })
}

/// Whole floats keep one decimal place (`8.0`) so a float operand is
/// distinguishable from an integer one in the summary text.
fn format_number(value: &Number) -> String {
    match value.as_f64() {
        Some(float) if value.is_f64() && float.is_finite() && float.fract() == 0.0 => {
            format!("{float:.1}")
        }
        _ => value.to_string(),
    }
}
