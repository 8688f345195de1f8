//! Built-in demo tools: arithmetic and weather.
//!
//! Each tool is constructed via [`FnTool::new`] and returned as `Arc<dyn Tool>`.
//!
//! ```rust
//! use tool_graph::tools::builtin::arithmetic_tools;
//! use tool_graph::tools::ToolRegistry;
//!
//! let registry = ToolRegistry::from_tools(arithmetic_tools()).unwrap();
//! assert_eq!(registry.len(), 3);
//! ```

use std::sync::Arc;

use crate::error::GraphError;
use crate::tools::tool::{FnTool, Tool, ToolContext};
use crate::tools::types::ToolParameters;

fn number_pair() -> ToolParameters {
    ToolParameters::object()
        .number("a", "First number", true)
        .number("b", "Second number", true)
        .build()
}

/// Create the `add` tool.
pub fn add_tool() -> Arc<dyn Tool> {
    Arc::new(FnTool::new(
        "add",
        "Add two numbers",
        number_pair(),
        |args, _ctx: ToolContext| async move {
            let (a, b) = (args.get_f64("a")?, args.get_f64("b")?);
            Ok(serde_json::json!(a + b))
        },
    ))
}

/// Create the `multiply` tool.
pub fn multiply_tool() -> Arc<dyn Tool> {
    Arc::new(FnTool::new(
        "multiply",
        "Multiply two numbers",
        number_pair(),
        |args, _ctx: ToolContext| async move {
            let (a, b) = (args.get_f64("a")?, args.get_f64("b")?);
            Ok(serde_json::json!(a * b))
        },
    ))
}

/// Create the `divide` tool. Division by zero is a tool error.
pub fn divide_tool() -> Arc<dyn Tool> {
    Arc::new(FnTool::new(
        "divide",
        "Divide two numbers",
        number_pair(),
        |args, _ctx: ToolContext| async move {
            let (a, b) = (args.get_f64("a")?, args.get_f64("b")?);
            if b == 0.0 {
                return Err(GraphError::tool("divide", "division by zero"));
            }
            Ok(serde_json::json!(a / b))
        },
    ))
}

/// `add`, `multiply` and `divide`, in that order.
pub fn arithmetic_tools() -> Vec<Arc<dyn Tool>> {
    vec![add_tool(), multiply_tool(), divide_tool()]
}

/// Create the `get_weather` tool.
pub fn weather_tool() -> Arc<dyn Tool> {
    Arc::new(FnTool::new(
        "get_weather",
        "Get the weather for a given city",
        ToolParameters::object()
            .string("city", "City name", true)
            .build(),
        |args, _ctx: ToolContext| async move {
            let city = args.get_str("city")?;
            Ok(serde_json::json!(format!("It's always sunny in {city}!")))
        },
    ))
}

/// Create the `get_user_location` tool.
///
/// Reads `user_id` from the runtime context: user `"1"` lives in Florida,
/// everyone else in SF.
pub fn user_location_tool() -> Arc<dyn Tool> {
    Arc::new(FnTool::new(
        "get_user_location",
        "Retrieve user information based on user ID",
        ToolParameters::empty(),
        |_args, ctx: ToolContext| async move {
            let location = match ctx.runtime_str("user_id") {
                Some("1") => "Florida",
                _ => "SF",
            };
            Ok(serde_json::json!(location))
        },
    ))
}

/// `get_weather` and `get_user_location`, in that order.
pub fn weather_tools() -> Vec<Arc<dyn Tool>> {
    vec![weather_tool(), user_location_tool()]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::arguments::ToolArguments;
    use crate::tools::types::render_output;
    use serde_json::json;

    async fn run(tool: Arc<dyn Tool>, args: serde_json::Value, ctx: ToolContext) -> String {
        let value = tool
            .execute(&ToolArguments::new(args), &ctx)
            .await
            .expect("tool should succeed");
        render_output(&value)
    }

    #[tokio::test]
    async fn arithmetic_tools_compute() {
        let ctx = ToolContext::default();

        assert_eq!(run(add_tool(), json!({ "a": 3, "b": 4 }), ctx.clone()).await, "7");
        assert_eq!(run(multiply_tool(), json!({ "a": 7, "b": 2 }), ctx.clone()).await, "14");
        assert_eq!(run(divide_tool(), json!({ "a": 1, "b": 4 }), ctx).await, "0.25");
    }

    #[tokio::test]
    async fn divide_by_zero_is_a_tool_error() {
        let err = divide_tool()
            .execute(
                &ToolArguments::new(json!({ "a": 1, "b": 0 })),
                &ToolContext::default(),
            )
            .await
            .unwrap_err();

        assert!(err.is_recoverable());
        assert!(err.to_string().contains("division by zero"));
    }

    #[tokio::test]
    async fn missing_operand_is_an_invalid_argument() {
        let err = add_tool()
            .execute(&ToolArguments::new(json!({ "a": 1 })), &ToolContext::default())
            .await
            .unwrap_err();

        assert!(matches!(err, GraphError::InvalidArgument(ref m) if m == "Missing number argument: b"));
    }

    #[tokio::test]
    async fn weather_is_always_sunny() {
        let text = run(weather_tool(), json!({ "city": "Tokyo" }), ToolContext::default()).await;

        assert_eq!(text, "It's always sunny in Tokyo!");
    }

    #[tokio::test]
    async fn user_location_depends_on_runtime_user() {
        let florida = ToolContext {
            runtime: json!({ "user_id": "1" }),
            ..ToolContext::default()
        };
        let other = ToolContext {
            runtime: json!({ "user_id": "2" }),
            ..ToolContext::default()
        };

        assert_eq!(run(user_location_tool(), json!({}), florida).await, "Florida");
        assert_eq!(run(user_location_tool(), json!({}), other).await, "SF");
        assert_eq!(run(user_location_tool(), json!({}), ToolContext::default()).await, "SF");
    }
}
