//! Tool step: execute the tool calls of the last assistant message.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use super::state::{ConversationState, StateDelta};
use crate::error::GraphError;
use crate::tools::{render_output, validate_arguments, Tool, ToolArguments, ToolContext, ToolRegistry};
use crate::types::{Message, ToolCall};
use crate::util::cancel::run_cancellable;

/// Runs requested tools sequentially, in the order the model listed them.
#[derive(Debug, Clone)]
pub struct ToolStep {
    registry: Arc<ToolRegistry>,
}

impl ToolStep {
    pub fn new(registry: Arc<ToolRegistry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    /// Execute every tool call of the last message.
    ///
    /// Returns one `ToolResult` per call, in call order. A last message that
    /// is absent or not from the assistant yields an empty delta. Unknown
    /// tool names are fatal and detected before any tool runs. Validation
    /// and execution failures become error results. `base` supplies the
    /// thread id and runtime context; the per-call fields are filled in here.
    pub async fn run(
        &self,
        state: &ConversationState,
        base: &ToolContext,
        cancel: &CancellationToken,
    ) -> Result<StateDelta, GraphError> {
        let Some(Message::Assistant { tool_calls, .. }) = state.last_message() else {
            return Ok(StateDelta::empty());
        };

        let resolved = tool_calls
            .iter()
            .map(|call| -> Result<_, GraphError> {
                Ok((call, self.registry.lookup(&call.name)?.clone()))
            })
            .collect::<Result<Vec<_>, GraphError>>()?;

        let mut results = Vec::with_capacity(resolved.len());
        for (call, tool) in resolved {
            if cancel.is_cancelled() {
                return Err(GraphError::Cancelled);
            }
            results.push(execute_call(call, tool.as_ref(), base, cancel).await?);
        }
        Ok(StateDelta::messages(results))
    }
}

async fn execute_call(
    call: &ToolCall,
    tool: &dyn Tool,
    base: &ToolContext,
    cancel: &CancellationToken,
) -> Result<Message, GraphError> {
    let arguments = normalize_arguments(&call.arguments);
    if let Err(message) = validate_arguments(&arguments, &tool.parameters().schema) {
        let err = GraphError::ToolArgumentValidation {
            tool_name: call.name.clone(),
            message,
        };
        return Ok(recovered(call, err));
    }

    let ctx = ToolContext {
        tool_call_id: Some(call.id.clone()),
        tool_name: Some(call.name.clone()),
        thread_id: base.thread_id.clone(),
        runtime: base.runtime.clone(),
    };
    let args = ToolArguments::new(arguments);
    match run_cancellable(cancel, tool.execute(&args, &ctx)).await {
        Ok(value) => {
            tracing::debug!(tool_name = %call.name, tool_call_id = %call.id, "tool completed");
            Ok(Message::tool_result(&call.id, render_output(&value)))
        }
        Err(GraphError::Cancelled) => Err(GraphError::Cancelled),
        Err(err) if err.is_recoverable() => Ok(recovered(call, err)),
        Err(err) => Ok(recovered(call, GraphError::tool(&call.name, err.to_string()))),
    }
}

/// Turn a recoverable failure into an error result the model can read.
fn recovered(call: &ToolCall, err: GraphError) -> Message {
    tracing::warn!(
        tool_name = %call.name,
        tool_call_id = %call.id,
        error = %err,
        "tool call failed"
    );
    let text = match err {
        GraphError::ToolArgumentValidation { message, .. } => {
            format!("Argument validation failed: {message}")
        }
        GraphError::ToolExecution { message, .. } => message,
        other => other.to_string(),
    };
    Message::tool_error(&call.id, text)
}

/// Some models send arguments as a JSON-encoded string; decode those.
fn normalize_arguments(arguments: &serde_json::Value) -> serde_json::Value {
    match arguments {
        serde_json::Value::String(raw) => {
            serde_json::from_str(raw).unwrap_or_else(|_| arguments.clone())
        }
        serde_json::Value::Null => serde_json::Value::Object(Default::default()),
        other => other.clone(),
    }
}
