//! Model step: one model call producing one assistant message.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use super::state::{ConversationState, StateDelta};
use crate::error::GraphError;
use crate::model::{ChatModel, ModelRequest};
use crate::tools::{ToolDescriptor, ToolRegistry};
use crate::types::{Message, ToolCall};
use crate::util::cancel::run_cancellable;
use crate::util::timeout::with_optional_timeout;

/// Calls the model with the conversation so far and the advertised tools.
#[derive(Clone)]
pub struct ModelStep {
    model: Arc<dyn ChatModel>,
    tools: Vec<ToolDescriptor>,
    system_prompt: Option<String>,
    timeout: Option<Duration>,
}

impl ModelStep {
    /// Bind a model to the tools of `registry`, in registration order.
    pub fn new(model: Arc<dyn ChatModel>, registry: &ToolRegistry) -> Self {
        Self {
            model,
            tools: registry.descriptors(),
            system_prompt: None,
            timeout: None,
        }
    }

    pub fn with_system_prompt(mut self, prompt: Option<String>) -> Self {
        self.system_prompt = prompt.filter(|p| !p.trim().is_empty());
        self
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn tools(&self) -> &[ToolDescriptor] {
        &self.tools
    }

    /// Prompt for the next call: the system prompt, if any, followed by the
    /// state's messages. A non-blank `run_prompt` replaces the configured
    /// one. Neither is ever written back to state.
    pub fn prompt(&self, state: &ConversationState, run_prompt: Option<&str>) -> Vec<Message> {
        let mut messages = Vec::with_capacity(state.messages().len() + 1);
        let prompt = run_prompt
            .filter(|p| !p.trim().is_empty())
            .or(self.system_prompt.as_deref());
        if let Some(prompt) = prompt {
            messages.push(Message::system(prompt));
        }
        messages.extend_from_slice(state.messages());
        messages
    }

    /// Invoke the model once.
    ///
    /// Returns a delta with exactly one assistant message and a call increment
    /// of one. Model errors and timeouts are reported as `ModelInvocation`;
    /// cancellation as `Cancelled`.
    pub async fn run(
        &self,
        state: &ConversationState,
        run_prompt: Option<&str>,
        cancel: &CancellationToken,
    ) -> Result<StateDelta, GraphError> {
        let request = ModelRequest {
            messages: self.prompt(state, run_prompt),
            tools: self.tools.clone(),
        };
        tracing::debug!(
            model = self.model.name(),
            messages = request.messages.len(),
            tools = request.tools.len(),
            "model call"
        );

        let response = run_cancellable(
            cancel,
            with_optional_timeout(self.timeout, self.model.invoke(&request)),
        )
        .await
        .map_err(|err| match err {
            GraphError::Cancelled | GraphError::ModelInvocation(_) => err,
            GraphError::Timeout(ms) => {
                GraphError::ModelInvocation(format!("model call timed out after {ms}ms"))
            }
            other => GraphError::ModelInvocation(other.to_string()),
        })?;

        let mut message = response.into_message();
        if let Message::Assistant { tool_calls, .. } = &mut message {
            assign_call_ids(state, tool_calls);
            tracing::debug!(tool_calls = tool_calls.len(), "model reply");
        }
        Ok(StateDelta::model_turn(message))
    }
}

/// Give every call a non-empty id, unique across the whole conversation.
fn assign_call_ids(state: &ConversationState, tool_calls: &mut [ToolCall]) {
    let mut seen: HashSet<String> = state
        .messages()
        .iter()
        .flat_map(|message| message.tool_calls())
        .map(|call| call.id.clone())
        .collect();
    for call in tool_calls.iter_mut() {
        if call.id.trim().is_empty() || !seen.insert(call.id.clone()) {
            call.id = format!("call_{}", Uuid::new_v4().simple());
            seen.insert(call.id.clone());
        }
    }
}
