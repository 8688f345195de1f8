//! Chat model collaborator: the trait the model step calls, plus a scripted
//! implementation for tests and demos.

pub mod scripted;

use async_trait::async_trait;

use crate::error::GraphError;
use crate::tools::ToolDescriptor;
use crate::types::{Message, ToolCall};

pub use scripted::ScriptedModel;

/// A request sent to the model: the full prompt plus the advertised tools.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelRequest {
    pub messages: Vec<Message>,
    pub tools: Vec<ToolDescriptor>,
}

/// One assistant reply.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ModelResponse {
    pub text: String,
    pub tool_calls: Vec<ToolCall>,
}

impl ModelResponse {
    /// A final answer with no tool calls.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            tool_calls: Vec::new(),
        }
    }

    /// A reply requesting tool calls.
    pub fn tool_calls(tool_calls: Vec<ToolCall>) -> Self {
        Self {
            text: String::new(),
            tool_calls,
        }
    }

    pub fn into_message(self) -> Message {
        Message::Assistant {
            text: self.text,
            tool_calls: self.tool_calls,
        }
    }
}

/// Core trait implemented by chat models.
///
/// Implementations own their transport and retry policy; the model step
/// treats any error as fatal for the run.
#[async_trait]
pub trait ChatModel: Send + Sync {
    /// Model name, used in logs.
    fn name(&self) -> &str;

    /// Produce exactly one assistant reply for the prompt.
    async fn invoke(&self, request: &ModelRequest) -> Result<ModelResponse, GraphError>;
}
