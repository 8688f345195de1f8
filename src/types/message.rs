//! Message types exchanged between the executor, the model and the tools.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// A message in a conversation.
///
/// Closed set of variants; router and tool step match on it exhaustively.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "role", rename_all = "snake_case")]
pub enum Message {
    /// Instructions for the model. At most once, always first when present.
    System { text: String },
    /// User input.
    Human { text: String },
    /// Model output, possibly requesting tool invocations.
    Assistant {
        text: String,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        tool_calls: Vec<ToolCall>,
    },
    /// Result of one tool invocation.
    ToolResult {
        tool_call_id: String,
        text: String,
        #[serde(default)]
        is_error: bool,
    },
}

impl Message {
    /// Create a system message.
    pub fn system(text: impl Into<String>) -> Self {
        Self::System { text: text.into() }
    }

    /// Create a human message.
    pub fn human(text: impl Into<String>) -> Self {
        Self::Human { text: text.into() }
    }

    /// Create an assistant message without tool calls.
    pub fn assistant(text: impl Into<String>) -> Self {
        Self::Assistant {
            text: text.into(),
            tool_calls: Vec::new(),
        }
    }

    /// Create an assistant message that requests tool calls.
    pub fn assistant_with_tool_calls(text: impl Into<String>, tool_calls: Vec<ToolCall>) -> Self {
        Self::Assistant {
            text: text.into(),
            tool_calls,
        }
    }

    /// Create a successful tool result message.
    pub fn tool_result(tool_call_id: impl Into<String>, text: impl Into<String>) -> Self {
        Self::ToolResult {
            tool_call_id: tool_call_id.into(),
            text: text.into(),
            is_error: false,
        }
    }

    /// Create a tool result message carrying error text.
    pub fn tool_error(tool_call_id: impl Into<String>, text: impl Into<String>) -> Self {
        Self::ToolResult {
            tool_call_id: tool_call_id.into(),
            text: text.into(),
            is_error: true,
        }
    }

    pub fn kind(&self) -> MessageKind {
        match self {
            Self::System { .. } => MessageKind::System,
            Self::Human { .. } => MessageKind::Human,
            Self::Assistant { .. } => MessageKind::Ai,
            Self::ToolResult { .. } => MessageKind::Tool,
        }
    }

    /// Text content of the message.
    pub fn text(&self) -> &str {
        match self {
            Self::System { text }
            | Self::Human { text }
            | Self::Assistant { text, .. }
            | Self::ToolResult { text, .. } => text,
        }
    }

    /// Tool calls requested by this message. Empty for anything but `Assistant`.
    pub fn tool_calls(&self) -> &[ToolCall] {
        match self {
            Self::Assistant { tool_calls, .. } => tool_calls,
            Self::System { .. } | Self::Human { .. } | Self::ToolResult { .. } => &[],
        }
    }

    pub fn is_assistant(&self) -> bool {
        matches!(self, Self::Assistant { .. })
    }
}

/// Message kind, displayed the way transcripts label each line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum MessageKind {
    System,
    Human,
    Ai,
    Tool,
}

/// A tool invocation requested by the model.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ToolCall {
    pub id: String,
    pub name: String,
    pub arguments: serde_json::Value,
}

impl ToolCall {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        arguments: serde_json::Value,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            arguments,
        }
    }
}

/// Render messages as `[kind]: text` lines.
pub fn transcript(messages: &[Message]) -> String {
    messages
        .iter()
        .map(|message| format!("[{}]: {}", message.kind(), message.text()))
        .collect::<Vec<_>>()
        .join("\n")
}
