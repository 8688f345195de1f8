//! Convenience re-exports for common use.

pub use crate::checkpoint::{Checkpointer, FileCheckpointer, MemorySaver};
pub use crate::config::GraphConfig;
pub use crate::error::{GraphError, Result};
pub use crate::graph::{AgentGraph, ConversationState, InvokeConfig, InvokeOutcome, Route};
pub use crate::model::{ChatModel, ModelRequest, ModelResponse, ScriptedModel};
pub use crate::tools::{FnTool, Tool, ToolArguments, ToolContext, ToolParameters, ToolRegistry};
pub use crate::types::{transcript, Message, MessageKind, ToolCall};
