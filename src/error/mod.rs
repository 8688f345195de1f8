//! Error types for tool-graph.

use thiserror::Error;

/// Primary error type for registry, step and executor operations.
#[derive(Error, Debug)]
pub enum GraphError {
    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    #[error("Duplicate tool name: {0}")]
    DuplicateToolName(String),

    #[error("Argument validation failed for {tool_name}: {message}")]
    ToolArgumentValidation { tool_name: String, message: String },

    #[error("Tool execution error: {tool_name}: {message}")]
    ToolExecution { tool_name: String, message: String },

    #[error("Model invocation error: {0}")]
    ModelInvocation(String),

    #[error("Max iterations exceeded (max_calls={max_calls})")]
    MaxIterationsExceeded { max_calls: usize },

    #[error("Run cancelled")]
    Cancelled,

    #[error("Timeout after {0}ms")]
    Timeout(u64),

    #[error("Checkpoint error: {0}")]
    Checkpoint(String),

    #[error("Structured response error: {0}")]
    StructuredResponse(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Broad error category used to decide how the executor propagates a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Registry misconfiguration (unknown or duplicate tool names).
    Registry,
    /// Tool-level failures; downgraded to `ToolResult` text by the tool step.
    Tool,
    /// The model collaborator failed or timed out.
    Model,
    /// The run hit its iteration bound or was cancelled.
    Control,
    Persistence,
    Configuration,
    Serialization,
}

impl GraphError {
    /// Create a tool execution error.
    pub fn tool(tool_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ToolExecution {
            tool_name: tool_name.into(),
            message: message.into(),
        }
    }

    /// Classify this error into a category.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::UnknownTool(_) | Self::DuplicateToolName(_) => ErrorCategory::Registry,
            Self::ToolArgumentValidation { .. } | Self::ToolExecution { .. } => {
                ErrorCategory::Tool
            }
            Self::InvalidArgument(_) => ErrorCategory::Tool,
            Self::ModelInvocation(_) | Self::Timeout(_) => ErrorCategory::Model,
            Self::MaxIterationsExceeded { .. } | Self::Cancelled => ErrorCategory::Control,
            Self::Checkpoint(_) | Self::Io(_) => ErrorCategory::Persistence,
            Self::Configuration(_) | Self::StructuredResponse(_) => ErrorCategory::Configuration,
            Self::Serialization(_) => ErrorCategory::Serialization,
        }
    }

    /// Whether this is a tool-level failure the model can read and react to.
    ///
    /// The tool step reports these as error `ToolResult`s. Any other error a
    /// tool returns, except `Cancelled`, is first wrapped as `ToolExecution`.
    pub fn is_recoverable(&self) -> bool {
        matches!(self.category(), ErrorCategory::Tool)
    }

    /// Whether the run stopped because the caller cancelled it.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

/// Convenience alias.
pub type Result<T> = std::result::Result<T, GraphError>;
