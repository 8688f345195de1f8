//! Typed access to tool call arguments.

use crate::error::GraphError;

/// Wrapper around tool call arguments providing typed extraction.
#[derive(Debug, Clone)]
pub struct ToolArguments {
    value: serde_json::Value,
}

impl ToolArguments {
    pub fn new(value: serde_json::Value) -> Self {
        Self { value }
    }

    /// Get a string argument by key.
    pub fn get_str(&self, key: &str) -> Result<&str, GraphError> {
        self.value
            .get(key)
            .and_then(|v| v.as_str())
            .ok_or_else(|| GraphError::InvalidArgument(format!("Missing string argument: {key}")))
    }

    /// Get a number argument. Integers are widened.
    pub fn get_f64(&self, key: &str) -> Result<f64, GraphError> {
        self.value
            .get(key)
            .and_then(|v| v.as_f64())
            .ok_or_else(|| GraphError::InvalidArgument(format!("Missing number argument: {key}")))
    }
}
