//! Shared test helpers.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use serde_json::json;
use tool_graph::graph::{GraphEvent, GraphEventSink};
use tool_graph::model::ModelResponse;
use tool_graph::types::ToolCall;

pub fn call(id: &str, name: &str, arguments: serde_json::Value) -> ModelResponse {
    ModelResponse::tool_calls(vec![ToolCall::new(id, name, arguments)])
}

pub fn add(id: &str, a: i64, b: i64) -> ModelResponse {
    call(id, "add", json!({ "a": a, "b": b }))
}

pub fn multiply(id: &str, a: i64, b: i64) -> ModelResponse {
    call(id, "multiply", json!({ "a": a, "b": b }))
}

/// Event sink that records everything it receives.
pub fn recording_sink() -> (GraphEventSink, Arc<Mutex<Vec<GraphEvent>>>) {
    let events = Arc::new(Mutex::new(Vec::new()));
    let recorded = events.clone();
    let sink: GraphEventSink = Arc::new(move |event| {
        recorded.lock().unwrap().push(event);
    });
    (sink, events)
}
