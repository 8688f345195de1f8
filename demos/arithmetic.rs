//! Arithmetic agent: the model chains `add` and `multiply` to answer
//! "Add 3 and 4, then multiply by 2".
//!
//! Run with `cargo run --example arithmetic`. Set `RUST_LOG=tool_graph=debug`
//! to watch the loop.

use std::sync::Arc;

use serde_json::json;
use tool_graph::prelude::*;
use tool_graph::tools::builtin::arithmetic_tools;
use tracing_subscriber::EnvFilter;

const SYSTEM_PROMPT: &str =
    "You are a helpful assistant tasked with performing arithmetic on a set of inputs.";

#[tokio::main]
async fn main() -> tool_graph::error::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let model = Arc::new(ScriptedModel::new([
        ModelResponse::tool_calls(vec![ToolCall::new("", "add", json!({ "a": 3, "b": 4 }))]),
        ModelResponse::tool_calls(vec![ToolCall::new("", "multiply", json!({ "a": 7, "b": 2 }))]),
        ModelResponse::text("14"),
    ]));
    let config = GraphConfig::from_env().with_system_prompt(SYSTEM_PROMPT);
    let graph = AgentGraph::builder(model)
        .tools(ToolRegistry::from_tools(arithmetic_tools())?)
        .config(config)
        .build();

    let outcome = graph
        .invoke(
            vec![Message::human("Add 3 and 4. Multiply the output by 2.")],
            InvokeConfig::new(),
        )
        .await?;

    println!("{}", transcript(&outcome.messages));
    println!("model calls: {}", outcome.call_count);
    Ok(())
}
