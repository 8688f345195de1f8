//! Smallest possible graph: one model turn, no tools.
//!
//! Run with `cargo run --example hello`.

use std::sync::Arc;

use tool_graph::prelude::*;

#[tokio::main]
async fn main() -> tool_graph::error::Result<()> {
    let model = Arc::new(ScriptedModel::new([ModelResponse::text("hello world")]).with_name("mock_llm"));
    let graph = AgentGraph::builder(model).build();

    let outcome = graph
        .invoke(vec![Message::human("hi!")], InvokeConfig::new())
        .await?;

    println!("{}", transcript(&outcome.messages));
    Ok(())
}
