//! Weather agent with per-user runtime context, a checkpointed thread and a
//! structured final answer.
//!
//! Run with `cargo run --example weather`.

use std::sync::Arc;

use serde_json::json;
use tool_graph::prelude::*;
use tool_graph::tools::builtin::weather_tools;

const SYSTEM_PROMPT: &str = "You are an expert weather forecaster, who speaks in puns.

You have access to two tools:

- get_weather: use this to get the weather for a specific location
- get_user_location: use this to get the user's location

If a user asks you for the weather, make sure you know the location. If you can tell from the question that they mean wherever they are, use the get_user_location tool to find their location.";

#[tokio::main]
async fn main() -> tool_graph::error::Result<()> {
    let model = Arc::new(ScriptedModel::new([
        ModelResponse::tool_calls(vec![ToolCall::new("", "get_user_location", json!({}))]),
        ModelResponse::tool_calls(vec![ToolCall::new("", "get_weather", json!({ "city": "Florida" }))]),
        ModelResponse::text(
            json!({
                "punny_response": "Florida is still having a sun-derful day!",
                "weather_conditions": "It's always sunny in Florida!"
            })
            .to_string(),
        ),
        ModelResponse::text(
            json!({
                "punny_response": "You're welcome! Always happy to shed some light.",
                "weather_conditions": "Still sunny."
            })
            .to_string(),
        ),
    ]));
    let response_schema = json!({
        "type": "object",
        "properties": {
            "punny_response": { "type": "string" },
            "weather_conditions": { "type": "string" }
        },
        "required": ["punny_response", "weather_conditions"]
    });
    let checkpointer: Arc<dyn Checkpointer> = Arc::new(MemorySaver::new());
    let graph = AgentGraph::builder(model)
        .tools(ToolRegistry::from_tools(weather_tools())?)
        .system_prompt(SYSTEM_PROMPT)
        .checkpointer(checkpointer)
        .response_schema(response_schema)
        .build();

    let config = || {
        InvokeConfig::builder()
            .thread_id("1")
            .context(json!({ "user_id": "1" }))
            .build()
    };

    let first = graph
        .invoke(vec![Message::human("what is the weather outside?")], config())
        .await?;
    println!("{}", first.structured_response.unwrap_or_default());

    let second = graph
        .invoke(vec![Message::human("thank you!")], config())
        .await?;
    println!("{}", second.structured_response.unwrap_or_default());
    println!("thread now holds {} messages", second.messages.len());
    Ok(())
}
