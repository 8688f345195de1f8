//! tool-graph: a minimal agent loop as a graph.
//!
//! A model step asks a chat model for the next move, a router checks whether
//! it requested tools, and a tool step runs them and feeds the results back.
//! The loop ends when the model answers without tool calls.
//!
//! # Quick Start
//!
//! ```
//! use std::sync::Arc;
//!
//! use serde_json::json;
//! use tool_graph::prelude::*;
//! use tool_graph::tools::builtin::arithmetic_tools;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> tool_graph::error::Result<()> {
//! let model = Arc::new(ScriptedModel::new([
//!     ModelResponse::tool_calls(vec![ToolCall::new("c1", "add", json!({ "a": 3, "b": 4 }))]),
//!     ModelResponse::text("7"),
//! ]));
//! let graph = AgentGraph::builder(model)
//!     .tools(ToolRegistry::from_tools(arithmetic_tools())?)
//!     .build();
//!
//! let outcome = graph
//!     .invoke(vec![Message::human("Add 3 and 4.")], InvokeConfig::new())
//!     .await?;
//! assert_eq!(outcome.final_text(), "7");
//! assert_eq!(outcome.call_count, 2);
//! # Ok(())
//! # }
//! ```

pub mod checkpoint;
pub mod config;
pub mod error;
pub mod graph;
pub mod model;
pub mod prelude;
pub mod tools;
pub mod types;
pub mod util;
