//! Threads persisted across invokes.

mod common;

use std::sync::Arc;

use pretty_assertions::assert_eq;
use serde_json::json;
use tempfile::TempDir;
use tool_graph::prelude::*;
use tool_graph::tools::builtin::arithmetic_tools;

use common::add;

fn graph_with(model: Arc<ScriptedModel>, checkpointer: Arc<dyn Checkpointer>) -> AgentGraph {
    AgentGraph::builder(model)
        .tools(ToolRegistry::from_tools(arithmetic_tools()).unwrap())
        .checkpointer(checkpointer)
        .build()
}

fn thread(id: &str) -> InvokeConfig {
    InvokeConfig::builder().thread_id(id).build()
}

#[tokio::test]
async fn thread_accumulates_messages_across_invokes() {
    let saver = Arc::new(MemorySaver::new());
    let model = Arc::new(ScriptedModel::new([
        add("c1", 3, 4),
        ModelResponse::text("7"),
        ModelResponse::text("you're welcome"),
    ]));
    let graph = graph_with(model.clone(), saver.clone());

    let first = graph
        .invoke(vec![Message::human("3 + 4?")], thread("t1"))
        .await
        .unwrap();
    let second = graph
        .invoke(vec![Message::human("thanks!")], thread("t1"))
        .await
        .unwrap();

    assert_eq!(first.messages.len(), 4);
    assert_eq!(second.messages.len(), 6);
    assert_eq!(&second.messages[..4], &first.messages[..]);
    assert_eq!(second.call_count, 3);
    // The second prompt carried the whole thread.
    assert_eq!(model.requests()[2].messages.len(), 5);

    let stored = saver.load("t1").await.unwrap().unwrap();
    assert_eq!(stored.messages(), &second.messages[..]);
    assert_eq!(stored.call_count(), 3);
}

#[tokio::test]
async fn threads_do_not_share_state() {
    let saver = Arc::new(MemorySaver::new());
    let model = Arc::new(ScriptedModel::new([
        ModelResponse::text("hi a"),
        ModelResponse::text("hi b"),
    ]));
    let graph = graph_with(model, saver.clone());

    graph.invoke(vec![Message::human("a")], thread("a")).await.unwrap();
    let b = graph.invoke(vec![Message::human("b")], thread("b")).await.unwrap();

    assert_eq!(b.messages, vec![Message::human("b"), Message::assistant("hi b")]);
    assert_eq!(saver.thread_ids().await, vec!["a", "b"]);
}

#[tokio::test]
async fn without_thread_id_nothing_is_saved() {
    let saver = Arc::new(MemorySaver::new());
    let model = Arc::new(ScriptedModel::new([ModelResponse::text("hello")]));
    let graph = graph_with(model, saver.clone());

    graph
        .invoke(vec![Message::human("hi")], InvokeConfig::new())
        .await
        .unwrap();

    assert!(saver.thread_ids().await.is_empty());
}

#[tokio::test]
async fn bound_counts_only_calls_of_the_current_invoke() {
    let saver = Arc::new(MemorySaver::new());
    let model = Arc::new(ScriptedModel::new([
        add("c1", 1, 1),
        ModelResponse::text("2"),
        add("c2", 2, 2),
        ModelResponse::text("4"),
    ]));
    let graph = AgentGraph::builder(model)
        .tools(ToolRegistry::from_tools(arithmetic_tools()).unwrap())
        .checkpointer(saver as Arc<dyn Checkpointer>)
        .config(GraphConfig::default().with_max_calls(2))
        .build();

    graph.invoke(vec![Message::human("1 + 1")], thread("t")).await.unwrap();
    let second = graph
        .invoke(vec![Message::human("2 + 2")], thread("t"))
        .await
        .unwrap();

    assert_eq!(second.call_count, 4);
    assert_eq!(second.final_text(), "4");
}

#[tokio::test]
async fn file_checkpointer_resumes_a_thread_in_a_new_graph() {
    let dir = TempDir::new().unwrap();
    let store: Arc<dyn Checkpointer> = Arc::new(FileCheckpointer::new(dir.path()));

    let first_model = Arc::new(ScriptedModel::new([add("c1", 3, 4), ModelResponse::text("7")]));
    graph_with(first_model, store.clone())
        .invoke(vec![Message::human("3 + 4?")], thread("user-1"))
        .await
        .unwrap();

    let second_model = Arc::new(ScriptedModel::new([ModelResponse::text("14")]));
    let outcome = graph_with(second_model.clone(), store.clone())
        .invoke(vec![Message::human("times 2?")], thread("user-1"))
        .await
        .unwrap();

    assert_eq!(outcome.call_count, 3);
    assert_eq!(outcome.messages.len(), 6);
    assert_eq!(second_model.requests()[0].messages[2], Message::tool_result("c1", "7"));

    let raw = std::fs::read_to_string(dir.path().join("user-1.json")).unwrap();
    let file: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(file["thread_id"], json!("user-1"));
    assert_eq!(file["state"]["call_count"], json!(3));
}

#[tokio::test]
async fn caller_system_message_steers_one_run_and_is_never_stored() {
    let saver = Arc::new(MemorySaver::new());
    let model = Arc::new(ScriptedModel::new([
        ModelResponse::text("first"),
        ModelResponse::text("second"),
    ]));
    let graph = AgentGraph::builder(model.clone())
        .system_prompt("CFG")
        .checkpointer(saver.clone() as Arc<dyn Checkpointer>)
        .build();

    graph
        .invoke(
            vec![Message::system("CALLER"), Message::human("a")],
            thread("t"),
        )
        .await
        .unwrap();
    let second = graph
        .invoke(
            vec![Message::system("AGAIN"), Message::human("b")],
            thread("t"),
        )
        .await
        .unwrap();

    let requests = model.requests();
    assert_eq!(
        requests[0].messages,
        vec![Message::system("CALLER"), Message::human("a")]
    );
    assert_eq!(
        requests[1].messages,
        vec![
            Message::system("AGAIN"),
            Message::human("a"),
            Message::assistant("first"),
            Message::human("b"),
        ]
    );
    let stored = saver.load("t").await.unwrap().unwrap();
    assert!(stored
        .messages()
        .iter()
        .all(|m| m.kind() != MessageKind::System));
    assert_eq!(stored.messages(), &second.messages[..]);
}

#[tokio::test]
async fn misplaced_system_message_fails_before_anything_runs() {
    let saver = Arc::new(MemorySaver::new());
    let model = Arc::new(ScriptedModel::new([ModelResponse::text("unused")]));
    let graph = graph_with(model.clone(), saver.clone());

    let err = graph
        .invoke(
            vec![Message::human("hi"), Message::system("late rules")],
            thread("t"),
        )
        .await
        .unwrap_err();

    assert!(matches!(err, GraphError::Configuration(_)));
    assert!(model.requests().is_empty());
    assert_eq!(saver.load("t").await.unwrap(), None);
}
