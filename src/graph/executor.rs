//! Graph executor: drives Model Step, Router and Tool Step to completion.

use std::sync::Arc;

use strum::Display;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use super::events::{EventEmitter, GraphEventPayload, GraphEventSink};
use super::model_step::ModelStep;
use super::router::{route, Route};
use super::state::{ConversationState, StateDelta};
use super::tool_step::ToolStep;
use crate::checkpoint::Checkpointer;
use crate::config::GraphConfig;
use crate::error::GraphError;
use crate::model::ChatModel;
use crate::tools::{validate_arguments, ToolContext, ToolRegistry};
use crate::types::Message;

/// Executor phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "snake_case")]
pub enum Phase {
    Start,
    ModelTurn,
    ToolTurn,
    Done,
}

/// Per-invoke settings.
#[derive(Debug, Clone, Default, bon::Builder)]
pub struct InvokeConfig {
    /// Thread whose checkpointed state this run continues.
    #[builder(into)]
    pub thread_id: Option<String>,
    /// Runtime context handed to every tool call.
    #[builder(default)]
    pub context: serde_json::Value,
    /// Overrides the graph's `max_calls` for this run.
    pub max_calls: Option<usize>,
    #[builder(default)]
    pub cancel: CancellationToken,
}

impl InvokeConfig {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Result of a completed run.
#[derive(Debug, Clone, PartialEq)]
pub struct InvokeOutcome {
    /// Full conversation, including messages restored from a checkpoint.
    pub messages: Vec<Message>,
    /// Model steps completed over the lifetime of the thread.
    pub call_count: usize,
    /// Parsed final answer when a response schema is configured.
    pub structured_response: Option<serde_json::Value>,
}

impl InvokeOutcome {
    pub fn last_message(&self) -> Option<&Message> {
        self.messages.last()
    }

    /// Text of the final message, or `""` for an empty conversation.
    pub fn final_text(&self) -> &str {
        self.last_message().map(Message::text).unwrap_or_default()
    }
}

/// A compiled agent loop: model step, router and tool step over a fixed
/// tool registry.
///
/// The graph is immutable once built; `invoke` takes `&self` so concurrent
/// runs can share it.
pub struct AgentGraph {
    model_step: ModelStep,
    tool_step: ToolStep,
    config: GraphConfig,
    checkpointer: Option<Arc<dyn Checkpointer>>,
    response_schema: Option<serde_json::Value>,
    event_sink: Option<GraphEventSink>,
}

#[bon::bon]
impl AgentGraph {
    /// Build a graph.
    ///
    /// `system_prompt` overrides `config.system_prompt`; the model timeout
    /// comes from `config`.
    #[builder]
    pub fn new(
        #[builder(start_fn)] model: Arc<dyn ChatModel>,
        #[builder(default)] tools: ToolRegistry,
        #[builder(into)] system_prompt: Option<String>,
        #[builder(default)] config: GraphConfig,
        checkpointer: Option<Arc<dyn Checkpointer>>,
        response_schema: Option<serde_json::Value>,
        event_sink: Option<GraphEventSink>,
    ) -> Self {
        let registry = Arc::new(tools);
        let model_step = ModelStep::new(model, &registry)
            .with_system_prompt(system_prompt.or_else(|| config.system_prompt.clone()))
            .with_timeout(config.model_timeout());
        Self {
            model_step,
            tool_step: ToolStep::new(registry),
            config,
            checkpointer,
            response_schema,
            event_sink,
        }
    }
}

impl AgentGraph {
    pub fn config(&self) -> &GraphConfig {
        &self.config
    }

    pub fn registry(&self) -> &ToolRegistry {
        self.tool_step.registry()
    }

    /// Run the loop from `input` until the model answers without tool calls.
    ///
    /// With a thread id and a checkpointer, the thread's saved state is
    /// loaded first and `input` is appended to it; the final state is saved
    /// only on success.
    ///
    /// A `System` message may only appear first in `input`. It replaces the
    /// configured system prompt for this run and is not stored. A `System`
    /// anywhere else fails with `Configuration`.
    pub async fn invoke(
        &self,
        input: Vec<Message>,
        config: InvokeConfig,
    ) -> Result<InvokeOutcome, GraphError> {
        let run_id = Uuid::new_v4();
        let emitter = EventEmitter::new(run_id, self.event_sink.clone());
        let result = self.run(run_id, input, &config, &emitter).await;
        match &result {
            Ok(outcome) => {
                tracing::debug!(%run_id, call_count = outcome.call_count, "run completed");
                emitter.emit(GraphEventPayload::RunCompleted {
                    call_count: outcome.call_count,
                });
            }
            Err(err) => {
                tracing::debug!(%run_id, error = %err, "run failed");
                emitter.emit(GraphEventPayload::RunFailed {
                    error: err.to_string(),
                });
            }
        }
        result
    }

    async fn run(
        &self,
        run_id: Uuid,
        mut input: Vec<Message>,
        config: &InvokeConfig,
        emitter: &EventEmitter,
    ) -> Result<InvokeOutcome, GraphError> {
        let max_calls = config
            .max_calls
            .filter(|v| *v > 0)
            .unwrap_or(self.config.max_calls);
        let thread_id = config.thread_id.as_deref();
        let base_ctx = ToolContext {
            thread_id: config.thread_id.clone(),
            runtime: config.context.clone(),
            ..Default::default()
        };

        let mut state = ConversationState::default();
        let mut run_prompt = None;
        let mut start_calls = 0;
        let mut phase = Phase::Start;
        loop {
            tracing::debug!(%run_id, %phase, call_count = state.call_count(), "phase");
            phase = match phase {
                Phase::Start => {
                    let (prompt, input) = split_system_prompt(std::mem::take(&mut input))?;
                    run_prompt = prompt;
                    let restored = self.load_thread(thread_id).await?;
                    let resumed_messages = restored.messages().len();
                    state = restored.apply(StateDelta::messages(input));
                    start_calls = state.call_count();
                    emitter.emit(GraphEventPayload::RunStarted {
                        thread_id: config.thread_id.clone(),
                        resumed_messages,
                    });
                    Phase::ModelTurn
                }
                Phase::ModelTurn => {
                    if state.call_count() - start_calls >= max_calls {
                        return Err(GraphError::MaxIterationsExceeded { max_calls });
                    }
                    let delta = self
                        .model_step
                        .run(&state, run_prompt.as_deref(), &config.cancel).await?;
                    state = state.apply(delta);
                    if let Some(message) = state.last_message() {
                        emitter.emit(GraphEventPayload::ModelTurnCompleted {
                            call_count: state.call_count(),
                            message: message.clone(),
                        });
                    }
                    match route(&state) {
                        Route::ContinueViaTools => Phase::ToolTurn,
                        Route::Terminate => Phase::Done,
                    }
                }
                Phase::ToolTurn => {
                    let delta = self.tool_step.run(&state, &base_ctx, &config.cancel).await?;
                    self.emit_tool_results(emitter, &state, &delta);
                    state = state.apply(delta);
                    Phase::ModelTurn
                }
                Phase::Done => break,
            };
        }

        let structured_response = self.structured_response(&state)?;
        if let (Some(thread_id), Some(checkpointer)) = (thread_id, &self.checkpointer) {
            checkpointer.save(thread_id, &state).await?;
        }
        let (messages, call_count) = state.into_parts();
        Ok(InvokeOutcome {
            messages,
            call_count,
            structured_response,
        })
    }

    async fn load_thread(&self, thread_id: Option<&str>) -> Result<ConversationState, GraphError> {
        match (thread_id, &self.checkpointer) {
            (Some(thread_id), Some(checkpointer)) => {
                Ok(checkpointer.load(thread_id).await?.unwrap_or_default())
            }
            _ => Ok(ConversationState::default()),
        }
    }

    fn emit_tool_results(&self, emitter: &EventEmitter, state: &ConversationState, delta: &StateDelta) {
        let calls = state.last_message().map(Message::tool_calls).unwrap_or_default();
        for (call, result) in calls.iter().zip(&delta.messages) {
            if let Message::ToolResult { tool_call_id, text, is_error } = result {
                emitter.emit(GraphEventPayload::ToolCallCompleted {
                    tool_call_id: tool_call_id.clone(),
                    tool_name: call.name.clone(),
                    text: text.clone(),
                    is_error: *is_error,
                });
            }
        }
    }

    fn structured_response(
        &self,
        state: &ConversationState,
    ) -> Result<Option<serde_json::Value>, GraphError> {
        let Some(schema) = &self.response_schema else {
            return Ok(None);
        };
        let text = state.last_message().map(Message::text).unwrap_or_default();
        let value: serde_json::Value = serde_json::from_str(strip_code_fence(text))
            .map_err(|err| GraphError::StructuredResponse(format!("final answer is not JSON: {err}")))?;
        validate_arguments(&value, schema).map_err(GraphError::StructuredResponse)?;
        Ok(Some(value))
    }
}

impl std::fmt::Debug for AgentGraph {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AgentGraph")
            .field("tools", &self.tool_step.registry())
            .field("config", &self.config)
            .field("checkpointer", &self.checkpointer.is_some())
            .field("response_schema", &self.response_schema)
            .finish()
    }
}

/// Take a leading `System` message out of the input as the run's prompt.
fn split_system_prompt(input: Vec<Message>) -> Result<(Option<String>, Vec<Message>), GraphError> {
    let mut prompt = None;
    let mut messages = Vec::with_capacity(input.len());
    for (index, message) in input.into_iter().enumerate() {
        match message {
            Message::System { text } if index == 0 => prompt = Some(text),
            Message::System { .. } => {
                return Err(GraphError::Configuration(format!(
                    "system message at input position {index}; only the first input message may be a system message"
                )))
            }
            other => messages.push(other),
        }
    }
    Ok((prompt, messages))
}

/// Accept answers wrapped in a Markdown code fence.
fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(body) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let body = body.strip_prefix("json").unwrap_or(body);
    body.strip_suffix("```").unwrap_or(body).trim()
}
