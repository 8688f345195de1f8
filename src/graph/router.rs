//! Routing decision after a model turn.

use strum::Display;

use super::state::ConversationState;
use crate::types::Message;

/// Where the executor goes after a model turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "snake_case")]
pub enum Route {
    /// Run the tool step, then return to the model.
    ContinueViaTools,
    /// Stop and return the state.
    Terminate,
}

/// Decide the next hop from the last message. Total and side-effect free.
pub fn route(state: &ConversationState) -> Route {
    match state.last_message() {
        Some(Message::Assistant { tool_calls, .. }) if !tool_calls.is_empty() => {
            Route::ContinueViaTools
        }
        Some(Message::Assistant { .. })
        | Some(Message::System { .. })
        | Some(Message::Human { .. })
        | Some(Message::ToolResult { .. })
        | None => Route::Terminate,
    }
}
