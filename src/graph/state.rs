//! Conversation state and the deltas steps produce.

use serde::{Deserialize, Serialize};

use crate::types::Message;

/// Append-only conversation state for one run.
///
/// `call_count` always equals the number of completed model steps. The only
/// way to change a state is [`ConversationState::apply`], which consumes it
/// and returns the successor.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConversationState {
    messages: Vec<Message>,
    call_count: usize,
}

impl ConversationState {
    pub fn new(messages: Vec<Message>) -> Self {
        Self {
            messages,
            call_count: 0,
        }
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn call_count(&self) -> usize {
        self.call_count
    }

    pub fn last_message(&self) -> Option<&Message> {
        self.messages.last()
    }

    /// Append the delta's messages and add its call increment.
    pub fn apply(mut self, delta: StateDelta) -> Self {
        self.messages.extend(delta.messages);
        self.call_count += delta.call_increment;
        self
    }

    pub fn into_parts(self) -> (Vec<Message>, usize) {
        (self.messages, self.call_count)
    }
}

/// Incremental output of one step.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StateDelta {
    pub messages: Vec<Message>,
    pub call_increment: usize,
}

impl StateDelta {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Delta that only appends messages.
    pub fn messages(messages: Vec<Message>) -> Self {
        Self {
            messages,
            call_increment: 0,
        }
    }

    /// Delta of a completed model step: one assistant message, one call.
    pub fn model_turn(message: Message) -> Self {
        Self {
            messages: vec![message],
            call_increment: 1,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty() && self.call_increment == 0
    }
}
