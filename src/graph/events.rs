//! Run event stream types.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::Message;

/// Event payloads emitted by the executor.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GraphEventPayload {
    RunStarted {
        thread_id: Option<String>,
        /// Messages restored from a checkpoint before the input was appended.
        resumed_messages: usize,
    },
    ModelTurnCompleted {
        call_count: usize,
        message: Message,
    },
    ToolCallCompleted {
        tool_call_id: String,
        tool_name: String,
        text: String,
        is_error: bool,
    },
    RunCompleted {
        call_count: usize,
    },
    RunFailed {
        error: String,
    },
}

/// Envelope for run events.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphEvent {
    pub run_id: Uuid,
    pub seq: u64,
    pub timestamp: DateTime<Utc>,
    pub payload: GraphEventPayload,
}

/// Callback receiving run events in emission order.
pub type GraphEventSink = Arc<dyn Fn(GraphEvent) + Send + Sync>;

pub(crate) struct EventEmitter {
    run_id: Uuid,
    seq: AtomicU64,
    sink: Option<GraphEventSink>,
}

impl EventEmitter {
    pub(crate) fn new(run_id: Uuid, sink: Option<GraphEventSink>) -> Self {
        Self {
            run_id,
            seq: AtomicU64::new(1),
            sink,
        }
    }

    pub(crate) fn emit(&self, payload: GraphEventPayload) {
        let Some(sink) = &self.sink else {
            return;
        };
        let seq = self.seq.fetch_add(1, Ordering::SeqCst);
        (sink)(GraphEvent {
            run_id: self.run_id,
            seq,
            timestamp: Utc::now(),
            payload,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[test]
    fn emitter_numbers_events_from_one() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink_seen = seen.clone();
        let sink: GraphEventSink = Arc::new(move |event| {
            sink_seen.lock().unwrap().push(event);
        });
        let run_id = Uuid::new_v4();
        let emitter = EventEmitter::new(run_id, Some(sink));

        emitter.emit(GraphEventPayload::RunCompleted { call_count: 1 });
        emitter.emit(GraphEventPayload::RunFailed {
            error: "boom".to_string(),
        });

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 2);
        assert_eq!(seen[0].seq, 1);
        assert_eq!(seen[1].seq, 2);
        assert!(seen.iter().all(|event| event.run_id == run_id));
    }

    #[test]
    fn emitter_without_sink_is_silent() {
        let emitter = EventEmitter::new(Uuid::new_v4(), None);

        emitter.emit(GraphEventPayload::RunCompleted { call_count: 0 });
    }

    #[test]
    fn payload_serializes_with_type_tag() {
        let json = serde_json::to_value(GraphEventPayload::RunCompleted { call_count: 3 }).unwrap();

        assert_eq!(json["type"], "run_completed");
        assert_eq!(json["call_count"], 3);
    }
}
