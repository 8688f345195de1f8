//! Scripted model: replays queued replies and records every request.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use super::{ChatModel, ModelRequest, ModelResponse};
use crate::error::GraphError;

enum Step {
    Reply(ModelResponse),
    Fail(String),
}

/// Model that answers from a fixed script.
///
/// Each `invoke` pops the next step. An exhausted script fails with
/// `ModelInvocation`, so a test that loops longer than expected stops
/// instead of hanging. An optional latency makes calls observable for
/// cancellation and timeout tests.
pub struct ScriptedModel {
    name: String,
    steps: Mutex<VecDeque<Step>>,
    requests: Mutex<Vec<ModelRequest>>,
    latency: Option<Duration>,
}

impl ScriptedModel {
    pub fn new(replies: impl IntoIterator<Item = ModelResponse>) -> Self {
        Self {
            name: "scripted".to_string(),
            steps: Mutex::new(replies.into_iter().map(Step::Reply).collect()),
            requests: Mutex::new(Vec::new()),
            latency: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Sleep this long before answering each call.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Append a reply to the end of the script.
    pub fn then_reply(self, reply: ModelResponse) -> Self {
        self.push(Step::Reply(reply));
        self
    }

    /// Append a failure to the end of the script.
    pub fn then_fail(self, message: impl Into<String>) -> Self {
        self.push(Step::Fail(message.into()));
        self
    }

    fn push(&self, step: Step) {
        if let Ok(mut steps) = self.steps.lock() {
            steps.push_back(step);
        }
    }

    /// Requests received so far, in call order.
    pub fn requests(&self) -> Vec<ModelRequest> {
        self.requests
            .lock()
            .map(|requests| requests.clone())
            .unwrap_or_default()
    }

    /// Number of replies left in the script.
    pub fn remaining(&self) -> usize {
        self.steps.lock().map(|steps| steps.len()).unwrap_or(0)
    }
}

#[async_trait]
impl ChatModel for ScriptedModel {
    fn name(&self) -> &str {
        &self.name
    }

    async fn invoke(&self, request: &ModelRequest) -> Result<ModelResponse, GraphError> {
        self.requests
            .lock()
            .map_err(|_| GraphError::ModelInvocation("request log poisoned".to_string()))?
            .push(request.clone());

        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }

        let step = self
            .steps
            .lock()
            .map_err(|_| GraphError::ModelInvocation("script poisoned".to_string()))?
            .pop_front();
        match step {
            Some(Step::Reply(reply)) => Ok(reply),
            Some(Step::Fail(message)) => Err(GraphError::ModelInvocation(message)),
            None => Err(GraphError::ModelInvocation(
                "scripted model has no replies left".to_string(),
            )),
        }
    }
}
