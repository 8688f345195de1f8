//! In-process checkpointer.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::Checkpointer;
use crate::error::GraphError;
use crate::graph::ConversationState;

/// Keeps thread states in memory for the lifetime of the process.
#[derive(Debug, Default)]
pub struct MemorySaver {
    threads: RwLock<HashMap<String, ConversationState>>,
}

impl MemorySaver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ids of every saved thread, sorted.
    pub async fn thread_ids(&self) -> Vec<String> {
        let mut ids: Vec<_> = self.threads.read().await.keys().cloned().collect();
        ids.sort();
        ids
    }
}

#[async_trait]
impl Checkpointer for MemorySaver {
    async fn load(&self, thread_id: &str) -> Result<Option<ConversationState>, GraphError> {
        Ok(self.threads.read().await.get(thread_id).cloned())
    }

    async fn save(&self, thread_id: &str, state: &ConversationState) -> Result<(), GraphError> {
        self.threads
            .write()
            .await
            .insert(thread_id.to_string(), state.clone());
        Ok(())
    }

    async fn clear(&self, thread_id: &str) -> Result<(), GraphError> {
        self.threads.write().await.remove(thread_id);
        Ok(())
    }
}
