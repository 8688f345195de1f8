//! Thread persistence: conversation state saved per thread id.

pub mod file;
pub mod memory;

use async_trait::async_trait;

use crate::error::GraphError;
use crate::graph::ConversationState;

pub use file::FileCheckpointer;
pub use memory::MemorySaver;

/// Storage abstraction for per-thread conversation state.
#[async_trait]
pub trait Checkpointer: Send + Sync {
    /// Load the latest state of a thread; `None` if it was never saved.
    async fn load(&self, thread_id: &str) -> Result<Option<ConversationState>, GraphError>;

    /// Replace the stored state of a thread.
    async fn save(&self, thread_id: &str, state: &ConversationState) -> Result<(), GraphError>;

    /// Forget a thread. Clearing an unknown thread is not an error.
    async fn clear(&self, thread_id: &str) -> Result<(), GraphError>;
}
