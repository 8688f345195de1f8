//! File-backed checkpointer: one JSON document per thread.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::Checkpointer;
use crate::config::GraphConfig;
use crate::error::GraphError;
use crate::graph::ConversationState;

const FILE_VERSION: u32 = 1;

/// Stores each thread as `<base_dir>/<thread>.json`.
///
/// # Example
/// ```no_run
/// use tool_graph::checkpoint::{Checkpointer, FileCheckpointer};
///
/// # async fn demo() -> Result<(), tool_graph::error::GraphError> {
/// let store = FileCheckpointer::new_default();
/// let state = store.load("support-42").await?;
/// println!("resumed {} messages", state.map(|s| s.messages().len()).unwrap_or(0));
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct FileCheckpointer {
    base_dir: PathBuf,
}

impl FileCheckpointer {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    /// `~/.tool-graph/threads`, or `.tool-graph/threads` without a home dir.
    pub fn new_default() -> Self {
        Self::new(default_threads_dir())
    }

    /// Use `config.checkpoint_dir` when set, the default directory otherwise.
    pub fn from_config(config: &GraphConfig) -> Self {
        match &config.checkpoint_dir {
            Some(dir) => Self::new(dir.clone()),
            None => Self::new_default(),
        }
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    fn thread_path(&self, thread_id: &str) -> PathBuf {
        self.base_dir.join(format!("{}.json", encode_thread_id(thread_id)))
    }
}

#[async_trait]
impl Checkpointer for FileCheckpointer {
    async fn load(&self, thread_id: &str) -> Result<Option<ConversationState>, GraphError> {
        let path = self.thread_path(thread_id);
        let raw = match tokio::fs::read_to_string(&path).await {
            Ok(data) => data,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(err) => {
                return Err(GraphError::Checkpoint(format!(
                    "cannot read {}: {err}",
                    path.display()
                )))
            }
        };
        let file: ThreadFile = serde_json::from_str(&raw).map_err(|err| {
            GraphError::Checkpoint(format!("corrupt checkpoint {}: {err}", path.display()))
        })?;
        if file.version != FILE_VERSION {
            return Err(GraphError::Checkpoint(format!(
                "unsupported checkpoint version {} in {}",
                file.version,
                path.display()
            )));
        }
        Ok(Some(file.state))
    }

    async fn save(&self, thread_id: &str, state: &ConversationState) -> Result<(), GraphError> {
        let path = self.thread_path(thread_id);
        tokio::fs::create_dir_all(&self.base_dir).await?;
        let file = ThreadFile {
            version: FILE_VERSION,
            thread_id: thread_id.to_string(),
            saved_at: Utc::now(),
            state: state.clone(),
        };
        let serialized = serde_json::to_string_pretty(&file)?;
        // Write then rename so a crash never leaves a half-written thread.
        // Each save stages under its own name; concurrent saves must not
        // share a temp file.
        let staging = path.with_extension(format!("json.{}.tmp", Uuid::new_v4().simple()));
        tokio::fs::write(&staging, serialized).await?;
        tokio::fs::rename(&staging, &path).await?;
        tracing::debug!(thread_id, path = %path.display(), "checkpoint saved");
        Ok(())
    }

    async fn clear(&self, thread_id: &str) -> Result<(), GraphError> {
        match tokio::fs::remove_file(self.thread_path(thread_id)).await {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct ThreadFile {
    version: u32,
    thread_id: String,
    saved_at: DateTime<Utc>,
    state: ConversationState,
}

fn default_threads_dir() -> PathBuf {
    directories::UserDirs::new()
        .map(|dirs| dirs.home_dir().join(".tool-graph"))
        .unwrap_or_else(|| PathBuf::from(".tool-graph"))
        .join("threads")
}

/// File-name-safe, reversible encoding: `[A-Za-z0-9_-]` pass through, every
/// other byte becomes `%XX`.
fn encode_thread_id(thread_id: &str) -> String {
    if thread_id.is_empty() {
        return "%".to_string();
    }
    let mut out = String::with_capacity(thread_id.len());
    for byte in thread_id.bytes() {
        if byte.is_ascii_alphanumeric() || byte == b'-' || byte == b'_' {
            out.push(byte as char);
        } else {
            out.push_str(&format!("%{byte:02X}"));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::StateDelta;
    use crate::types::{Message, ToolCall};
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use tempfile::TempDir;

    fn temp_store() -> (TempDir, FileCheckpointer) {
        let dir = TempDir::new().unwrap();
        let store = FileCheckpointer::new(dir.path().join("threads"));
        (dir, store)
    }

    fn sample_state() -> ConversationState {
        ConversationState::new(vec![Message::human("what is 3 + 4?")])
            .apply(StateDelta::model_turn(Message::assistant_with_tool_calls(
                "",
                vec![ToolCall::new("c1", "add", json!({ "a": 3, "b": 4 }))],
            )))
            .apply(StateDelta::messages(vec![Message::tool_result("c1", "7")]))
    }

    #[tokio::test]
    async fn state_round_trip_works() {
        let (_dir, store) = temp_store();

        store.save("thread-1", &sample_state()).await.unwrap();
        let loaded = store.load("thread-1").await.unwrap();

        assert_eq!(loaded, Some(sample_state()));
    }

    #[tokio::test]
    async fn missing_thread_loads_none() {
        let (_dir, store) = temp_store();

        assert_eq!(store.load("never").await.unwrap(), None);
    }

    #[tokio::test]
    async fn save_overwrites_previous_state() {
        let (_dir, store) = temp_store();
        store
            .save("t", &ConversationState::new(vec![Message::human("old")]))
            .await
            .unwrap();

        store.save("t", &sample_state()).await.unwrap();

        assert_eq!(store.load("t").await.unwrap(), Some(sample_state()));
    }

    #[tokio::test]
    async fn corrupt_file_is_a_checkpoint_error() {
        let (_dir, store) = temp_store();
        tokio::fs::create_dir_all(store.base_dir()).await.unwrap();
        tokio::fs::write(store.thread_path("bad"), "{ not json").await.unwrap();

        let err = store.load("bad").await.unwrap_err();

        assert!(matches!(err, GraphError::Checkpoint(_)));
    }

    #[tokio::test]
    async fn clear_removes_thread() {
        let (_dir, store) = temp_store();
        store.save("t", &sample_state()).await.unwrap();

        store.clear("t").await.unwrap();
        store.clear("t").await.unwrap();

        assert_eq!(store.load("t").await.unwrap(), None);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_saves_to_one_thread_all_succeed() {
        let (dir, store) = temp_store();
        let states: Vec<_> = (0..8)
            .map(|i| ConversationState::new(vec![Message::human(format!("turn {i}"))]))
            .collect();

        let saves = states.iter().map(|state| store.save("t", state));
        let outcomes = futures::future::join_all(saves).await;

        assert!(outcomes.iter().all(|outcome| outcome.is_ok()));
        let loaded = store.load("t").await.unwrap().unwrap();
        assert!(states.contains(&loaded));
        let leftovers: Vec<_> = std::fs::read_dir(dir.path().join("threads"))
            .unwrap()
            .map(|entry| entry.unwrap().file_name())
            .collect();
        assert_eq!(leftovers, vec![std::ffi::OsString::from("t.json")]);
    }

    #[test]
    fn thread_ids_encode_to_distinct_file_names() {
        assert_eq!(encode_thread_id("user-1_a"), "user-1_a");
        assert_eq!(encode_thread_id("a/b"), "a%2Fb");
        assert_ne!(encode_thread_id("a/b"), encode_thread_id("a-b"));
        assert_ne!(encode_thread_id("A"), encode_thread_id("a"));
        assert_eq!(encode_thread_id(""), "%");
    }

    #[test]
    fn config_dir_takes_precedence() {
        let config = GraphConfig {
            checkpoint_dir: Some(PathBuf::from("/tmp/tg")),
            ..GraphConfig::default()
        };

        assert_eq!(FileCheckpointer::from_config(&config).base_dir(), Path::new("/tmp/tg"));
    }
}
