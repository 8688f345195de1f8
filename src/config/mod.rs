//! Configuration system (layered: defaults < TOML file < env < per-invoke overrides).

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::error::GraphError;

pub const DEFAULT_MAX_CALLS: usize = 25;
pub const DEFAULT_MODEL_TIMEOUT_MS: u64 = 120_000;

const MAX_CALLS_ENV: &str = "TOOL_GRAPH_MAX_CALLS";
const MODEL_TIMEOUT_MS_ENV: &str = "TOOL_GRAPH_MODEL_TIMEOUT_MS";
const SYSTEM_PROMPT_ENV: &str = "TOOL_GRAPH_SYSTEM_PROMPT";
const CHECKPOINT_DIR_ENV: &str = "TOOL_GRAPH_CHECKPOINT_DIR";

/// Executor configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct GraphConfig {
    /// Upper bound on model calls per invoke.
    pub max_calls: usize,
    /// Model call timeout in milliseconds; `0` disables it.
    pub model_timeout_ms: u64,
    /// Instruction prepended to every model prompt; never stored in state.
    pub system_prompt: Option<String>,
    /// Base directory for `FileCheckpointer`.
    pub checkpoint_dir: Option<PathBuf>,
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            max_calls: DEFAULT_MAX_CALLS,
            model_timeout_ms: DEFAULT_MODEL_TIMEOUT_MS,
            system_prompt: None,
            checkpoint_dir: None,
        }
    }
}

/// On-disk shape; every field optional so files can override selectively.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    max_calls: Option<usize>,
    model_timeout_ms: Option<u64>,
    system_prompt: Option<String>,
    checkpoint_dir: Option<PathBuf>,
}

impl GraphConfig {
    /// Defaults overlaid with environment variables (`.env` loaded if present).
    pub fn from_env() -> Self {
        let _ = dotenvy::dotenv(); // load .env if present, ignore error
        Self::default().with_env_overrides(std::env::vars().collect())
    }

    /// Parse a TOML document over the defaults.
    pub fn from_toml_str(raw: &str) -> Result<Self, GraphError> {
        let file: ConfigFile = toml::from_str(raw)
            .map_err(|e| GraphError::Configuration(format!("invalid config file: {e}")))?;
        Ok(Self::default().merge_file(file))
    }

    /// Read a TOML file over the defaults, then apply the environment.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, GraphError> {
        let raw = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            GraphError::Configuration(format!(
                "cannot read config file {}: {e}",
                path.as_ref().display()
            ))
        })?;
        let _ = dotenvy::dotenv();
        Ok(Self::from_toml_str(&raw)?.with_env_overrides(std::env::vars().collect()))
    }

    fn merge_file(mut self, file: ConfigFile) -> Self {
        if let Some(max_calls) = file.max_calls.filter(|v| *v > 0) {
            self.max_calls = max_calls;
        }
        if let Some(timeout) = file.model_timeout_ms {
            self.model_timeout_ms = timeout;
        }
        if file.system_prompt.is_some() {
            self.system_prompt = file.system_prompt;
        }
        if file.checkpoint_dir.is_some() {
            self.checkpoint_dir = file.checkpoint_dir;
        }
        self
    }

    /// Apply overrides from an environment snapshot.
    ///
    /// Zero or unparsable numbers are ignored and the current value kept.
    pub fn with_env_overrides(mut self, env: HashMap<String, String>) -> Self {
        if let Some(max_calls) = env.get(MAX_CALLS_ENV).and_then(|v| parse_positive_usize(v)) {
            self.max_calls = max_calls;
        }
        if let Some(timeout) = env
            .get(MODEL_TIMEOUT_MS_ENV)
            .and_then(|v| v.trim().parse::<u64>().ok())
        {
            self.model_timeout_ms = timeout;
        }
        if let Some(prompt) = env.get(SYSTEM_PROMPT_ENV).filter(|v| !v.trim().is_empty()) {
            self.system_prompt = Some(prompt.clone());
        }
        if let Some(dir) = env.get(CHECKPOINT_DIR_ENV).filter(|v| !v.trim().is_empty()) {
            self.checkpoint_dir = Some(PathBuf::from(dir));
        }
        self
    }

    pub fn with_max_calls(mut self, max_calls: usize) -> Self {
        self.max_calls = max_calls;
        self
    }

    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = Some(prompt.into());
        self
    }

    pub fn with_model_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.model_timeout_ms = timeout_ms;
        self
    }

    /// Model timeout as a `Duration`; `None` when disabled.
    pub fn model_timeout(&self) -> Option<Duration> {
        (self.model_timeout_ms > 0).then(|| Duration::from_millis(self.model_timeout_ms))
    }
}

fn parse_positive_usize(value: &str) -> Option<usize> {
    let parsed = value.trim().parse::<usize>().ok()?;
    if parsed == 0 {
        None
    } else {
        Some(parsed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn defaults_bound_the_loop() {
        let config = GraphConfig::default();

        assert_eq!(config.max_calls, DEFAULT_MAX_CALLS);
        assert_eq!(config.model_timeout(), Some(Duration::from_secs(120)));
        assert_eq!(config.system_prompt, None);
    }

    #[test]
    fn toml_overrides_defaults_selectively() {
        let config = GraphConfig::from_toml_str(
            r#"
            max_calls = 5
            system_prompt = "You are a helpful assistant tasked with performing arithmetic on a set of inputs."
            "#,
        )
        .unwrap();

        assert_eq!(config.max_calls, 5);
        assert_eq!(config.model_timeout_ms, DEFAULT_MODEL_TIMEOUT_MS);
        assert!(config
            .system_prompt
            .as_deref()
            .is_some_and(|p| p.contains("arithmetic")));
    }

    #[test]
    fn zero_max_calls_in_file_keeps_default() {
        let config = GraphConfig::from_toml_str("max_calls = 0").unwrap();

        assert_eq!(config.max_calls, DEFAULT_MAX_CALLS);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let err = GraphConfig::from_toml_str("max_iterations = 3").unwrap_err();

        assert!(matches!(err, GraphError::Configuration(_)));
    }

    #[test]
    fn env_overrides_file_values() {
        let config = GraphConfig::from_toml_str("max_calls = 5")
            .unwrap()
            .with_env_overrides(env(&[
                ("TOOL_GRAPH_MAX_CALLS", "9"),
                ("TOOL_GRAPH_MODEL_TIMEOUT_MS", "0"),
                ("TOOL_GRAPH_CHECKPOINT_DIR", "/tmp/threads"),
            ]));

        assert_eq!(config.max_calls, 9);
        assert_eq!(config.model_timeout(), None);
        assert_eq!(config.checkpoint_dir, Some(PathBuf::from("/tmp/threads")));
    }

    #[test]
    fn invalid_env_values_are_ignored() {
        let config = GraphConfig::default().with_env_overrides(env(&[
            ("TOOL_GRAPH_MAX_CALLS", "0"),
            ("TOOL_GRAPH_MODEL_TIMEOUT_MS", "soon"),
            ("TOOL_GRAPH_SYSTEM_PROMPT", "  "),
        ]));

        assert_eq!(config, GraphConfig::default());
    }

    #[test]
    fn from_file_reads_toml() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("graph.toml");
        std::fs::write(&path, "model_timeout_ms = 500\n").unwrap();

        let config = GraphConfig::from_file(&path).unwrap();

        assert_eq!(config.model_timeout(), Some(Duration::from_millis(500)));
    }

    #[test]
    fn missing_file_is_a_configuration_error() {
        let err = GraphConfig::from_file("/definitely/not/here.toml").unwrap_err();

        assert!(err.to_string().contains("cannot read config file"));
    }
}
