//! Configuration loading, validation, and management for Recall.
//!
//! Loads configuration from `~/.recall/config.toml` with environment
//! variable overrides. Validates all settings at startup.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// The root configuration structure.
///
/// Maps directly to `~/.recall/config.toml`.
#[derive(Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// API key for the model endpoint
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Base URL of the OpenAI-compatible endpoint
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Chat completion model
    #[serde(default = "default_model")]
    pub model: String,

    /// Embedding model used for long-term memory
    #[serde(default = "default_embedding_model")]
    pub embedding_model: String,

    /// Sampling temperature
    #[serde(default)]
    pub temperature: f32,

    /// Max tokens per generated answer (provider default when unset)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,

    /// Assistant behavior
    #[serde(default)]
    pub assistant: AssistantConfig,

    /// Memory budgets and history storage
    #[serde(default)]
    pub memory: MemoryConfig,

    /// Long-term retention policy
    #[serde(default)]
    pub retention: RetentionConfig,

    /// Token counting scheme
    #[serde(default)]
    pub tokenizer: TokenizerConfig,
}

fn default_api_url() -> String {
    "https://api.openai.com/v1".into()
}
fn default_model() -> String {
    "gpt-4.1-nano".into()
}
fn default_embedding_model() -> String {
    "text-embedding-3-small".into()
}

/// Redact a secret string for Debug output.
fn redact(s: &Option<String>) -> &'static str {
    match s {
        Some(_) => "[REDACTED]",
        None => "None",
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("api_key", &redact(&self.api_key))
            .field("api_url", &self.api_url)
            .field("model", &self.model)
            .field("embedding_model", &self.embedding_model)
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .field("assistant", &self.assistant)
            .field("memory", &self.memory)
            .field("retention", &self.retention)
            .field("tokenizer", &self.tokenizer)
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssistantConfig {
    /// The fixed instruction sent as the first system turn of every prompt
    #[serde(default = "default_system_instruction")]
    pub system_instruction: String,
}

fn default_system_instruction() -> String {
    concat!(
        "You are a concise, helpful QA assistant. ",
        "Answer the user's question clearly and accurately. ",
        "If you are unsure, say that you don't know."
    )
    .into()
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            system_instruction: default_system_instruction(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryConfig {
    /// Token ceiling for the recent-history window
    #[serde(default = "default_history_budget")]
    pub history_budget: usize,

    /// Token ceiling for retrieved Q&A context
    #[serde(default = "default_context_budget")]
    pub context_budget: usize,

    /// Nearest neighbours requested from the semantic store
    #[serde(default = "default_top_k")]
    pub top_k: usize,

    /// History backend: "file" or "in_memory"
    #[serde(default = "default_history_backend")]
    pub history_backend: String,

    /// Location of the JSONL history file (defaults under the config dir)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub history_path: Option<PathBuf>,
}

fn default_history_budget() -> usize {
    1200
}
fn default_context_budget() -> usize {
    800
}
fn default_top_k() -> usize {
    5
}
fn default_history_backend() -> String {
    "file".into()
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            history_budget: default_history_budget(),
            context_budget: default_context_budget(),
            top_k: default_top_k(),
            history_backend: default_history_backend(),
            history_path: None,
        }
    }
}

impl MemoryConfig {
    /// The configured history file, or `~/.recall/history.jsonl`.
    pub fn resolved_history_path(&self) -> PathBuf {
        self.history_path
            .clone()
            .unwrap_or_else(|| AppConfig::config_dir().join("history.jsonl"))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetentionConfig {
    /// Questions with fewer whitespace-separated words are not remembered
    #[serde(default = "default_min_question_words")]
    pub min_question_words: usize,

    /// Answers with fewer whitespace-separated words are not remembered
    #[serde(default = "default_min_answer_words")]
    pub min_answer_words: usize,

    /// Lowercase prefixes marking small talk
    #[serde(default = "default_small_talk_prefixes")]
    pub small_talk_prefixes: Vec<String>,
}

fn default_min_question_words() -> usize {
    4
}
fn default_min_answer_words() -> usize {
    6
}

/// Greetings, thanks, acknowledgements, and farewells.
pub fn default_small_talk_prefixes() -> Vec<String> {
    [
        "hi",
        "hello",
        "hey",
        "good morning",
        "good evening",
        "thanks",
        "thank you",
        "ok",
        "okay",
        "bye",
        "goodbye",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

impl Default for RetentionConfig {
    fn default() -> Self {
        Self {
            min_question_words: default_min_question_words(),
            min_answer_words: default_min_answer_words(),
            small_talk_prefixes: default_small_talk_prefixes(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenizerConfig {
    /// "heuristic" or "huggingface"
    #[serde(default = "default_tokenizer_kind")]
    pub kind: String,

    /// Path to a `tokenizer.json` (required for "huggingface")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

fn default_tokenizer_kind() -> String {
    "heuristic".into()
}

impl Default for TokenizerConfig {
    fn default() -> Self {
        Self {
            kind: default_tokenizer_kind(),
            path: None,
        }
    }
}

impl AppConfig {
    /// Load configuration from the default path (~/.recall/config.toml).
    ///
    /// Also checks environment variables:
    /// - `RECALL_API_KEY` (highest priority), then `OPENAI_API_KEY`
    /// - `RECALL_API_URL`
    /// - `RECALL_MODEL`
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::config_dir().join("config.toml");
        let mut config = Self::load_from(&config_path)?;

        if config.api_key.is_none() {
            config.api_key = std::env::var("RECALL_API_KEY")
                .ok()
                .or_else(|| std::env::var("OPENAI_API_KEY").ok());
        }

        if let Ok(url) = std::env::var("RECALL_API_URL") {
            config.api_url = url;
        }

        if let Ok(model) = std::env::var("RECALL_MODEL") {
            config.model = model;
        }

        Ok(config)
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::info!("No config file found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Get the configuration directory path.
    pub fn config_dir() -> PathBuf {
        dirs_home().join(".recall")
    }

    /// Validate the configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(ConfigError::ValidationError(
                "temperature must be between 0.0 and 2.0".into(),
            ));
        }

        if self.memory.top_k == 0 {
            return Err(ConfigError::ValidationError(
                "memory.top_k must be at least 1".into(),
            ));
        }

        if self.memory.history_budget == 0 || self.memory.context_budget == 0 {
            return Err(ConfigError::ValidationError(
                "memory budgets must be greater than 0".into(),
            ));
        }

        if !matches!(self.memory.history_backend.as_str(), "file" | "in_memory") {
            return Err(ConfigError::ValidationError(format!(
                "unknown history backend '{}'",
                self.memory.history_backend
            )));
        }

        match self.tokenizer.kind.as_str() {
            "heuristic" => {}
            "huggingface" if self.tokenizer.path.is_none() => {
                return Err(ConfigError::ValidationError(
                    "tokenizer.path is required for the huggingface tokenizer".into(),
                ));
            }
            "huggingface" => {}
            other => {
                return Err(ConfigError::ValidationError(format!(
                    "unknown tokenizer kind '{other}'"
                )));
            }
        }

        Ok(())
    }

    /// Check if an API key is available (from config or environment).
    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    /// Generate a default config TOML string (for `init` command).
    pub fn default_toml() -> String {
        let config = Self::default();
        toml::to_string_pretty(&config).unwrap_or_default()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_url: default_api_url(),
            model: default_model(),
            embedding_model: default_embedding_model(),
            temperature: 0.0,
            max_tokens: None,
            assistant: AssistantConfig::default(),
            memory: MemoryConfig::default(),
            retention: RetentionConfig::default(),
            tokenizer: TokenizerConfig::default(),
        }
    }
}

/// Get the user's home directory.
fn dirs_home() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        std::env::var("USERPROFILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("C:\\Users\\Default"))
    }
    #[cfg(not(target_os = "windows"))]
    {
        std::env::var("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("/tmp"))
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("Failed to parse config file at {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}
