//! Configuration loading, validation, and management for Parley.
//!
//! Loads configuration from `~/.parley/config.toml` with environment
//! variable overrides. Validated once at startup; every service client is
//! built from the resulting value and nothing re-reads it later.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// The root configuration structure.
///
/// Maps directly to `~/.parley/config.toml`.
#[derive(Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// API key for the completion and image endpoints
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// OpenAI-compatible base URL
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Chat model
    #[serde(default = "default_model")]
    pub model: String,

    /// Sampling temperature
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Maximum tool-call rounds per user message (0 = no cap)
    #[serde(default = "default_max_tool_rounds")]
    pub max_tool_rounds: u32,

    /// Replace the built-in system prompt
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system_prompt: Option<String>,

    /// Where the conversation is persisted
    #[serde(default)]
    pub transcript: TranscriptConfig,

    /// Image generation settings
    #[serde(default)]
    pub image: ImageConfig,

    /// Vector search backend
    #[serde(default)]
    pub vector: VectorConfig,

    /// Third-party service endpoints
    #[serde(default)]
    pub services: ServicesConfig,
}

fn default_base_url() -> String {
    "https://api.openai.com/v1".into()
}
fn default_model() -> String {
    "gpt-4o-mini".into()
}
fn default_temperature() -> f32 {
    0.1
}
fn default_max_tool_rounds() -> u32 {
    25
}

/// Redact a secret for Debug output.
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
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .field("max_tool_rounds", &self.max_tool_rounds)
            .field("system_prompt", &self.system_prompt.as_ref().map(|_| "[custom]"))
            .field("transcript", &self.transcript)
            .field("image", &self.image)
            .field("vector", &self.vector)
            .field("services", &self.services)
            .finish()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TranscriptConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageConfig {
    #[serde(default = "default_image_model")]
    pub model: String,

    #[serde(default = "default_image_size")]
    pub size: String,
}

fn default_image_model() -> String {
    "dall-e-3".into()
}
fn default_image_size() -> String {
    "1024x1024".into()
}

impl Default for ImageConfig {
    fn default() -> Self {
        Self {
            model: default_image_model(),
            size: default_image_size(),
        }
    }
}

#[derive(Clone, Serialize, Deserialize)]
pub struct VectorConfig {
    /// Upstash Vector REST URL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    /// Upstash Vector REST token
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,

    /// Results per query
    #[serde(default = "default_top_k")]
    pub top_k: usize,
}

fn default_top_k() -> usize {
    5
}

impl Default for VectorConfig {
    fn default() -> Self {
        Self {
            url: None,
            token: None,
            top_k: default_top_k(),
        }
    }
}

impl std::fmt::Debug for VectorConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VectorConfig")
            .field("url", &self.url)
            .field("token", &redact(&self.token))
            .field("top_k", &self.top_k)
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServicesConfig {
    #[serde(default = "default_dad_joke_url")]
    pub dad_joke_url: String,

    #[serde(default = "default_quickchart_url")]
    pub quickchart_url: String,

    /// Timeout for every outbound tool request
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_dad_joke_url() -> String {
    "https://icanhazdadjoke.com".into()
}
fn default_quickchart_url() -> String {
    "https://quickchart.io".into()
}
fn default_timeout_secs() -> u64 {
    60
}

impl Default for ServicesConfig {
    fn default() -> Self {
        Self {
            dad_joke_url: default_dad_joke_url(),
            quickchart_url: default_quickchart_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl AppConfig {
    /// Load configuration from the default path (~/.parley/config.toml).
    ///
    /// Environment variables fill in what the file leaves unset:
    /// - `PARLEY_API_KEY`, then `OPENAI_API_KEY`
    /// - `UPSTASH_VECTOR_REST_URL`, `UPSTASH_VECTOR_REST_TOKEN`
    ///
    /// and override what it sets:
    /// - `PARLEY_MODEL`, `PARLEY_DB`
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::config_dir().join("config.toml");
        let mut config = Self::load_from(&config_path)?;
        config.apply_env(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific file path, without env overrides.
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

    /// Apply environment overrides using `lookup` to read variables.
    fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if self.api_key.is_none() {
            self.api_key = lookup("PARLEY_API_KEY").or_else(|| lookup("OPENAI_API_KEY"));
        }
        if self.vector.url.is_none() {
            self.vector.url = lookup("UPSTASH_VECTOR_REST_URL");
        }
        if self.vector.token.is_none() {
            self.vector.token = lookup("UPSTASH_VECTOR_REST_TOKEN");
        }
        if let Some(model) = lookup("PARLEY_MODEL") {
            self.model = model;
        }
        if let Some(db) = lookup("PARLEY_DB") {
            self.transcript.path = Some(PathBuf::from(db));
        }
    }

    /// Get the configuration directory path.
    pub fn config_dir() -> PathBuf {
        dirs_home().join(".parley")
    }

    /// The transcript file, configured or `~/.parley/db.json`.
    pub fn transcript_path(&self) -> PathBuf {
        self.transcript
            .path
            .clone()
            .unwrap_or_else(|| Self::config_dir().join("db.json"))
    }

    /// The tool-round cap, `None` when disabled.
    pub fn tool_round_limit(&self) -> Option<u32> {
        (self.max_tool_rounds > 0).then_some(self.max_tool_rounds)
    }

    /// Validate the configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(ConfigError::ValidationError(
                "temperature must be between 0.0 and 2.0".into(),
            ));
        }

        if self.vector.top_k == 0 {
            return Err(ConfigError::ValidationError(
                "vector.top_k must be at least 1".into(),
            ));
        }

        Ok(())
    }

    /// Check if an API key is available (from config or environment).
    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    /// Generate a default config TOML string (for the `onboard` command).
    pub fn default_toml() -> String {
        let config = Self::default();
        toml::to_string_pretty(&config).unwrap_or_default()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_base_url(),
            model: default_model(),
            temperature: default_temperature(),
            max_tool_rounds: default_max_tool_rounds(),
            system_prompt: None,
            transcript: TranscriptConfig::default(),
            image: ImageConfig::default(),
            vector: VectorConfig::default(),
            services: ServicesConfig::default(),
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
