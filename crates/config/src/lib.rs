//! Configuration loading, validation, and management for Orangutan.
//!
//! Loads configuration from `~/.orangutan/config.toml` with environment
//! variable overrides. Validates all settings at startup.
//!
//! The per-project memory file (`.orangutan-config/orangutan.md`) lives in
//! [`project`].

pub mod project;

pub use project::{ProjectMemory, SectionChange, MEMORY_DIR, MEMORY_FILE};

use orangutan_core::provider::GenerationOptions;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// The root configuration structure.
///
/// Maps directly to `~/.orangutan/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Model tag served by the backend
    #[serde(default = "default_model")]
    pub model: String,

    /// Inference backend settings
    #[serde(default)]
    pub backend: BackendConfig,

    /// Generation options sent with every request
    #[serde(default)]
    pub options: GenerationOptions,

    /// Agent loop settings
    #[serde(default)]
    pub agent: AgentConfig,

    /// Built-in tool limits
    #[serde(default)]
    pub tools: ToolsConfig,
}

fn default_model() -> String {
    "qwen2.5-coder:7b-instruct".into()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Base URL of the Ollama server
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// How long the backend keeps the model loaded between requests
    #[serde(default = "default_keep_alive")]
    pub keep_alive: String,

    /// Whole-request timeout, in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

fn default_base_url() -> String {
    "http://localhost:11434".into()
}
fn default_keep_alive() -> String {
    "10m".into()
}
fn default_request_timeout() -> u64 {
    600
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            keep_alive: default_keep_alive(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentConfig {
    /// Maximum extract-execute-foldback rounds per user turn
    #[serde(default = "default_max_tool_rounds")]
    pub max_tool_rounds: u32,
}

fn default_max_tool_rounds() -> u32 {
    10
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            max_tool_rounds: default_max_tool_rounds(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolsConfig {
    /// Lines returned per read_file call
    #[serde(default = "default_read_window")]
    pub read_window: usize,

    /// Wall-clock limit for run_command, in seconds
    #[serde(default = "default_command_timeout")]
    pub command_timeout_secs: u64,

    /// Maximum results for search_files and search_content
    #[serde(default = "default_search_limit")]
    pub search_limit: usize,

    /// Characters kept per search_content match line
    #[serde(default = "default_line_char_budget")]
    pub line_char_budget: usize,
}

fn default_read_window() -> usize {
    200
}
fn default_command_timeout() -> u64 {
    30
}
fn default_search_limit() -> usize {
    50
}
fn default_line_char_budget() -> usize {
    120
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            read_window: default_read_window(),
            command_timeout_secs: default_command_timeout(),
            search_limit: default_search_limit(),
            line_char_budget: default_line_char_budget(),
        }
    }
}

impl AppConfig {
    /// Load configuration from the default path (~/.orangutan/config.toml).
    ///
    /// Environment variables take precedence over the file:
    /// - `ORANGUTAN_MODEL`
    /// - `ORANGUTAN_OLLAMA_URL`, then `OLLAMA_HOST`
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::config_dir().join("config.toml");
        let mut config = Self::load_from(&config_path)?;

        if let Ok(model) = std::env::var("ORANGUTAN_MODEL") {
            config.model = model;
        }

        if let Some(url) = std::env::var("ORANGUTAN_OLLAMA_URL")
            .ok()
            .or_else(|| std::env::var("OLLAMA_HOST").ok())
        {
            config.backend.base_url = normalize_base_url(&url);
        }

        Ok(config)
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::debug!("No config file found at {}, using defaults", path.display());
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
        dirs_home().join(".orangutan")
    }

    /// Validate the configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.model.trim().is_empty() {
            return Err(ConfigError::ValidationError("model must not be empty".into()));
        }

        if !(0.0..=2.0).contains(&self.options.temperature) {
            return Err(ConfigError::ValidationError(
                "options.temperature must be between 0.0 and 2.0".into(),
            ));
        }

        if !(0.0..=1.0).contains(&self.options.top_p) {
            return Err(ConfigError::ValidationError(
                "options.top_p must be between 0.0 and 1.0".into(),
            ));
        }

        if self.agent.max_tool_rounds == 0 {
            return Err(ConfigError::ValidationError(
                "agent.max_tool_rounds must be at least 1".into(),
            ));
        }

        if self.tools.read_window == 0
            || self.tools.search_limit == 0
            || self.tools.command_timeout_secs == 0
        {
            return Err(ConfigError::ValidationError(
                "tools.read_window, tools.search_limit and tools.command_timeout_secs must be positive"
                    .into(),
            ));
        }

        Ok(())
    }

    /// Generate a default config TOML string.
    pub fn default_toml() -> String {
        toml::to_string_pretty(&Self::default()).unwrap_or_default()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            model: default_model(),
            backend: BackendConfig::default(),
            options: GenerationOptions::default(),
            agent: AgentConfig::default(),
            tools: ToolsConfig::default(),
        }
    }
}

/// `OLLAMA_HOST` is often given without a scheme (`127.0.0.1:11434`).
fn normalize_base_url(url: &str) -> String {
    let url = url.trim().trim_end_matches('/');
    if url.starts_with("http://") || url.starts_with("https://") {
        url.to_string()
    } else {
        format!("http://{url}")
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

    #[error("Failed to write {path}: {reason}")]
    WriteError { path: PathBuf, reason: String },

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}
