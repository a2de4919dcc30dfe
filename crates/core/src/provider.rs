//! Provider trait: the abstraction over the inference backend.
//!
//! A Provider takes the ordered message history plus generation options and
//! returns a stream of incremental text chunks.
//!
//! Implementations: Ollama (local).

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use crate::error::ProviderError;
use crate::message::Message;

/// Sampling and context options sent with every request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationOptions {
    /// Lower = more focused and deterministic output
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Nucleus sampling threshold
    #[serde(default = "default_top_p")]
    pub top_p: f32,

    /// Limits the token pool per step
    #[serde(default = "default_top_k")]
    pub top_k: u32,

    /// Context window size (tokens)
    #[serde(default = "default_num_ctx")]
    pub num_ctx: u32,

    /// Maximum tokens to generate (-1 = unlimited)
    #[serde(default = "default_num_predict")]
    pub num_predict: i32,

    /// Penalizes repeated tokens/phrases
    #[serde(default = "default_repeat_penalty")]
    pub repeat_penalty: f32,

    /// Stop sequences
    #[serde(default = "default_stop")]
    pub stop: Vec<String>,
}

fn default_temperature() -> f32 {
    0.4
}
fn default_top_p() -> f32 {
    0.9
}
fn default_top_k() -> u32 {
    40
}
fn default_num_ctx() -> u32 {
    8192
}
fn default_num_predict() -> i32 {
    -1
}
fn default_repeat_penalty() -> f32 {
    1.1
}
fn default_stop() -> Vec<String> {
    vec!["[END]".into()]
}

impl Default for GenerationOptions {
    fn default() -> Self {
        Self {
            temperature: default_temperature(),
            top_p: default_top_p(),
            top_k: default_top_k(),
            num_ctx: default_num_ctx(),
            num_predict: default_num_predict(),
            repeat_penalty: default_repeat_penalty(),
            stop: default_stop(),
        }
    }
}

/// One streaming exchange with the backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderRequest {
    /// The model to use (e.g., "qwen2.5-coder:7b-instruct")
    pub model: String,

    /// The conversation messages, system prompt first
    pub messages: Vec<Message>,

    /// Generation options
    #[serde(default)]
    pub options: GenerationOptions,

    /// How long the backend should keep the model loaded (e.g., "10m")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keep_alive: Option<String>,
}

/// Token usage information.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Usage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

/// A single chunk in a streaming response.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StreamChunk {
    /// Partial content delta
    #[serde(default)]
    pub content: Option<String>,

    /// Whether this is the final chunk
    #[serde(default)]
    pub done: bool,

    /// Usage info (typically only in the final chunk)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<Usage>,
}

impl StreamChunk {
    /// A content-only chunk.
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: Some(content.into()),
            done: false,
            usage: None,
        }
    }

    /// The terminating chunk.
    pub fn finished() -> Self {
        Self {
            content: None,
            done: true,
            usage: None,
        }
    }
}

/// Receiving half of a token stream.
pub type ChunkReceiver =
    tokio::sync::mpsc::Receiver<std::result::Result<StreamChunk, ProviderError>>;

/// The core Provider trait.
///
/// The streaming session calls `stream()` without knowing which backend
/// is in use; tests substitute scripted providers.
#[async_trait]
pub trait Provider: Send + Sync {
    /// A human-readable name for this provider (e.g., "ollama").
    fn name(&self) -> &str;

    /// Send a request and get a stream of response chunks.
    ///
    /// The stream ends with a `done` chunk, an `Err` item, or the sender
    /// being dropped.
    async fn stream(
        &self,
        request: ProviderRequest,
    ) -> std::result::Result<ChunkReceiver, ProviderError>;

    /// List available models for this provider.
    async fn list_models(&self) -> std::result::Result<Vec<String>, ProviderError> {
        Ok(Vec::new())
    }

    /// Health check: can we reach the provider?
    async fn health_check(&self) -> std::result::Result<bool, ProviderError> {
        Ok(true)
    }
}
