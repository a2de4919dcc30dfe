//! Ollama provider implementation.
//!
//! Talks to a local Ollama server over its native API:
//! - `POST /api/chat` with `stream: true`, answered as newline-delimited JSON
//! - `GET /api/tags` for model listing and health checks

use std::time::Duration;

use async_trait::async_trait;
use futures::StreamExt;
use orangutan_config::AppConfig;
use orangutan_core::error::ProviderError;
use orangutan_core::message::{Message, Role};
use orangutan_core::provider::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};

/// A provider backed by an Ollama server.
pub struct OllamaProvider {
    base_url: String,
    client: reqwest::Client,
}

impl OllamaProvider {
    /// Create a provider for the server at `base_url`.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, ProviderError> {
        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .timeout(timeout)
            .build()
            .map_err(|e| ProviderError::Network(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client,
        })
    }

    /// Create a provider from the `[backend]` config table.
    pub fn from_config(config: &AppConfig) -> Result<Self, ProviderError> {
        Self::new(
            config.backend.base_url.clone(),
            Duration::from_secs(config.backend.request_timeout_secs),
        )
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Convert our Message types to the Ollama wire format.
    fn to_api_messages(messages: &[Message]) -> Vec<ApiMessage<'_>> {
        messages
            .iter()
            .map(|m| ApiMessage {
                role: match m.role {
                    Role::System => "system",
                    Role::User => "user",
                    Role::Assistant => "assistant",
                },
                content: &m.content,
            })
            .collect()
    }

    fn chat_body(request: &ProviderRequest) -> serde_json::Value {
        let mut body = serde_json::json!({
            "model": request.model,
            "messages": Self::to_api_messages(&request.messages),
            "stream": true,
            "options": request.options,
        });
        if let Some(keep_alive) = &request.keep_alive {
            body["keep_alive"] = serde_json::json!(keep_alive);
        }
        body
    }
}

#[async_trait]
impl Provider for OllamaProvider {
    fn name(&self) -> &str {
        "ollama"
    }

    async fn stream(&self, request: ProviderRequest) -> Result<ChunkReceiver, ProviderError> {
        let url = format!("{}/api/chat", self.base_url);
        let body = Self::chat_body(&request);

        debug!(
            model = %request.model,
            messages = request.messages.len(),
            "Sending streaming chat request"
        );

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| ProviderError::Network(e.to_string()))?;

        let status = response.status().as_u16();
        if status != 200 {
            let error_body = response.text().await.unwrap_or_default();
            warn!(status, body = %error_body, "Ollama returned error");
            let message = error_message(&error_body);
            if status == 404 && message.contains("not found") {
                return Err(ProviderError::ModelNotFound(request.model));
            }
            return Err(ProviderError::ApiError {
                status_code: status,
                message,
            });
        }

        let (tx, rx) = tokio::sync::mpsc::channel(64);

        // Read the NDJSON byte stream and forward parsed chunks
        tokio::spawn(async move {
            let mut byte_stream = response.bytes_stream();
            let mut lines = LineBuffer::default();
            let mut chunks_sent = 0usize;

            while let Some(chunk_result) = byte_stream.next().await {
                let bytes = match chunk_result {
                    Ok(b) => b,
                    Err(e) => {
                        let _ = tx
                            .send(Err(ProviderError::StreamInterrupted(e.to_string())))
                            .await;
                        return;
                    }
                };

                for line in lines.push(&bytes) {
                    match parse_line(&line) {
                        Ok(None) => {}
                        Ok(Some(chunk)) => {
                            let done = chunk.done;
                            chunks_sent += 1;
                            if tx.send(Ok(chunk)).await.is_err() {
                                return; // receiver dropped
                            }
                            if done {
                                debug!(chunks = chunks_sent, "Stream completed");
                                return;
                            }
                        }
                        Err(e) => {
                            let _ = tx.send(Err(e)).await;
                            return;
                        }
                    }
                }
            }

            // A final line without a trailing newline
            if let Some(rest) = lines.finish() {
                match parse_line(&rest) {
                    Ok(Some(chunk)) => {
                        let _ = tx.send(Ok(chunk)).await;
                    }
                    Ok(None) => {}
                    Err(e) => {
                        let _ = tx.send(Err(e)).await;
                    }
                }
            }
            trace!(chunks = chunks_sent, "Byte stream ended");
        });

        Ok(rx)
    }

    async fn list_models(&self) -> Result<Vec<String>, ProviderError> {
        let url = format!("{}/api/tags", self.base_url);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| ProviderError::Network(e.to_string()))?;

        if !response.status().is_success() {
            return Ok(Vec::new());
        }

        let tags: TagsResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::InvalidResponse(e.to_string()))?;

        Ok(tags.models.into_iter().map(|m| m.name).collect())
    }

    async fn health_check(&self) -> Result<bool, ProviderError> {
        let url = format!("{}/api/tags", self.base_url);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| ProviderError::Network(e.to_string()))?;

        Ok(response.status().is_success())
    }
}

/// Splits a byte stream into complete lines. Bytes are buffered until a
/// newline arrives, so multi-byte characters split across reads survive.
#[derive(Default)]
struct LineBuffer {
    pending: Vec<u8>,
}

impl LineBuffer {
    fn push(&mut self, bytes: &[u8]) -> Vec<String> {
        self.pending.extend_from_slice(bytes);
        let mut lines = Vec::new();
        while let Some(pos) = self.pending.iter().position(|&b| b == b'\n') {
            let line: Vec<u8> = self.pending.drain(..=pos).collect();
            lines.push(String::from_utf8_lossy(&line).trim_end().to_string());
        }
        lines
    }

    fn finish(self) -> Option<String> {
        let rest = String::from_utf8_lossy(&self.pending).trim().to_string();
        (!rest.is_empty()).then_some(rest)
    }
}

/// Parse one NDJSON line. Blank lines yield `None`.
fn parse_line(line: &str) -> Result<Option<StreamChunk>, ProviderError> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }

    let resp: ChatStreamResponse = serde_json::from_str(line)
        .map_err(|e| ProviderError::InvalidResponse(format!("{e}: {line}")))?;

    if let Some(error) = resp.error {
        return Err(ProviderError::StreamInterrupted(error));
    }

    let usage = match (resp.prompt_eval_count, resp.eval_count) {
        (None, None) => None,
        (prompt, completion) => {
            let prompt_tokens = prompt.unwrap_or(0);
            let completion_tokens = completion.unwrap_or(0);
            Some(Usage {
                prompt_tokens,
                completion_tokens,
                total_tokens: prompt_tokens + completion_tokens,
            })
        }
    };

    Ok(Some(StreamChunk {
        content: resp.message.map(|m| m.content).filter(|c| !c.is_empty()),
        done: resp.done,
        usage,
    }))
}

/// Pull the `error` field out of an Ollama error body, falling back to the raw text.
fn error_message(body: &str) -> String {
    serde_json::from_str::<ErrorBody>(body)
        .map(|b| b.error)
        .unwrap_or_else(|_| body.trim().to_string())
}

// --- Ollama API types ---

#[derive(Debug, Serialize)]
struct ApiMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatStreamResponse {
    #[serde(default)]
    message: Option<ChatStreamMessage>,
    #[serde(default)]
    done: bool,
    #[serde(default)]
    prompt_eval_count: Option<u32>,
    #[serde(default)]
    eval_count: Option<u32>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChatStreamMessage {
    #[serde(default)]
    content: String,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
}

#[derive(Debug, Deserialize)]
struct TagsResponse {
    #[serde(default)]
    models: Vec<TagsModel>,
}

#[derive(Debug, Deserialize)]
struct TagsModel {
    name: String,
}
