//! The streaming chat session.
//!
//! Owns the conversation history for one session and performs one
//! request/response exchange per [`ChatSession::send`]. Tokens are written
//! to the output as they arrive. Backend failures never escape: they are
//! printed and stored inline as a `[Connection error: ...]` annotation.

use std::io::Write;
use std::sync::Arc;

use orangutan_config::AppConfig;
use orangutan_core::message::{Conversation, Message};
use orangutan_core::provider::{GenerationOptions, Provider, ProviderRequest};
use tracing::{debug, warn};

use crate::indicator::ThinkingIndicator;

/// Per-session request settings.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Model tag sent with every request
    pub model: String,

    /// Generation options sent with every request
    pub options: GenerationOptions,

    /// How long the backend keeps the model loaded
    pub keep_alive: Option<String>,

    /// Animate "Thinking..." until the first token
    pub indicator: bool,
}

impl SessionConfig {
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            model: config.model.clone(),
            options: config.options.clone(),
            keep_alive: Some(config.backend.keep_alive.clone()),
            indicator: false,
        }
    }

    pub fn with_indicator(mut self, enabled: bool) -> Self {
        self.indicator = enabled;
        self
    }
}

/// One live conversation with the backend.
///
/// A reset is a new `ChatSession`; history is never rewritten in place.
pub struct ChatSession {
    provider: Arc<dyn Provider>,
    config: SessionConfig,
    conversation: Conversation,
    out: Box<dyn Write + Send>,
    indicator_out: IndicatorSink,
}

/// Opens the writer a new indicator animates on.
type IndicatorSink = Box<dyn Fn() -> Box<dyn Write + Send> + Send>;

impl ChatSession {
    pub fn new(
        provider: Arc<dyn Provider>,
        system_prompt: impl Into<String>,
        config: SessionConfig,
    ) -> Self {
        Self {
            provider,
            config,
            conversation: Conversation::new(system_prompt),
            out: Box::new(std::io::stdout()),
            indicator_out: Box::new(|| -> Box<dyn Write + Send> { Box::new(std::io::stdout()) }),
        }
    }

    /// Send streamed output somewhere other than stdout.
    pub fn with_output(mut self, out: Box<dyn Write + Send>) -> Self {
        self.out = out;
        self
    }

    /// Animate the indicator somewhere other than stdout.
    pub fn with_indicator_output(
        mut self,
        sink: impl Fn() -> Box<dyn Write + Send> + Send + 'static,
    ) -> Self {
        self.indicator_out = Box::new(sink);
        self
    }

    /// Send `text` as a user message and stream the reply.
    ///
    /// Returns the full reply, which is also appended to the history.
    pub async fn send(&mut self, text: &str) -> String {
        self.conversation.push_user(text);

        let request = ProviderRequest {
            model: self.config.model.clone(),
            messages: self.conversation.messages().to_vec(),
            options: self.config.options.clone(),
            keep_alive: self.config.keep_alive.clone(),
        };

        let mut indicator = self
            .config
            .indicator
            .then(|| ThinkingIndicator::start_on((self.indicator_out)()));
        let mut response = String::new();
        let mut failure = None;

        match self.provider.stream(request).await {
            Ok(mut rx) => {
                while let Some(item) = rx.recv().await {
                    match item {
                        Ok(chunk) => {
                            if let Some(token) = chunk.content.filter(|t| !t.is_empty()) {
                                if let Some(indicator) = indicator.take() {
                                    indicator.stop().await;
                                }
                                self.emit(&token);
                                response.push_str(&token);
                            }
                            if chunk.done {
                                break;
                            }
                        }
                        Err(e) => {
                            failure = Some(e);
                            break;
                        }
                    }
                }
            }
            Err(e) => failure = Some(e),
        }

        if let Some(indicator) = indicator.take() {
            indicator.stop().await;
        }

        if let Some(e) = failure {
            warn!(provider = self.provider.name(), error = %e, "Backend exchange failed");
            let note = format!("\n[Connection error: {e}]");
            self.emit(&note);
            response.push_str(&note);
        }

        self.conversation.push_assistant(response.clone());
        self.emit("\n");
        debug!(
            conversation = %self.conversation.id,
            chars = response.len(),
            messages = self.conversation.len(),
            est_tokens = self.conversation.estimated_tokens(),
            "Exchange complete"
        );
        response
    }

    /// Append combined tool output as a synthetic user turn.
    pub fn add_tool_result(&mut self, text: impl Into<String>) {
        self.conversation.push_user(text);
    }

    /// The full history, system prompt first.
    pub fn messages(&self) -> &[Message] {
        self.conversation.messages()
    }

    /// Write straight to the session output. Terminal write errors are ignored.
    pub(crate) fn emit(&mut self, text: &str) {
        let _ = self.out.write_all(text.as_bytes());
        let _ = self.out.flush();
    }
}
