//! The agent loop controller.

use std::path::PathBuf;
use std::sync::Arc;

use orangutan_core::tool::ToolRegistry;
use tracing::{debug, info, warn};

use crate::extract::extract_tool_calls;
use crate::session::ChatSession;

/// Instruction sent after every fold-back.
pub const CONTINUE_PROMPT: &str = "Continue based on the tool results above.";

/// Default bound on extract-execute-fold-back rounds per user turn.
pub const DEFAULT_MAX_ROUNDS: u32 = 10;

/// How a turn ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnState {
    /// The last reply carried no tool calls
    Idle,
    /// The round bound was hit while the model still wanted tools
    RoundLimitReached,
}

/// The result of one user turn.
#[derive(Debug, Clone)]
pub struct TurnOutcome {
    /// The last reply streamed by the model
    pub response: String,
    /// Rounds executed
    pub rounds: u32,
    pub state: TurnState,
}

/// Drives tool rounds for a session against one project root.
pub struct AgentLoop {
    /// Tool registry
    tools: Arc<ToolRegistry>,

    /// Project root every tool is confined to
    root: PathBuf,

    /// Maximum tool rounds per turn
    max_rounds: u32,
}

impl AgentLoop {
    pub fn new(tools: Arc<ToolRegistry>, root: impl Into<PathBuf>) -> Self {
        Self {
            tools,
            root: root.into(),
            max_rounds: DEFAULT_MAX_ROUNDS,
        }
    }

    /// Set the maximum number of tool rounds per turn.
    pub fn with_max_rounds(mut self, max: u32) -> Self {
        self.max_rounds = max;
        self
    }

    /// Run one user turn to completion.
    ///
    /// Tool calls in a reply run strictly in order. Side effects of earlier
    /// calls stand even if a later one fails.
    pub async fn run_turn(&self, session: &mut ChatSession, text: &str) -> TurnOutcome {
        info!(chars = text.len(), "Processing user turn");
        let mut response = session.send(text).await;
        let mut rounds = 0;

        loop {
            let calls = extract_tool_calls(&response);
            if calls.is_empty() {
                debug!(rounds, "Turn complete");
                return TurnOutcome {
                    response,
                    rounds,
                    state: TurnState::Idle,
                };
            }

            if rounds >= self.max_rounds {
                warn!(
                    rounds,
                    pending = calls.len(),
                    "Max tool rounds reached, ending turn"
                );
                return TurnOutcome {
                    response,
                    rounds,
                    state: TurnState::RoundLimitReached,
                };
            }
            rounds += 1;
            debug!(round = rounds, tool_count = calls.len(), "Executing tool calls");

            let mut results = Vec::with_capacity(calls.len());
            for call in &calls {
                let result = self.tools.dispatch(call, &self.root).await;
                results.push(format!("Tool result for {}:\n{result}", call.tool));
            }
            session.add_tool_result(results.join("\n\n"));

            session.emit("\n");
            response = session.send(CONTINUE_PROMPT).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::tests::{Captured, ScriptedProvider, config};
    use async_trait::async_trait;
    use orangutan_core::error::{ProviderError, ToolError};
    use orangutan_core::message::Role;
    use orangutan_core::provider::{ChunkReceiver, Provider, ProviderRequest, StreamChunk};
    use orangutan_core::tool::{Params, Tool};
    use std::path::Path;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Records every call in order.
    struct Recorder {
        name: &'static str,
        log: Arc<Mutex<Vec<String>>>,
    }

    #[async_trait]
    impl Tool for Recorder {
        fn name(&self) -> &str {
            self.name
        }
        fn description(&self) -> &str {
            "records calls"
        }
        fn parameters_schema(&self) -> serde_json::Value {
            serde_json::json!({"type": "object"})
        }
        async fn execute(&self, params: &Params, _root: &Path) -> Result<String, ToolError> {
            let arg = params.get("n").map(|v| v.to_string()).unwrap_or_default();
            self.log.lock().unwrap().push(format!("{}:{arg}", self.name));
            if self.name == "fail" {
                return Err(ToolError::ExecutionFailed {
                    reason: "boom".into(),
                });
            }
            Ok(format!("[{}] ok", self.name))
        }
    }

    /// Always answers with one well-formed tool call.
    struct LoopingProvider {
        sends: AtomicUsize,
    }

    #[async_trait]
    impl Provider for LoopingProvider {
        fn name(&self) -> &str {
            "looping"
        }
        async fn stream(&self, _request: ProviderRequest) -> Result<ChunkReceiver, ProviderError> {
            let n = self.sends.fetch_add(1, Ordering::SeqCst);
            let (tx, rx) = tokio::sync::mpsc::channel(4);
            let reply = format!(r#"again <tool>{{"tool": "rec", "params": {{"n": {n}}}}}</tool>"#);
            tx.send(Ok(StreamChunk::text(reply))).await.ok();
            tx.send(Ok(StreamChunk::finished())).await.ok();
            Ok(rx)
        }
    }

    fn registry(log: &Arc<Mutex<Vec<String>>>) -> Arc<ToolRegistry> {
        let mut registry = ToolRegistry::new();
        for name in ["rec", "other", "fail"] {
            registry.register(Box::new(Recorder {
                name,
                log: log.clone(),
            }));
        }
        Arc::new(registry)
    }

    fn session(provider: Arc<dyn Provider>) -> ChatSession {
        ChatSession::new(provider, "sys", config()).with_output(Box::new(Captured::default()))
    }

    #[tokio::test]
    async fn plain_reply_is_idle_after_zero_rounds() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let agent = AgentLoop::new(registry(&log), "/proj");
        let mut session = session(ScriptedProvider::new(&["Just an answer."]));

        let outcome = agent.run_turn(&mut session, "hi").await;
        assert_eq!(outcome.state, TurnState::Idle);
        assert_eq!(outcome.rounds, 0);
        assert_eq!(outcome.response, "Just an answer.");
        assert!(log.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn results_are_labelled_joined_and_folded_back() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let agent = AgentLoop::new(registry(&log), "/proj");
        let provider = ScriptedProvider::new(&[
            r#"<tool>{"tool": "rec", "params": {"n": 1}}</tool><tool>{"tool": "nope"}</tool><tool>{"tool": "other"}</tool>"#,
            "All done.",
        ]);
        let mut session = session(provider.clone());

        let outcome = agent.run_turn(&mut session, "do it").await;
        assert_eq!(outcome.state, TurnState::Idle);
        assert_eq!(outcome.rounds, 1);
        assert_eq!(outcome.response, "All done.");

        let msgs = session.messages();
        let folded = &msgs[3];
        assert_eq!(folded.role, Role::User);
        assert_eq!(
            folded.content,
            "Tool result for rec:\n[rec] ok\n\n\
             Tool result for nope:\n[Error] Unknown tool: nope\n\n\
             Tool result for other:\n[other] ok"
        );
        assert_eq!(msgs[4].content, CONTINUE_PROMPT);
        assert_eq!(provider.requests.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn failing_tool_does_not_undo_or_stop_the_round() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let agent = AgentLoop::new(registry(&log), "/proj");
        let provider = ScriptedProvider::new(&[
            r#"<tool>{"tool": "rec", "params": {"n": 1}}</tool><tool>{"tool": "fail"}</tool><tool>{"tool": "rec", "params": {"n": 2}}</tool>"#,
            "ok",
        ]);
        let mut session = session(provider);

        agent.run_turn(&mut session, "go").await;
        assert_eq!(*log.lock().unwrap(), vec!["rec:1", "fail:", "rec:2"]);
        assert!(session.messages()[3]
            .content
            .contains("Tool result for fail:\n[Error] fail failed: boom"));
    }

    #[tokio::test]
    async fn runaway_tool_calling_stops_at_the_round_limit() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let agent = AgentLoop::new(registry(&log), "/proj");
        let provider = Arc::new(LoopingProvider {
            sends: AtomicUsize::new(0),
        });
        let mut session = session(provider.clone());

        let outcome = agent.run_turn(&mut session, "loop forever").await;
        assert_eq!(outcome.state, TurnState::RoundLimitReached);
        assert_eq!(outcome.rounds, 10);
        assert_eq!(log.lock().unwrap().len(), 10);
        assert_eq!(provider.sends.load(Ordering::SeqCst), 11);
        assert!(outcome.response.contains("\"n\": 10"));
    }

    #[tokio::test]
    async fn round_limit_is_configurable() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let agent = AgentLoop::new(registry(&log), "/proj").with_max_rounds(2);
        let provider = Arc::new(LoopingProvider {
            sends: AtomicUsize::new(0),
        });
        let mut session = session(provider.clone());

        let outcome = agent.run_turn(&mut session, "loop").await;
        assert_eq!(outcome.rounds, 2);
        assert_eq!(outcome.state, TurnState::RoundLimitReached);
        assert_eq!(provider.sends.load(Ordering::SeqCst), 3);
    }
}
