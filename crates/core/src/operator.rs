//! Operator trait: the human at the terminal.
//!
//! The `ask_user` tool suspends the loop and hands a question to the
//! operator. Implementations render a choice list or a free-text prompt;
//! an interrupt while prompting is a cancellation, never a crash.

use async_trait::async_trait;

/// What the operator answered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OperatorReply {
    /// One of the offered choices
    Choice(String),
    /// Free-typed text
    Text(String),
    /// The operator aborted the prompt (Ctrl-C / EOF)
    Cancelled,
}

#[async_trait]
pub trait Operator: Send + Sync {
    /// Ask a question, optionally offering an ordered list of choices.
    async fn ask(&self, question: &str, options: &[String]) -> OperatorReply;
}
