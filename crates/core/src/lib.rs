//! # Orangutan Core
//!
//! Domain types, traits, and error definitions for the Orangutan coding
//! assistant. This crate has **no I/O of its own**; it defines the model
//! that the provider, tool, and agent crates implement against.
//!
//! ## Design Philosophy
//!
//! Every collaborator of the tool loop is a trait here:
//! - [`Provider`]: the streaming inference backend
//! - [`Tool`]: one named, side-effecting operation
//! - [`Operator`]: the human at the terminal, asked questions by `ask_user`
//!
//! Implementations live in their respective crates, which keeps the agent
//! loop testable with scripted stand-ins.

pub mod error;
pub mod message;
pub mod operator;
pub mod provider;
pub mod tool;

// Re-export key types at crate root for ergonomics
pub use error::{Error, Result};
pub use message::{Conversation, ConversationId, Message, Role};
pub use operator::{Operator, OperatorReply};
pub use provider::{GenerationOptions, Provider, ProviderRequest, StreamChunk};
pub use tool::{Tool, ToolCall, ToolDefinition, ToolRegistry};
