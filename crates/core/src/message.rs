//! Message and Conversation domain types.
//!
//! These are the value objects that flow through the tool loop:
//! operator types text → Session appends it → Provider streams a reply →
//! tool results are folded back as synthetic user turns.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a conversation (session).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConversationId(pub String);

impl ConversationId {
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }
}

impl Default for ConversationId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ConversationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The role of a message sender in a conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// System instructions (identity, tool protocol, project context)
    System,
    /// The developer, or tool results handed back on their behalf
    User,
    /// The model
    Assistant,
}

/// A single message in a conversation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    /// Who sent this message
    pub role: Role,

    /// The text content
    pub content: String,
}

impl Message {
    fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    /// Create a new user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    /// Create a new assistant message.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }

    /// Create a new system message.
    pub fn system(content: impl Into<String>) -> Self {
        Self::new(Role::System, content)
    }
}

/// An append-only, ordered sequence of messages.
///
/// The first message is always the system prompt, fixed at construction.
/// Resetting a conversation means building a new one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Conversation {
    /// Unique conversation ID
    pub id: ConversationId,

    messages: Vec<Message>,
}

impl Conversation {
    /// Create a conversation seeded with its system prompt.
    pub fn new(system_prompt: impl Into<String>) -> Self {
        Self {
            id: ConversationId::new(),
            messages: vec![Message::system(system_prompt)],
        }
    }

    /// Append a user message.
    pub fn push_user(&mut self, content: impl Into<String>) {
        self.push(Message::user(content));
    }

    /// Append an assistant message.
    pub fn push_assistant(&mut self, content: impl Into<String>) {
        self.push(Message::assistant(content));
    }

    fn push(&mut self, message: Message) {
        self.messages.push(message);
    }

    /// All messages, system prompt first.
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// The most recent message.
    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    /// Get the total token count estimate (rough: 4 chars ≈ 1 token).
    pub fn estimated_tokens(&self) -> usize {
        self.messages.iter().map(|m| m.content.len() / 4).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conversation_starts_with_system_prompt() {
        let conv = Conversation::new("You are a coding assistant.");
        assert_eq!(conv.len(), 1);
        assert_eq!(conv.messages()[0].role, Role::System);
        assert_eq!(conv.messages()[0].content, "You are a coding assistant.");
    }

    #[test]
    fn conversation_appends_in_order() {
        let mut conv = Conversation::new("sys");
        conv.push_user("first");
        conv.push_assistant("second");
        conv.push_user("third");

        let roles: Vec<Role> = conv.messages().iter().map(|m| m.role).collect();
        assert_eq!(roles, vec![Role::System, Role::User, Role::Assistant, Role::User]);
        assert_eq!(conv.last().map(|m| m.content.as_str()), Some("third"));
    }

    #[test]
    fn fresh_conversations_do_not_share_history() {
        let mut old = Conversation::new("sys");
        old.push_user("hello");
        let fresh = Conversation::new("sys");
        assert_ne!(old.id, fresh.id);
        assert_eq!(fresh.len(), 1);
        assert_eq!(old.len(), 2);
    }

    #[test]
    fn role_serializes_lowercase() {
        let json = serde_json::to_string(&Role::Assistant).unwrap();
        assert_eq!(json, "\"assistant\"");
    }

    #[test]
    fn conversation_token_estimate() {
        // "sys!" is 4 chars ≈ 1 token; 20 chars ≈ 5 tokens
        let mut conv = Conversation::new("sys!");
        conv.push_user("12345678901234567890");
        assert_eq!(conv.estimated_tokens(), 6);
    }
}
