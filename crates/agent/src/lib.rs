//! The agentic tool loop: the heart of Orangutan.
//!
//! Each user turn follows an **Extract → Execute → Fold back** cycle:
//!
//! 1. **Send** the developer's text through the [`ChatSession`], streaming
//!    the reply to the terminal
//! 2. **Extract** `<tool>{...}</tool>` blocks from the reply
//! 3. **Execute** each call in order through the tool registry
//! 4. **Fold back** the labelled results as a synthetic user turn and ask
//!    the model to continue
//!
//! The loop stops when a reply carries no tool calls, or after a fixed
//! number of rounds.

pub mod extract;
pub mod indicator;
pub mod loop_runner;
pub mod prompt;
pub mod session;

pub use extract::extract_tool_calls;
pub use loop_runner::{AgentLoop, TurnOutcome, TurnState};
pub use prompt::{build_directory_tree, build_system_prompt};
pub use session::{ChatSession, SessionConfig};
