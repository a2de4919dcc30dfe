//! Tool trait: the abstraction over the assistant's capabilities.
//!
//! Tools are what let the model act on the project: read and edit files,
//! run shell commands, search the tree, ask the developer a question.

use std::collections::HashMap;
use std::panic::AssertUnwindSafe;
use std::path::Path;

use async_trait::async_trait;
use futures::FutureExt;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::error::ToolError;

/// Parameters of a tool call, keyed by name.
pub type Params = Map<String, Value>;

/// A request to execute a tool, decoded from one `<tool>` block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    /// Name of the tool to execute
    pub tool: String,

    /// Parameters; absent or `null` means none
    #[serde(default, deserialize_with = "null_as_empty")]
    pub params: Params,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Params, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Params>::deserialize(deserializer)?.unwrap_or_default())
}

/// A tool definition rendered into the system prompt so the model knows
/// what it can call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDefinition {
    /// The tool name
    pub name: String,

    /// Description of what the tool does
    pub description: String,

    /// JSON Schema describing the tool's parameters
    pub parameters: Value,
}

/// The core Tool trait.
///
/// Each tool (read_file, run_command, search_content, etc.) implements this
/// trait and is registered in the [`ToolRegistry`].
///
/// `execute` returns the result text, already prefixed with its outcome
/// marker. Expected failures the model should see verbatim (file not found,
/// ambiguous edit) are returned as `Ok` text; `Err` is reserved for faults
/// the registry renders as `[Error] <tool> failed: ...`.
#[async_trait]
pub trait Tool: Send + Sync {
    /// The unique name of this tool (e.g., "read_file").
    fn name(&self) -> &str;

    /// A description of what this tool does (sent to the model).
    fn description(&self) -> &str;

    /// JSON Schema describing this tool's parameters.
    fn parameters_schema(&self) -> Value;

    /// Execute the tool against the project rooted at `root`.
    async fn execute(&self, params: &Params, root: &Path) -> Result<String, ToolError>;

    /// Convert this tool into a ToolDefinition for the system prompt.
    fn to_definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: self.name().to_string(),
            description: self.description().to_string(),
            parameters: self.parameters_schema(),
        }
    }
}

/// A registry of available tools.
///
/// The agent loop uses this to:
/// 1. Describe the tools in the system prompt
/// 2. Dispatch each extracted call by name
pub struct ToolRegistry {
    tools: HashMap<String, Box<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self {
            tools: HashMap::new(),
        }
    }

    /// Register a tool. Replaces any existing tool with the same name.
    pub fn register(&mut self, tool: Box<dyn Tool>) {
        let name = tool.name().to_string();
        self.tools.insert(name, tool);
    }

    /// Get a tool by name.
    pub fn get(&self, name: &str) -> Option<&dyn Tool> {
        self.tools.get(name).map(|t| t.as_ref())
    }

    /// All tool definitions, sorted by name.
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        let mut defs: Vec<ToolDefinition> = self.tools.values().map(|t| t.to_definition()).collect();
        defs.sort_by(|a, b| a.name.cmp(&b.name));
        defs
    }

    /// Execute a tool call, surfacing failures as errors.
    pub async fn execute(&self, call: &ToolCall, root: &Path) -> Result<String, ToolError> {
        let tool = self
            .tools
            .get(&call.tool)
            .ok_or_else(|| ToolError::UnknownTool(call.tool.clone()))?;

        match AssertUnwindSafe(tool.execute(&call.params, root))
            .catch_unwind()
            .await
        {
            Ok(result) => result,
            Err(payload) => Err(ToolError::ExecutionFailed {
                reason: format!("panicked: {}", panic_message(payload.as_ref())),
            }),
        }
    }

    /// Execute a tool call and always produce result text.
    ///
    /// Unknown names become `[Error] Unknown tool: <name>`; every other
    /// fault becomes `[Error] <tool> failed: <message>`.
    pub async fn dispatch(&self, call: &ToolCall, root: &Path) -> String {
        match self.execute(call, root).await {
            Ok(output) => {
                debug!(tool = %call.tool, bytes = output.len(), "Tool completed");
                output
            }
            Err(e @ ToolError::UnknownTool(_)) => {
                warn!(tool = %call.tool, "Model requested an unknown tool");
                format!("[Error] {e}")
            }
            Err(e) => {
                warn!(tool = %call.tool, error = %e, "Tool execution failed");
                format!("[Error] {} failed: {e}", call.tool)
            }
        }
    }

    /// List all registered tool names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.tools.keys().map(|s| s.as_str()).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".into()
    }
}
