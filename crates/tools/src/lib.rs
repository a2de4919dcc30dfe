//! Built-in tool implementations for Orangutan.
//!
//! Tools give the model its hands on the project: read, write and edit
//! files, list directories, search by name or content, run shell commands,
//! ask the developer a question, and keep the project memory file current.
//!
//! Every path a tool touches goes through [`orangutan_security::resolve`]
//! first; nothing here reaches outside the project root.

pub mod ask_user;
pub mod edit_file;
pub mod list_directory;
pub mod params;
pub mod read_file;
pub mod run_command;
pub mod search_content;
pub mod search_files;
pub mod update_config;
pub mod walk;
pub mod write_file;

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crossterm::style::Stylize;
use orangutan_config::ToolsConfig;
use orangutan_core::error::ToolError;
use orangutan_core::operator::Operator;
use orangutan_core::tool::ToolRegistry;

/// Create the registry holding all nine built-in tools.
///
/// `operator` answers `ask_user`; limits come from the `[tools]` config table.
pub fn default_registry(config: &ToolsConfig, operator: Arc<dyn Operator>) -> ToolRegistry {
    let mut registry = ToolRegistry::new();
    registry.register(Box::new(read_file::ReadFileTool::new(config.read_window)));
    registry.register(Box::new(write_file::WriteFileTool));
    registry.register(Box::new(edit_file::EditFileTool));
    registry.register(Box::new(run_command::RunCommandTool::new(
        config.command_timeout_secs,
    )));
    registry.register(Box::new(list_directory::ListDirectoryTool));
    registry.register(Box::new(search_files::SearchFilesTool::new(config.search_limit)));
    registry.register(Box::new(search_content::SearchContentTool::new(
        config.search_limit,
        config.line_char_budget,
    )));
    registry.register(Box::new(ask_user::AskUserTool::new(operator)));
    registry.register(Box::new(update_config::UpdateConfigTool));
    registry
}

/// Resolve a model-supplied path inside the project root.
pub(crate) fn sandboxed(path: &str, root: &Path) -> Result<PathBuf, ToolError> {
    orangutan_security::resolve(path, root).map_err(|_| ToolError::PathEscape {
        path: path.to_string(),
    })
}

/// Print a dim progress line for the operator, e.g. `  -> [read_file] src/main.rs`.
pub(crate) fn step(tool: &str, detail: &str) {
    tracing::debug!(tool, detail, "Tool step");
    let line = format!("  -> [{tool}] {detail}");
    let mut stderr = std::io::stderr().lock();
    let _ = writeln!(stderr, "{}", line.dim());
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use orangutan_core::operator::OperatorReply;
    use orangutan_core::tool::ToolCall;

    struct NoOperator;

    #[async_trait]
    impl Operator for NoOperator {
        async fn ask(&self, _question: &str, _options: &[String]) -> OperatorReply {
            OperatorReply::Cancelled
        }
    }

    fn registry() -> ToolRegistry {
        default_registry(&ToolsConfig::default(), Arc::new(NoOperator))
    }

    #[test]
    fn default_registry_has_all_tools() {
        assert_eq!(
            registry().names(),
            vec![
                "ask_user",
                "edit_file",
                "list_directory",
                "read_file",
                "run_command",
                "search_content",
                "search_files",
                "update_config",
                "write_file",
            ]
        );
    }

    #[tokio::test]
    async fn every_path_tool_rejects_escapes() {
        let dir = tempfile::tempdir().unwrap();
        let registry = registry();
        for tool in ["read_file", "write_file", "edit_file", "list_directory"] {
            let call: ToolCall = serde_json::from_value(serde_json::json!({
                "tool": tool,
                "params": {
                    "path": "../../etc/passwd",
                    "content": "x",
                    "old_string": "root",
                    "new_string": "toor"
                }
            }))
            .unwrap();
            let out = registry.dispatch(&call, dir.path()).await;
            assert_eq!(
                out,
                format!("[Error] {tool} failed: Path '../../etc/passwd' escapes the project directory."),
            );
        }
    }
}
