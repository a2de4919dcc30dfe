//! search_files: find files by name across the project.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use orangutan_core::error::ToolError;
use orangutan_core::tool::{Params, Tool};

use crate::params::optional_str;
use crate::step;
use crate::walk::{display_relative, project_files};

pub struct SearchFilesTool {
    limit: usize,
}

impl SearchFilesTool {
    pub fn new(limit: usize) -> Self {
        Self {
            limit: limit.max(1),
        }
    }
}

impl Default for SearchFilesTool {
    fn default() -> Self {
        Self::new(50)
    }
}

/// Compile a file-name glob, mapping syntax errors to a parameter error.
pub(crate) fn compile_glob(name: &str, pattern: &str) -> Result<glob::Pattern, ToolError> {
    glob::Pattern::new(pattern).map_err(|e| ToolError::invalid(name, e.to_string()))
}

/// Root-relative paths of files whose name matches `pattern`, at most
/// `take` of them.
fn find(root: &Path, pattern: &glob::Pattern, take: usize) -> Vec<String> {
    project_files(root)
        .filter(|e| pattern.matches(&e.file_name().to_string_lossy()))
        .take(take)
        .map(|e| display_relative(e.path(), root))
        .collect()
}

#[async_trait]
impl Tool for SearchFilesTool {
    fn name(&self) -> &str {
        "search_files"
    }

    fn description(&self) -> &str {
        "Find files anywhere in the project whose name matches a glob pattern (e.g. \"*.rs\")."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "pattern": {
                    "type": "string",
                    "description": "Glob matched against file names (default \"*\")"
                }
            },
            "required": ["pattern"]
        })
    }

    async fn execute(&self, params: &Params, root: &Path) -> Result<String, ToolError> {
        let pattern = optional_str(params, "pattern")?.unwrap_or_else(|| "*".to_string());
        let glob = compile_glob("pattern", &pattern)?;
        step("search_files", &format!("pattern: {pattern}"));

        let root: PathBuf = orangutan_security::normalize(root);
        let limit = self.limit;
        let mut matches = tokio::task::spawn_blocking(move || find(&root, &glob, limit + 1))
            .await
            .map_err(|e| ToolError::ExecutionFailed {
                reason: e.to_string(),
            })?;

        let truncated = matches.len() > limit;
        matches.truncate(limit);
        step("search_files", &format!("{} files found", matches.len()));

        if matches.is_empty() {
            return Ok(format!("[search_files] No files matching '{pattern}'"));
        }

        let mut out = format!("[search_files] {} files matching '{pattern}':", matches.len());
        for m in &matches {
            out.push_str("\n  ");
            out.push_str(m);
        }
        if truncated {
            out.push_str(&format!("\n  ... (truncated at {limit} results)"));
        }
        Ok(out)
    }
}
