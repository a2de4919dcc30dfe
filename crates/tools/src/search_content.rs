//! search_content: case-insensitive substring search inside files.

use std::path::Path;

use async_trait::async_trait;
use orangutan_core::error::ToolError;
use orangutan_core::tool::{Params, Tool};

use crate::params::optional_str;
use crate::search_files::compile_glob;
use crate::step;
use crate::walk::{display_relative, project_files};

pub struct SearchContentTool {
    limit: usize,
    line_chars: usize,
}

impl SearchContentTool {
    pub fn new(limit: usize, line_chars: usize) -> Self {
        Self {
            limit: limit.max(1),
            line_chars,
        }
    }
}

impl Default for SearchContentTool {
    fn default() -> Self {
        Self::new(50, 120)
    }
}

struct Query {
    needle: String,
    glob: glob::Pattern,
    take: usize,
    line_chars: usize,
}

/// Formatted `  rel:line: text` hits, in walk order, at most `query.take`.
fn grep(root: &Path, query: &Query) -> Vec<String> {
    let mut hits = Vec::new();
    let files = project_files(root).filter(|e| query.glob.matches(&e.file_name().to_string_lossy()));

    for entry in files {
        // Unreadable files are skipped.
        let Ok(bytes) = std::fs::read(entry.path()) else {
            continue;
        };
        let text = String::from_utf8_lossy(&bytes);
        let rel = display_relative(entry.path(), root);

        for (idx, line) in text.lines().enumerate() {
            if !line.to_lowercase().contains(&query.needle) {
                continue;
            }
            let shown: String = line.trim_end().chars().take(query.line_chars).collect();
            hits.push(format!("  {rel}:{}: {shown}", idx + 1));
            if hits.len() >= query.take {
                return hits;
            }
        }
    }
    hits
}

#[async_trait]
impl Tool for SearchContentTool {
    fn name(&self) -> &str {
        "search_content"
    }

    fn description(&self) -> &str {
        "Search file contents for text (case-insensitive). Optionally restrict to files matching a glob."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "pattern": {
                    "type": "string",
                    "description": "Text to look for"
                },
                "glob": {
                    "type": "string",
                    "description": "File-name glob to search in (default \"*\")"
                }
            },
            "required": ["pattern"]
        })
    }

    async fn execute(&self, params: &Params, root: &Path) -> Result<String, ToolError> {
        let pattern = optional_str(params, "pattern")?.unwrap_or_default();
        if pattern.is_empty() {
            return Ok("[Error] search_content requires a 'pattern' parameter.".to_string());
        }
        let glob_filter = optional_str(params, "glob")?
            .filter(|g| !g.is_empty())
            .unwrap_or_else(|| "*".to_string());
        let query = Query {
            needle: pattern.to_lowercase(),
            glob: compile_glob("glob", &glob_filter)?,
            take: self.limit + 1,
            line_chars: self.line_chars,
        };
        step("search_content", &format!("'{pattern}' in {glob_filter}"));

        let root = orangutan_security::normalize(root);
        let mut matches = tokio::task::spawn_blocking(move || grep(&root, &query))
            .await
            .map_err(|e| ToolError::ExecutionFailed {
                reason: e.to_string(),
            })?;

        let truncated = matches.len() > self.limit;
        matches.truncate(self.limit);
        step("search_content", &format!("{} matches found", matches.len()));

        if matches.is_empty() {
            return Ok(format!(
                "[search_content] No matches for '{pattern}' in {glob_filter}"
            ));
        }

        let mut out = format!(
            "[search_content] {} matches for '{pattern}':\n{}",
            matches.len(),
            matches.join("\n")
        );
        if truncated {
            out.push_str(&format!("\n  ... (truncated at {} results)", self.limit));
        }
        Ok(out)
    }
}
