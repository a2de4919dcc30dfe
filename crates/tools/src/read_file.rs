//! read_file: a fixed window of lines from one file.

use std::path::Path;

use async_trait::async_trait;
use orangutan_core::error::ToolError;
use orangutan_core::tool::{Params, Tool};

use crate::params::{optional_usize, required_str};
use crate::{sandboxed, step};

pub struct ReadFileTool {
    /// Lines returned per call.
    window: usize,
}

impl ReadFileTool {
    pub fn new(window: usize) -> Self {
        Self {
            window: window.max(1),
        }
    }
}

impl Default for ReadFileTool {
    fn default() -> Self {
        Self::new(200)
    }
}

#[async_trait]
impl Tool for ReadFileTool {
    fn name(&self) -> &str {
        "read_file"
    }

    fn description(&self) -> &str {
        "Read a file. Returns a window of lines starting at offset, with the total line count."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "path": {
                    "type": "string",
                    "description": "File path relative to the project root"
                },
                "offset": {
                    "type": "integer",
                    "description": "Zero-based line to start from (default 0)"
                }
            },
            "required": ["path"]
        })
    }

    async fn execute(&self, params: &Params, root: &Path) -> Result<String, ToolError> {
        let rel = required_str(params, "path")?;
        let start = optional_usize(params, "offset")?.unwrap_or(0);
        let path = sandboxed(&rel, root)?;

        let metadata = match tokio::fs::metadata(&path).await {
            Ok(m) => m,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                step("read_file", &format!("{rel} - not found"));
                return Ok(format!("[Error] File not found: {rel}"));
            }
            Err(e) => return Err(e.into()),
        };
        if !metadata.is_file() {
            return Ok(format!("[Error] Not a file: {rel}"));
        }

        let bytes = tokio::fs::read(&path).await?;
        let text = String::from_utf8_lossy(&bytes);
        let lines: Vec<&str> = text.split_inclusive('\n').collect();
        let total = lines.len();

        let end = start.saturating_add(self.window);
        let chunk = lines.get(start.min(total)..end.min(total)).unwrap_or_default();
        let range = format!("lines {}-{} of {total}", start + 1, start + chunk.len());
        step("read_file", &format!("{rel} ({range})"));

        let mut out = format!("[Read {rel}] ({range})");
        if total > end {
            out.push_str(&format!(
                "\n[WARNING: File has {total} lines. Showing first {} from offset {start}. \
                 Use offset parameter to read more: {{\"offset\": {end}}}]",
                self.window
            ));
        }
        out.push('\n');
        out.push_str(&chunk.concat());
        Ok(out)
    }
}
