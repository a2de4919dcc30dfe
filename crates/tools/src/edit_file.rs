//! edit_file: replace exactly one occurrence of a string.

use std::path::Path;

use async_trait::async_trait;
use orangutan_core::error::ToolError;
use orangutan_core::tool::{Params, Tool};

use crate::params::required_str;
use crate::write_file::write_atomic;
use crate::{sandboxed, step};

pub struct EditFileTool;

#[async_trait]
impl Tool for EditFileTool {
    fn name(&self) -> &str {
        "edit_file"
    }

    fn description(&self) -> &str {
        "Replace one unique occurrence of old_string with new_string in a file. \
         Fails if old_string is missing or appears more than once."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "path": {
                    "type": "string",
                    "description": "File path relative to the project root"
                },
                "old_string": {
                    "type": "string",
                    "description": "Exact text to replace; include enough context to be unique"
                },
                "new_string": {
                    "type": "string",
                    "description": "Replacement text"
                }
            },
            "required": ["path", "old_string", "new_string"]
        })
    }

    async fn execute(&self, params: &Params, root: &Path) -> Result<String, ToolError> {
        let rel = required_str(params, "path")?;
        let old = required_str(params, "old_string")?;
        let new = required_str(params, "new_string")?;
        if old.is_empty() {
            return Err(ToolError::invalid("old_string", "must not be empty"));
        }
        let path = sandboxed(&rel, root)?;

        let bytes = match tokio::fs::read(&path).await {
            Ok(b) => b,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                step("edit_file", &format!("{rel} - not found"));
                return Ok(format!("[Error] File not found: {rel}"));
            }
            Err(_) if path.is_dir() => return Ok(format!("[Error] Not a file: {rel}")),
            Err(e) => return Err(e.into()),
        };
        let Ok(content) = String::from_utf8(bytes) else {
            step("edit_file", &format!("{rel} - not UTF-8"));
            return Ok(format!("[Error] Not a text file: {rel}"));
        };

        match content.matches(old.as_str()).count() {
            0 => {
                step("edit_file", &format!("{rel} - string not found"));
                Ok(format!("[Error] String not found in {rel}"))
            }
            1 => {
                let updated = content.replacen(old.as_str(), &new, 1);
                write_atomic(&path, updated.as_bytes()).await?;
                step("edit_file", &format!("{rel} (1 replacement)"));
                Ok(format!("[Edited {rel}] Replaced 1 occurrence."))
            }
            count => {
                step("edit_file", &format!("{rel} - {count} matches (ambiguous)"));
                Ok(format!(
                    "[Error] String found {count} times in {rel}. Provide more context to make it unique."
                ))
            }
        }
    }
}
