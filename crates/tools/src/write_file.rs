//! write_file: create or overwrite a file.
//!
//! Content goes to a temporary sibling first and is renamed into place, so
//! a reader never sees a half-written file.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use orangutan_core::error::ToolError;
use orangutan_core::tool::{Params, Tool};

use crate::params::required_str;
use crate::{sandboxed, step};

pub struct WriteFileTool;

#[async_trait]
impl Tool for WriteFileTool {
    fn name(&self) -> &str {
        "write_file"
    }

    fn description(&self) -> &str {
        "Write content to a file. Creates parent directories; overwrites an existing file."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "path": {
                    "type": "string",
                    "description": "File path relative to the project root"
                },
                "content": {
                    "type": "string",
                    "description": "The full new file content"
                }
            },
            "required": ["path", "content"]
        })
    }

    async fn execute(&self, params: &Params, root: &Path) -> Result<String, ToolError> {
        let rel = required_str(params, "path")?;
        let content = required_str(params, "content")?;
        let path = sandboxed(&rel, root)?;

        write_atomic(&path, content.as_bytes()).await?;

        let line_count = content.matches('\n').count() + 1;
        step("write_file", &format!("{rel} ({line_count} lines written)"));
        Ok(format!("[Wrote {rel}] ({line_count} lines)"))
    }
}

/// Write `bytes` to `path` through a temporary file in the same directory.
///
/// An existing file keeps its permissions.
pub(crate) async fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), ToolError> {
    let parent = path
        .parent()
        .ok_or_else(|| ToolError::invalid("path", "has no parent directory"))?;
    tokio::fs::create_dir_all(parent).await?;

    let existing = tokio::fs::metadata(path).await.ok().map(|m| m.permissions());
    let tmp = temp_sibling(path);
    if let Err(e) = tokio::fs::write(&tmp, bytes).await {
        let _ = tokio::fs::remove_file(&tmp).await;
        return Err(e.into());
    }
    if let Some(permissions) = existing {
        if let Err(e) = tokio::fs::set_permissions(&tmp, permissions).await {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(e.into());
        }
    }
    if let Err(e) = tokio::fs::rename(&tmp, path).await {
        let _ = tokio::fs::remove_file(&tmp).await;
        return Err(e.into());
    }
    Ok(())
}

fn temp_sibling(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    path.with_file_name(format!(".{name}.{}.tmp", std::process::id()))
}
