//! list_directory: immediate children of one directory.

use std::path::Path;

use async_trait::async_trait;
use orangutan_core::error::ToolError;
use orangutan_core::tool::{Params, Tool};

use crate::params::optional_str;
use crate::walk::is_ignored_name;
use crate::{sandboxed, step};

pub struct ListDirectoryTool;

#[async_trait]
impl Tool for ListDirectoryTool {
    fn name(&self) -> &str {
        "list_directory"
    }

    fn description(&self) -> &str {
        "List the folders and files (with sizes) directly inside a directory."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "path": {
                    "type": "string",
                    "description": "Directory relative to the project root (default \".\")"
                }
            }
        })
    }

    async fn execute(&self, params: &Params, root: &Path) -> Result<String, ToolError> {
        let target = optional_str(params, "path")?.unwrap_or_else(|| ".".to_string());
        let path = sandboxed(&target, root)?;

        let metadata = match tokio::fs::metadata(&path).await {
            Ok(m) => m,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                step("list_directory", &format!("{target} - not found"));
                return Ok(format!("[Error] Directory not found: {target}"));
            }
            Err(e) => return Err(e.into()),
        };
        if !metadata.is_dir() {
            step("list_directory", &format!("{target} - not a directory"));
            return Ok(format!("[Error] Not a directory: {target}"));
        }

        let mut dirs = Vec::new();
        let mut files = Vec::new();
        let mut entries = tokio::fs::read_dir(&path).await?;
        while let Some(entry) = entries.next_entry().await? {
            let name = entry.file_name().to_string_lossy().into_owned();
            // Follows symlinks, like a plain `ls` would.
            let Ok(meta) = tokio::fs::metadata(entry.path()).await else {
                continue;
            };
            if meta.is_dir() {
                if !is_ignored_name(&name) {
                    dirs.push(name);
                }
            } else {
                files.push((name, meta.len()));
            }
        }
        dirs.sort();
        files.sort();

        step(
            "list_directory",
            &format!("{target} ({} entries)", dirs.len() + files.len()),
        );

        let mut lines = Vec::with_capacity(dirs.len() + files.len());
        lines.extend(dirs.iter().map(|d| format!("  {d}/")));
        lines.extend(files.iter().map(|(f, size)| format!("  {f} ({})", human_size(*size))));

        Ok(format!(
            "[Directory: {target}] ({} dirs, {} files)\n{}",
            dirs.len(),
            files.len(),
            lines.join("\n")
        ))
    }
}

/// `512B`, `1.5KB`, `3.0MB` ...
pub fn human_size(bytes: u64) -> String {
    if bytes < 1024 {
        return format!("{bytes}B");
    }
    let mut size = bytes as f64 / 1024.0;
    for unit in ["KB", "MB", "GB"] {
        if size < 1024.0 {
            return format!("{size:.1}{unit}");
        }
        size /= 1024.0;
    }
    format!("{size:.1}TB")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn params(value: serde_json::Value) -> Params {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn human_sizes() {
        assert_eq!(human_size(0), "0B");
        assert_eq!(human_size(1023), "1023B");
        assert_eq!(human_size(1536), "1.5KB");
        assert_eq!(human_size(5 * 1024 * 1024), "5.0MB");
        assert_eq!(human_size(3 * 1024 * 1024 * 1024), "3.0GB");
        assert_eq!(human_size(2 * 1024_u64.pow(4)), "2.0TB");
    }

    #[tokio::test]
    async fn lists_dirs_then_files_hiding_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        std::fs::create_dir(root.join("src")).unwrap();
        std::fs::create_dir(root.join(".git")).unwrap();
        std::fs::create_dir(root.join("node_modules")).unwrap();
        std::fs::write(root.join("b.txt"), "hello").unwrap();
        std::fs::write(root.join("a.md"), vec![b'x'; 2048]).unwrap();

        let out = ListDirectoryTool.execute(&params(json!({})), root).await.unwrap();
        assert_eq!(
            out,
            "[Directory: .] (1 dirs, 2 files)\n  src/\n  a.md (2.0KB)\n  b.txt (5B)"
        );
    }

    #[tokio::test]
    async fn subdirectory_and_errors() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        std::fs::create_dir_all(root.join("src/util")).unwrap();
        std::fs::write(root.join("src/lib.rs"), "").unwrap();

        let out = ListDirectoryTool
            .execute(&params(json!({"path": "src"})), root)
            .await
            .unwrap();
        assert!(out.starts_with("[Directory: src] (1 dirs, 1 files)"));

        let out = ListDirectoryTool
            .execute(&params(json!({"path": "missing"})), root)
            .await
            .unwrap();
        assert_eq!(out, "[Error] Directory not found: missing");

        let out = ListDirectoryTool
            .execute(&params(json!({"path": "src/lib.rs"})), root)
            .await
            .unwrap();
        assert_eq!(out, "[Error] Not a directory: src/lib.rs");
    }

    #[tokio::test]
    async fn escape_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let err = ListDirectoryTool
            .execute(&params(json!({"path": ".."})), dir.path())
            .await
            .unwrap_err();
        assert!(matches!(err, ToolError::PathEscape { .. }));
    }
}
