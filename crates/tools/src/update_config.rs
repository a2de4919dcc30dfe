//! update_config: keep a section of the project memory file current.
//!
//! Never prompts the developer and never creates the file.

use std::path::Path;

use async_trait::async_trait;
use orangutan_config::{MEMORY_FILE, ProjectMemory};
use orangutan_core::error::ToolError;
use orangutan_core::tool::{Params, Tool};

use crate::params::optional_str;
use crate::step;

pub struct UpdateConfigTool;

#[async_trait]
impl Tool for UpdateConfigTool {
    fn name(&self) -> &str {
        "update_config"
    }

    fn description(&self) -> &str {
        "Record a project fact in orangutan.md by replacing or adding a '## <section>' block."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "section": {
                    "type": "string",
                    "description": "Section name without the '## ' prefix, e.g. \"Tech Stack\""
                },
                "content": {
                    "type": "string",
                    "description": "New body of the section"
                }
            },
            "required": ["section", "content"]
        })
    }

    async fn execute(&self, params: &Params, root: &Path) -> Result<String, ToolError> {
        let section = optional_str(params, "section")?.unwrap_or_default();
        let content = optional_str(params, "content")?.unwrap_or_default();
        if section.is_empty() || content.is_empty() {
            return Ok(
                "[Error] update_config requires 'section' and 'content' parameters.".to_string(),
            );
        }

        let memory = ProjectMemory::new(orangutan_security::normalize(root));
        let change = memory
            .update_section(&section, &content)
            .map_err(|e| ToolError::ExecutionFailed {
                reason: e.to_string(),
            })?;

        match change {
            None => Ok(format!("[Error] No {MEMORY_FILE} found. Cannot update.")),
            Some(_) => {
                step(
                    "update_config",
                    &format!("section '{section}' updated in {MEMORY_FILE}"),
                );
                Ok(format!("[Updated {MEMORY_FILE}] Section '{section}' updated."))
            }
        }
    }
}
