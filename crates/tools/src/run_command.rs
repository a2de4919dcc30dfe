//! run_command: execute a shell command in the project root.
//!
//! The command runs under `sh -c` (`cmd /C` on Windows) with stdin closed
//! and a hard wall-clock limit. On timeout the child is dropped, and with
//! `kill_on_drop` that kills it.

use std::path::Path;
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use orangutan_core::error::ToolError;
use orangutan_core::tool::{Params, Tool};
use tokio::process::Command;
use tracing::{debug, warn};

use crate::params::required_str;
use crate::step;

pub struct RunCommandTool {
    timeout: Duration,
}

impl RunCommandTool {
    pub fn new(timeout_secs: u64) -> Self {
        Self {
            timeout: Duration::from_secs(timeout_secs),
        }
    }

    #[cfg(test)]
    fn with_timeout(timeout: Duration) -> Self {
        Self { timeout }
    }

    fn shell(command: &str) -> Command {
        if cfg!(target_os = "windows") {
            let mut cmd = Command::new("cmd");
            cmd.args(["/C", command]);
            cmd
        } else {
            let mut cmd = Command::new("sh");
            cmd.args(["-c", command]);
            cmd
        }
    }
}

impl Default for RunCommandTool {
    fn default() -> Self {
        Self::new(30)
    }
}

#[async_trait]
impl Tool for RunCommandTool {
    fn name(&self) -> &str {
        "run_command"
    }

    fn description(&self) -> &str {
        "Run a shell command in the project directory and return its exit code and combined output."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "command": {
                    "type": "string",
                    "description": "The shell command to execute"
                }
            },
            "required": ["command"]
        })
    }

    async fn execute(&self, params: &Params, root: &Path) -> Result<String, ToolError> {
        let command = required_str(params, "command")?;
        let workdir = orangutan_security::normalize(root);
        step("run_command", &command);
        debug!(command = %command, workdir = %workdir.display(), "Executing shell command");

        let mut cmd = Self::shell(&command);
        cmd.current_dir(&workdir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let output = match tokio::time::timeout(self.timeout, cmd.output()).await {
            Ok(result) => result.map_err(|e| ToolError::ExecutionFailed {
                reason: format!("failed to spawn shell: {e}"),
            })?,
            Err(_) => {
                let secs = self.timeout.as_secs();
                warn!(command = %command, timeout_secs = secs, "Command timed out");
                step("run_command", &format!("timed out ({secs}s)"));
                return Ok(format!("[Error] Command timed out after {secs} seconds."));
            }
        };

        let mut combined = String::from_utf8_lossy(&output.stdout).into_owned();
        combined.push_str(&String::from_utf8_lossy(&output.stderr));
        let combined = combined.trim();
        let body = if combined.is_empty() { "(no output)" } else { combined };

        let code = output.status.code().unwrap_or(-1);
        let status = if code == 0 {
            "ok".to_string()
        } else {
            format!("exit {code}")
        };
        step("run_command", &format!("completed ({status})"));
        Ok(format!("[Exit code: {code}]\n{body}"))
    }
}
