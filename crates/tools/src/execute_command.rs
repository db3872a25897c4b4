//! Command tool — run a command through the platform shell.
//!
//! The child process is killed if the invocation is dropped (timeout or
//! cancellation), so abandoned commands never outlive their run.

use std::path::PathBuf;
use std::process::Stdio;

use async_trait::async_trait;
use minicursor_core::error::ToolError;
use minicursor_core::schema::{ArgumentSchema, FieldKind};
use minicursor_core::tool::{Tool, ToolOutput};
use serde_json::Value;
use tokio::process::Command;
use tracing::{debug, warn};

use crate::str_arg;

pub struct ExecuteCommandTool {
    /// Used when a call names no `workingDirectory`; `None` inherits the
    /// process working directory.
    default_directory: Option<PathBuf>,
    schema: ArgumentSchema,
}

impl ExecuteCommandTool {
    pub fn new(default_directory: Option<PathBuf>) -> Self {
        Self {
            default_directory,
            schema: ArgumentSchema::object()
                .required("command", FieldKind::String, "The command to execute")
                .optional(
                    "workingDirectory",
                    FieldKind::String,
                    "Directory to run the command in (recommended)",
                ),
        }
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

#[async_trait]
impl Tool for ExecuteCommandTool {
    fn name(&self) -> &str {
        "execute_command"
    }

    fn description(&self) -> &str {
        "Execute a system command, optionally in a given working directory, and return its output."
    }

    fn input_schema(&self) -> &ArgumentSchema {
        &self.schema
    }

    async fn execute(&self, arguments: Value) -> Result<ToolOutput, ToolError> {
        let command = str_arg(self.name(), &arguments, "command")?;
        let working_directory = arguments["workingDirectory"]
            .as_str()
            .filter(|dir| !dir.is_empty());

        let mut cmd = Self::shell(command);
        cmd.stdin(Stdio::null()).kill_on_drop(true);
        match (working_directory, &self.default_directory) {
            (Some(dir), _) => {
                cmd.current_dir(dir);
            }
            (None, Some(dir)) => {
                cmd.current_dir(dir);
            }
            (None, None) => {}
        }

        debug!(command = %command, working_directory = ?working_directory, "Executing command");

        let output = cmd.output().await.map_err(|e| {
            ToolError::execution(self.name(), format!("Could not start `{command}`: {e}"))
        })?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        let stderr = String::from_utf8_lossy(&output.stderr);

        if !output.status.success() {
            let code = output.status.code().unwrap_or(-1);
            warn!(command = %command, exit_code = code, "Command failed");
            let mut reason = format!("Command failed with exit code {code}");
            if !stderr.trim().is_empty() {
                reason.push_str(&format!("\nstderr: {}", stderr.trim()));
            }
            return Err(ToolError::execution(self.name(), reason));
        }

        let mut text = format!("Command executed successfully: {command}");
        if !stdout.trim().is_empty() {
            text.push_str(&format!("\n\nOutput:\n{}", stdout.trim_end()));
        }
        if !stderr.trim().is_empty() {
            text.push_str(&format!("\n\n[stderr]: {}", stderr.trim_end()));
        }
        if let Some(dir) = working_directory {
            text.push_str(&format!(
                "\n\nNote: the command ran in \"{dir}\". To keep working in that directory, \
                 pass workingDirectory: \"{dir}\" again instead of using cd."
            ));
        }
        Ok(text.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn text(output: ToolOutput) -> String {
        match output {
            ToolOutput::Text(text) => text,
            other => panic!("expected text, got {other:?}"),
        }
    }

    #[test]
    fn tool_definition() {
        let def = ExecuteCommandTool::new(None).to_definition();
        assert_eq!(def.name, "execute_command");
        assert_eq!(def.parameters["required"], json!(["command"]));
        assert!(def.parameters["properties"]["workingDirectory"].is_object());
    }

    #[tokio::test]
    async fn execute_echo() {
        let output = ExecuteCommandTool::new(None)
            .execute(json!({"command": "echo hello"}))
            .await
            .unwrap();
        let text = text(output);
        assert!(text.starts_with("Command executed successfully: echo hello"));
        assert!(text.contains("hello"));
        assert!(!text.contains("workingDirectory"));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn runs_in_working_directory_and_hints() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("marker.txt"), "").unwrap();
        let dir_str = dir.path().to_str().unwrap();

        let output = ExecuteCommandTool::new(None)
            .execute(json!({"command": "ls", "workingDirectory": dir_str}))
            .await
            .unwrap();
        let text = text(output);
        assert!(text.contains("marker.txt"));
        assert!(text.contains(&format!("workingDirectory: \"{dir_str}\"")));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn default_directory_is_used() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("from_config.txt"), "").unwrap();

        let output = ExecuteCommandTool::new(Some(dir.path().to_path_buf()))
            .execute(json!({"command": "ls"}))
            .await
            .unwrap();
        assert!(text(output).contains("from_config.txt"));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn nonzero_exit_is_an_error() {
        let err = ExecuteCommandTool::new(None)
            .execute(json!({"command": "echo broken >&2; exit 3"}))
            .await
            .unwrap_err();
        let message = err.to_string();
        assert!(matches!(err, ToolError::ExecutionFailed { .. }));
        assert!(message.contains("exit code 3"));
        assert!(message.contains("broken"));
    }

    #[tokio::test]
    async fn missing_working_directory_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("does-not-exist");
        let err = ExecuteCommandTool::new(None)
            .execute(json!({"command": "echo hi", "workingDirectory": missing.to_str().unwrap()}))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("Could not start"));
    }
}
