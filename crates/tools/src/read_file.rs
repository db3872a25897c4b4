//! File read tool — return a file's contents to the model.

use async_trait::async_trait;
use minicursor_core::error::ToolError;
use minicursor_core::schema::{ArgumentSchema, FieldKind};
use minicursor_core::tool::{Tool, ToolOutput};
use serde_json::Value;
use tracing::{debug, warn};

use crate::str_arg;

pub struct ReadFileTool {
    schema: ArgumentSchema,
}

impl ReadFileTool {
    pub fn new() -> Self {
        Self {
            schema: ArgumentSchema::object().required(
                "filePath",
                FieldKind::String,
                "Path of the file to read",
            ),
        }
    }
}

impl Default for ReadFileTool {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Tool for ReadFileTool {
    fn name(&self) -> &str {
        "read_file"
    }

    fn description(&self) -> &str {
        "Read the contents of the file at the given path."
    }

    fn input_schema(&self) -> &ArgumentSchema {
        &self.schema
    }

    async fn execute(&self, arguments: Value) -> Result<ToolOutput, ToolError> {
        let path = str_arg(self.name(), &arguments, "filePath")?;

        match tokio::fs::read_to_string(path).await {
            Ok(content) => {
                debug!(path = %path, bytes = content.len(), "Read file");
                Ok(format!("File contents:\n{content}").into())
            }
            Err(e) => {
                warn!(path = %path, error = %e, "Failed to read file");
                Err(ToolError::execution(
                    self.name(),
                    format!("Could not read file {path}: {e}"),
                ))
            }
        }
    }
}
