//! File write tool — create or overwrite a file, creating parent directories.

use std::path::Path;

use async_trait::async_trait;
use minicursor_core::error::ToolError;
use minicursor_core::schema::{ArgumentSchema, FieldKind};
use minicursor_core::tool::{Tool, ToolOutput};
use serde_json::Value;
use tracing::debug;

use crate::str_arg;

pub struct WriteFileTool {
    schema: ArgumentSchema,
}

impl WriteFileTool {
    pub fn new() -> Self {
        Self {
            schema: ArgumentSchema::object()
                .required("filePath", FieldKind::String, "Path of the file to write")
                .required("content", FieldKind::String, "Content to write"),
        }
    }
}

impl Default for WriteFileTool {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Tool for WriteFileTool {
    fn name(&self) -> &str {
        "write_file"
    }

    fn description(&self) -> &str {
        "Write content to a file. Missing parent directories are created; an existing file is overwritten."
    }

    fn input_schema(&self) -> &ArgumentSchema {
        &self.schema
    }

    async fn execute(&self, arguments: Value) -> Result<ToolOutput, ToolError> {
        let path = str_arg(self.name(), &arguments, "filePath")?;
        let content = str_arg(self.name(), &arguments, "content")?;

        if let Some(parent) = Path::new(path).parent()
            && !parent.as_os_str().is_empty()
        {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                ToolError::execution(
                    self.name(),
                    format!("Could not create directory {}: {e}", parent.display()),
                )
            })?;
        }

        tokio::fs::write(path, content)
            .await
            .map_err(|e| ToolError::execution(self.name(), format!("Could not write file {path}: {e}")))?;

        debug!(path = %path, bytes = content.len(), "Wrote file");
        Ok(format!("File written successfully: {path}").into())
    }
}
