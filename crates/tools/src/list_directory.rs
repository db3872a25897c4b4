//! Directory listing tool.

use async_trait::async_trait;
use minicursor_core::error::ToolError;
use minicursor_core::schema::{ArgumentSchema, FieldKind};
use minicursor_core::tool::{Tool, ToolOutput};
use serde_json::Value;
use tracing::debug;

use crate::str_arg;

pub struct ListDirectoryTool {
    schema: ArgumentSchema,
}

impl ListDirectoryTool {
    pub fn new() -> Self {
        Self {
            schema: ArgumentSchema::object().required(
                "directoryPath",
                FieldKind::String,
                "Path of the directory to list",
            ),
        }
    }
}

impl Default for ListDirectoryTool {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Tool for ListDirectoryTool {
    fn name(&self) -> &str {
        "list_directory"
    }

    fn description(&self) -> &str {
        "List all files and folders in the given directory."
    }

    fn input_schema(&self) -> &ArgumentSchema {
        &self.schema
    }

    async fn execute(&self, arguments: Value) -> Result<ToolOutput, ToolError> {
        let path = str_arg(self.name(), &arguments, "directoryPath")?;
        let failed =
            |e: std::io::Error| ToolError::execution("list_directory", format!("Could not list {path}: {e}"));

        let mut reader = tokio::fs::read_dir(path).await.map_err(failed)?;
        let mut names = Vec::new();
        while let Some(entry) = reader.next_entry().await.map_err(failed)? {
            names.push(entry.file_name().to_string_lossy().into_owned());
        }
        names.sort();

        debug!(path = %path, entries = names.len(), "Listed directory");
        let listing: Vec<String> = names.iter().map(|name| format!(" - {name}")).collect();
        Ok(format!("Directory contents:\n{}", listing.join("\n")).into())
    }
}
