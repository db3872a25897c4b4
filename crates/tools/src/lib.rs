//! Built-in tool implementations for minicursor.
//!
//! Tools give the agent the ability to work on a project:
//! read and write files, list directories, run commands, and look up
//! users in a small in-memory store.

pub mod execute_command;
pub mod list_directory;
pub mod query_user;
pub mod read_file;
pub mod write_file;

use std::sync::Arc;

use minicursor_config::ToolsConfig;
use minicursor_core::error::{RegistryError, ToolError};
use minicursor_core::tool::ToolRegistry;
use serde_json::Value;

pub use execute_command::ExecuteCommandTool;
pub use list_directory::ListDirectoryTool;
pub use query_user::{QueryUserTool, UserStore};
pub use read_file::ReadFileTool;
pub use write_file::WriteFileTool;

/// Create a registry with all built-in tools.
pub fn default_registry(config: &ToolsConfig) -> Result<ToolRegistry, RegistryError> {
    let mut registry = ToolRegistry::new();
    registry.register(ReadFileTool::new())?;
    registry.register(WriteFileTool::new())?;
    registry.register(ExecuteCommandTool::new(config.working_directory.clone()))?;
    registry.register(ListDirectoryTool::new())?;
    let users = Arc::new(UserStore::new(config.users.iter().cloned()));
    registry.register(QueryUserTool::new(users))?;
    Ok(registry)
}

/// Fetch a string argument. The invoker validates arguments before
/// execution, so this only fails when a tool is called directly.
pub(crate) fn str_arg<'a>(tool: &str, arguments: &'a Value, key: &str) -> Result<&'a str, ToolError> {
    arguments[key]
        .as_str()
        .ok_or_else(|| ToolError::InvalidArguments {
            tool_name: tool.to_string(),
            reason: format!("missing required field `{key}`"),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn default_registry_has_all_tools() {
        let registry = default_registry(&ToolsConfig::default()).unwrap();
        assert_eq!(
            registry.names(),
            ["read_file", "write_file", "execute_command", "list_directory", "query_user"]
        );
        for definition in registry.definitions() {
            assert_eq!(definition.parameters["type"], "object");
            assert!(!definition.description.is_empty());
        }
    }

    #[test]
    fn str_arg_reports_missing_field() {
        let err = str_arg("read_file", &json!({}), "filePath").unwrap_err();
        assert!(err.to_string().contains("missing required field `filePath`"));
        assert_eq!(str_arg("t", &json!({"k": "v"}), "k").unwrap(), "v");
    }
}
