//! Tool trait — the abstraction over agent capabilities.
//!
//! Tools are what give the agent the ability to act in the world:
//! read and write files, list directories, run commands, query a store.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{RegistryError, ToolError};
use crate::provider::ToolDefinition;
use crate::schema::ArgumentSchema;

/// What a tool produced on success.
#[derive(Debug, Clone, PartialEq)]
pub enum ToolOutput {
    /// Plain text, used verbatim.
    Text(String),
    /// Structured content, normalised to text by [`ToolOutput::into_text`].
    Structured(Value),
}

impl ToolOutput {
    /// Normalise to the text payload of a tool result.
    ///
    /// Text and JSON strings are used verbatim. Objects with a string `text`
    /// field use that field. Objects whose `content` is an array of
    /// `{"type": "text", "text": ...}` blocks use the blocks joined by
    /// newlines. Anything else is an unsupported shape.
    pub fn into_text(self, tool_name: &str) -> Result<String, ToolError> {
        let value = match self {
            Self::Text(text) => return Ok(text),
            Self::Structured(value) => value,
        };

        if let Value::String(text) = value {
            return Ok(text);
        }
        if let Some(text) = value.get("text").and_then(Value::as_str) {
            return Ok(text.to_string());
        }
        if let Some(blocks) = value.get("content").and_then(Value::as_array) {
            let texts: Option<Vec<&str>> = blocks
                .iter()
                .map(|block| match block.get("type").and_then(Value::as_str) {
                    Some("text") => block.get("text").and_then(Value::as_str),
                    _ => None,
                })
                .collect();
            if let Some(texts) = texts
                && !texts.is_empty()
            {
                return Ok(texts.join("\n"));
            }
        }

        Err(ToolError::UnsupportedResultShape {
            tool_name: tool_name.to_string(),
            shape: shape_of(&value),
        })
    }
}

fn shape_of(value: &Value) -> String {
    match value {
        Value::Null => "null".into(),
        Value::Bool(_) => "boolean".into(),
        Value::Number(_) => "number".into(),
        Value::String(_) => "string".into(),
        Value::Array(items) => format!("array of {} item(s)", items.len()),
        Value::Object(map) => {
            let keys: Vec<&str> = map.keys().map(String::as_str).collect();
            format!("object with keys [{}]", keys.join(", "))
        }
    }
}

impl From<String> for ToolOutput {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<&str> for ToolOutput {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

/// The normalised outcome of invoking one requested call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolResult {
    /// The call ID this result is for
    pub call_id: String,

    /// Name of the tool that was requested
    pub tool_name: String,

    /// Whether the tool executed successfully
    pub success: bool,

    /// The text fed back to the model
    pub output: String,

    /// Wall-clock time spent resolving the call
    pub duration_ms: u64,
}

/// The core Tool trait.
///
/// Each tool implements this trait and is registered once, at startup, in a
/// [`ToolRegistry`]. The invoker validates arguments against
/// [`Tool::input_schema`] before calling [`Tool::execute`], so tools may
/// assume the schema holds.
#[async_trait]
pub trait Tool: Send + Sync {
    /// The unique name of this tool (e.g., "read_file").
    fn name(&self) -> &str;

    /// A description of what this tool does (sent to the model).
    fn description(&self) -> &str;

    /// Validator for this tool's arguments.
    fn input_schema(&self) -> &ArgumentSchema;

    /// Execute the tool with validated arguments.
    async fn execute(&self, arguments: Value) -> Result<ToolOutput, ToolError>;

    /// Convert this tool into a ToolDefinition for sending to the model.
    fn to_definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: self.name().to_string(),
            description: self.description().to_string(),
            parameters: self.input_schema().to_json_schema(),
        }
    }
}

/// A registry of available tools.
///
/// Populated at startup, then shared read-only (behind an `Arc`) by every run.
/// The agent loop uses it to:
/// 1. Get tool definitions to send to the model
/// 2. Look up tools when the model requests them
#[derive(Default)]
pub struct ToolRegistry {
    tools: HashMap<String, Arc<dyn Tool>>,
    /// Registration order, so definitions are advertised deterministically.
    order: Vec<String>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tool. Names are unique.
    pub fn register(&mut self, tool: impl Tool + 'static) -> Result<(), RegistryError> {
        self.register_arc(Arc::new(tool))
    }

    /// Register an already shared tool.
    pub fn register_arc(&mut self, tool: Arc<dyn Tool>) -> Result<(), RegistryError> {
        let name = tool.name().to_string();
        if self.tools.contains_key(&name) {
            return Err(RegistryError::DuplicateTool(name));
        }
        tracing::debug!(tool = %name, "Registered tool");
        self.order.push(name.clone());
        self.tools.insert(name, tool);
        Ok(())
    }

    /// Look a tool up by name.
    pub fn lookup(&self, name: &str) -> Result<Arc<dyn Tool>, ToolError> {
        self.tools
            .get(name)
            .cloned()
            .ok_or_else(|| ToolError::NotFound(name.to_string()))
    }

    /// Get all tool definitions, in registration order (for sending to the model).
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.order
            .iter()
            .filter_map(|name| self.tools.get(name))
            .map(|t| t.to_definition())
            .collect()
    }

    /// List all registered tool names, in registration order.
    pub fn names(&self) -> Vec<&str> {
        self.order.iter().map(String::as_str).collect()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}
