//! Provider trait — the abstraction over the language-model client.
//!
//! A Provider takes a transcript snapshot plus the advertised tool set and
//! returns either a final text answer or an ordered list of requested calls.
//! Retries, authentication and wire formats are the provider's business;
//! the agent loop only sees [`ModelReply`].

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::ProviderError;
use crate::message::{ConversationEntry, RequestedCall};

/// One model invocation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderRequest {
    /// The model to use (e.g., "gpt-4o-mini", "qwen-plus")
    pub model: String,

    /// The transcript snapshot
    pub entries: Vec<ConversationEntry>,

    /// Temperature (0.0 = deterministic)
    #[serde(default)]
    pub temperature: f32,

    /// Maximum tokens to generate
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,

    /// Available tools the model can call
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tools: Vec<ToolDefinition>,
}

/// A tool definition sent to the model so it knows what it can call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDefinition {
    /// The tool name
    pub name: String,

    /// Description of what the tool does
    pub description: String,

    /// JSON Schema describing the tool's parameters
    pub parameters: serde_json::Value,
}

/// What the model decided this round.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ModelReply {
    /// No tool calls: the run is finished.
    FinalAnswer { text: String },

    /// One or more tool calls, in the order the model emitted them, plus any
    /// accompanying text.
    ToolCalls {
        text: String,
        calls: Vec<RequestedCall>,
    },
}

impl ModelReply {
    /// Build a reply from a raw text + calls pair. An empty call list is a
    /// final answer.
    pub fn from_parts(text: impl Into<String>, calls: Vec<RequestedCall>) -> Self {
        let text = text.into();
        if calls.is_empty() {
            Self::FinalAnswer { text }
        } else {
            Self::ToolCalls { text, calls }
        }
    }

    pub fn text(&self) -> &str {
        match self {
            Self::FinalAnswer { text } | Self::ToolCalls { text, .. } => text,
        }
    }

    pub fn calls(&self) -> &[RequestedCall] {
        match self {
            Self::FinalAnswer { .. } => &[],
            Self::ToolCalls { calls, .. } => calls,
        }
    }
}

/// A complete response from a provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderResponse {
    /// The model's decision
    pub reply: ModelReply,

    /// Token usage statistics
    pub usage: Option<Usage>,

    /// Which model actually responded (may differ from requested)
    pub model: String,
}

/// Token usage information.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Usage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

/// The core Provider trait.
///
/// Every model backend implements this trait. The agent loop calls
/// `complete()` without knowing which provider is being used.
#[async_trait]
pub trait Provider: Send + Sync {
    /// A human-readable name for this provider (e.g., "openai").
    fn name(&self) -> &str;

    /// Send a request and get a complete response.
    async fn complete(
        &self,
        request: ProviderRequest,
    ) -> std::result::Result<ProviderResponse, ProviderError>;

    /// Health check — can we reach the provider?
    async fn health_check(&self) -> std::result::Result<bool, ProviderError> {
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_calls_is_final_answer() {
        let reply = ModelReply::from_parts("done", vec![]);
        assert_eq!(
            reply,
            ModelReply::FinalAnswer {
                text: "done".into()
            }
        );
        assert!(reply.calls().is_empty());
    }

    #[test]
    fn calls_make_tool_call_reply() {
        let call = RequestedCall::new("c1", "echo", serde_json::json!({"text": "hi"}));
        let reply = ModelReply::from_parts("", vec![call.clone()]);
        assert_eq!(reply.calls(), &[call]);
        assert_eq!(reply.text(), "");
    }

    #[test]
    fn tool_definition_serialization() {
        let tool = ToolDefinition {
            name: "execute_command".into(),
            description: "Execute a shell command".into(),
            parameters: serde_json::json!({
                "type": "object",
                "properties": {
                    "command": { "type": "string", "description": "The command to run" }
                },
                "required": ["command"]
            }),
        };
        let json = serde_json::to_string(&tool).unwrap();
        assert!(json.contains("execute_command"));
        assert!(json.contains("command"));
    }
}
