//! Conversation entry domain types.
//!
//! These are the value objects a transcript is made of:
//! User asks → Assistant answers or requests tool calls → Tool results flow back.

use serde::{Deserialize, Serialize};

/// The role of an entry in a conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// System instructions
    System,
    /// The end user
    User,
    /// The model
    Assistant,
    /// Tool execution result
    Tool,
}

/// A model-issued request to execute a named tool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestedCall {
    /// Correlation id, unique within one transcript (matches the model's tool_call.id)
    pub id: String,

    /// Name of the tool to execute
    pub name: String,

    /// Arguments as an opaque JSON value; validated by the tool's schema
    pub arguments: serde_json::Value,
}

impl RequestedCall {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        arguments: serde_json::Value,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            arguments,
        }
    }
}

/// A single entry in a transcript.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "snake_case")]
pub enum ConversationEntry {
    System {
        content: String,
    },
    User {
        content: String,
    },
    Assistant {
        content: String,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        calls: Vec<RequestedCall>,
    },
    ToolResult {
        /// The id of the RequestedCall this answers
        call_id: String,
        content: String,
    },
}

impl ConversationEntry {
    pub fn role(&self) -> Role {
        match self {
            Self::System { .. } => Role::System,
            Self::User { .. } => Role::User,
            Self::Assistant { .. } => Role::Assistant,
            Self::ToolResult { .. } => Role::Tool,
        }
    }

    /// The text content, whatever the role.
    pub fn content(&self) -> &str {
        match self {
            Self::System { content }
            | Self::User { content }
            | Self::Assistant { content, .. }
            | Self::ToolResult { content, .. } => content,
        }
    }

    /// Calls requested by this entry. Empty for everything but assistant turns.
    pub fn requested_calls(&self) -> &[RequestedCall] {
        match self {
            Self::Assistant { calls, .. } => calls,
            _ => &[],
        }
    }

    /// The correlation id, for tool results.
    pub fn call_id(&self) -> Option<&str> {
        match self {
            Self::ToolResult { call_id, .. } => Some(call_id),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn assistant_entry_exposes_calls() {
        let entry = ConversationEntry::Assistant {
            content: "checking".into(),
            calls: vec![RequestedCall::new(
                "call_1",
                "read_file",
                serde_json::json!({"filePath": "a.txt"}),
            )],
        };
        assert_eq!(entry.role(), Role::Assistant);
        assert_eq!(entry.content(), "checking");
        assert_eq!(entry.requested_calls().len(), 1);
        assert_eq!(entry.call_id(), None);
    }

    #[test]
    fn tool_result_carries_correlation_id() {
        let entry = ConversationEntry::ToolResult {
            call_id: "call_1".into(),
            content: "hi".into(),
        };
        assert_eq!(entry.role(), Role::Tool);
        assert_eq!(entry.call_id(), Some("call_1"));
        assert!(entry.requested_calls().is_empty());
    }

    #[test]
    fn entries_serialize_with_role_tag() {
        let entry = ConversationEntry::User {
            content: "Hello".into(),
        };
        let json = serde_json::to_string(&entry).unwrap();
        assert!(json.contains(r#""role":"user""#));

        let plain = ConversationEntry::Assistant {
            content: "done".into(),
            calls: vec![],
        };
        let json = serde_json::to_string(&plain).unwrap();
        assert!(!json.contains("calls"));
    }
}
