//! OpenAI-compatible model client.
//!
//! Works with OpenAI, DashScope, OpenRouter, Ollama, vLLM and any endpoint
//! exposing `/chat/completions` with function calling.
//!
//! Call ids are only trusted while they are unique within the conversation.
//! Missing ids, and ids the backend reuses across rounds, are replaced with
//! fresh ones.

use std::collections::HashSet;
use std::time::Duration;

use async_trait::async_trait;
use minicursor_core::error::ProviderError;
use minicursor_core::message::{ConversationEntry, RequestedCall};
use minicursor_core::provider::{
    ModelReply, Provider, ProviderRequest, ProviderResponse, ToolDefinition, Usage,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

/// An OpenAI-compatible model client.
pub struct OpenAiCompatProvider {
    name: String,
    base_url: String,
    api_key: String,
    client: reqwest::Client,
}

impl OpenAiCompatProvider {
    /// Create a new OpenAI-compatible client.
    pub fn new(
        name: impl Into<String>,
        base_url: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Result<Self, ProviderError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(120))
            .build()
            .map_err(|e| ProviderError::NotConfigured(format!("HTTP client: {e}")))?;

        Ok(Self {
            name: name.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Convert transcript entries to OpenAI API messages.
    fn to_api_messages(entries: &[ConversationEntry]) -> Vec<ApiMessage> {
        entries
            .iter()
            .map(|entry| match entry {
                ConversationEntry::System { content } => ApiMessage::plain("system", content),
                ConversationEntry::User { content } => ApiMessage::plain("user", content),
                ConversationEntry::Assistant { content, calls } if !calls.is_empty() => {
                    ApiMessage {
                        role: "assistant".into(),
                        content: (!content.is_empty()).then(|| content.clone()),
                        tool_calls: Some(calls.iter().map(ApiToolCall::from_call).collect()),
                        tool_call_id: None,
                    }
                }
                ConversationEntry::Assistant { content, .. } => {
                    ApiMessage::plain("assistant", content)
                }
                ConversationEntry::ToolResult { call_id, content } => ApiMessage {
                    role: "tool".into(),
                    content: Some(content.clone()),
                    tool_calls: None,
                    tool_call_id: Some(call_id.clone()),
                },
            })
            .collect()
    }

    /// Convert tool definitions to OpenAI API format.
    fn to_api_tools(tools: &[ToolDefinition]) -> Vec<ApiToolDefinition> {
        tools
            .iter()
            .map(|t| ApiToolDefinition {
                r#type: "function".into(),
                function: ApiToolFunction {
                    name: t.name.clone(),
                    description: t.description.clone(),
                    parameters: t.parameters.clone(),
                },
            })
            .collect()
    }

    fn request_body(request: &ProviderRequest) -> Value {
        let mut body = serde_json::json!({
            "model": request.model,
            "messages": Self::to_api_messages(&request.entries),
            "temperature": request.temperature,
        });

        if let Some(max_tokens) = request.max_tokens {
            body["max_tokens"] = serde_json::json!(max_tokens);
        }

        if !request.tools.is_empty() {
            body["tools"] = serde_json::json!(Self::to_api_tools(&request.tools));
        }

        body
    }
}

/// Map a non-200 status to an error.
fn status_error(status: u16, body: String) -> ProviderError {
    match status {
        401 | 403 => ProviderError::AuthenticationFailed(
            "Invalid API key or insufficient permissions".into(),
        ),
        429 => ProviderError::RateLimited {
            retry_after_secs: 5,
        },
        404 if body.contains("model") => ProviderError::ModelNotFound(body),
        _ => ProviderError::ApiError {
            status_code: status,
            message: body,
        },
    }
}

/// Call ids already used by earlier assistant turns.
fn used_call_ids(entries: &[ConversationEntry]) -> HashSet<String> {
    entries
        .iter()
        .filter_map(|entry| match entry {
            ConversationEntry::Assistant { calls, .. } => Some(calls),
            _ => None,
        })
        .flatten()
        .map(|call| call.id.clone())
        .collect()
}

/// Turn a decoded response body into a model reply.
///
/// `used_ids` holds the call ids already present in the conversation; it is
/// extended with the ids handed out here.
fn parse_completion(
    api_response: ApiResponse,
    mut used_ids: HashSet<String>,
) -> Result<ProviderResponse, ProviderError> {
    let choice = api_response
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| ProviderError::MalformedResponse("No choices in response".into()))?;

    let calls: Vec<RequestedCall> = choice
        .message
        .tool_calls
        .unwrap_or_default()
        .into_iter()
        .map(|tc| {
            let id = match tc.id {
                Some(id) if !id.is_empty() && !used_ids.contains(&id) => id,
                reused => {
                    if let Some(id) = reused.filter(|id| !id.is_empty()) {
                        debug!(call_id = %id, "Replacing reused tool call id");
                    }
                    format!("call_{}", uuid::Uuid::new_v4().simple())
                }
            };
            used_ids.insert(id.clone());
            RequestedCall::new(id, tc.function.name, parse_arguments(&tc.function.arguments))
        })
        .collect();

    let usage = api_response.usage.map(|u| Usage {
        prompt_tokens: u.prompt_tokens,
        completion_tokens: u.completion_tokens,
        total_tokens: u.total_tokens,
    });

    Ok(ProviderResponse {
        reply: ModelReply::from_parts(choice.message.content.unwrap_or_default(), calls),
        usage,
        model: api_response.model,
    })
}

/// Decode a function-call argument string.
///
/// Unparsable text is kept as a JSON string so schema validation rejects it
/// with a message the model can act on.
fn parse_arguments(raw: &str) -> Value {
    if raw.trim().is_empty() {
        return Value::Object(serde_json::Map::new());
    }
    serde_json::from_str(raw).unwrap_or_else(|e| {
        warn!(error = %e, "Tool call arguments are not valid JSON");
        Value::String(raw.to_string())
    })
}

#[async_trait]
impl Provider for OpenAiCompatProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn complete(
        &self,
        request: ProviderRequest,
    ) -> std::result::Result<ProviderResponse, ProviderError> {
        let url = format!("{}/chat/completions", self.base_url);
        let body = Self::request_body(&request);

        debug!(
            provider = %self.name,
            model = %request.model,
            entries = request.entries.len(),
            tools = request.tools.len(),
            "Sending completion request"
        );

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ProviderError::Timeout(e.to_string())
                } else {
                    ProviderError::Network(e.to_string())
                }
            })?;

        let status = response.status().as_u16();
        if status != 200 {
            let error_body = response.text().await.unwrap_or_default();
            warn!(status, body = %error_body, "Provider returned error");
            return Err(status_error(status, error_body));
        }

        let api_response: ApiResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::MalformedResponse(format!("Failed to parse response: {e}")))?;

        parse_completion(api_response, used_call_ids(&request.entries))
    }

    async fn health_check(&self) -> std::result::Result<bool, ProviderError> {
        let url = format!("{}/models", self.base_url);
        let response = self
            .client
            .get(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .send()
            .await
            .map_err(|e| ProviderError::Network(e.to_string()))?;

        Ok(response.status().is_success())
    }
}

// --- OpenAI API types ---

#[derive(Debug, Serialize)]
struct ApiMessage {
    role: String,
    content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_calls: Option<Vec<ApiToolCall>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_call_id: Option<String>,
}

impl ApiMessage {
    fn plain(role: &str, content: &str) -> Self {
        Self {
            role: role.into(),
            content: Some(content.to_string()),
            tool_calls: None,
            tool_call_id: None,
        }
    }
}

#[derive(Debug, Serialize)]
struct ApiToolCall {
    id: String,
    r#type: String,
    function: ApiFunction,
}

impl ApiToolCall {
    fn from_call(call: &RequestedCall) -> Self {
        // The wire format carries arguments as a JSON-encoded string.
        let arguments = match &call.arguments {
            Value::String(raw) => raw.clone(),
            other => other.to_string(),
        };
        Self {
            id: call.id.clone(),
            r#type: "function".into(),
            function: ApiFunction {
                name: call.name.clone(),
                arguments,
            },
        }
    }
}

#[derive(Debug, Serialize)]
struct ApiFunction {
    name: String,
    arguments: String,
}

#[derive(Debug, Serialize)]
struct ApiToolDefinition {
    r#type: String,
    function: ApiToolFunction,
}

#[derive(Debug, Serialize)]
struct ApiToolFunction {
    name: String,
    description: String,
    parameters: Value,
}

#[derive(Debug, Deserialize)]
struct ApiResponse {
    choices: Vec<ApiChoice>,
    #[serde(default)]
    usage: Option<ApiUsage>,
    #[serde(default)]
    model: String,
}

#[derive(Debug, Deserialize)]
struct ApiChoice {
    message: ApiResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ApiResponseMessage {
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    tool_calls: Option<Vec<ApiResponseToolCall>>,
}

#[derive(Debug, Deserialize)]
struct ApiResponseToolCall {
    #[serde(default)]
    id: Option<String>,
    function: ApiResponseFunction,
}

#[derive(Debug, Deserialize)]
struct ApiResponseFunction {
    name: String,
    #[serde(default)]
    arguments: String,
}

#[derive(Debug, Deserialize)]
struct ApiUsage {
    prompt_tokens: u32,
    completion_tokens: u32,
    total_tokens: u32,
}
