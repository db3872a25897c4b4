//! Shared test doubles for agent tests.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use minicursor_core::error::{ProviderError, ToolError};
use minicursor_core::message::RequestedCall;
use minicursor_core::provider::{ModelReply, Provider, ProviderRequest, ProviderResponse, Usage};
use minicursor_core::schema::{ArgumentSchema, FieldKind};
use minicursor_core::tool::{Tool, ToolOutput, ToolRegistry};
use serde_json::{Value, json};

/// A mock provider that returns a sequence of scripted responses.
///
/// Each call to `complete` returns the next response in the queue. With
/// `repeat_last`, the final response is returned forever; otherwise running
/// past the script is a test bug and panics.
pub struct ScriptedProvider {
    responses: Vec<ProviderResponse>,
    repeat_last: bool,
    requests: Mutex<Vec<ProviderRequest>>,
}

impl ScriptedProvider {
    pub fn new(responses: Vec<ProviderResponse>) -> Self {
        Self {
            responses,
            repeat_last: false,
            requests: Mutex::new(Vec::new()),
        }
    }

    /// A provider that asks for the same tool call every round, forever.
    pub fn always_calling(tool: &str, args: Value) -> Self {
        Self {
            responses: vec![tool_call_response(vec![(tool, args)], "still working")],
            repeat_last: true,
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    /// Every request received so far.
    pub fn requests(&self) -> Vec<ProviderRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl Provider for ScriptedProvider {
    fn name(&self) -> &str {
        "scripted_mock"
    }

    async fn complete(&self, request: ProviderRequest) -> Result<ProviderResponse, ProviderError> {
        let mut requests = self.requests.lock().unwrap();
        let index = requests.len();
        requests.push(request);

        let response = match self.responses.get(index) {
            Some(response) => response,
            None if self.repeat_last && !self.responses.is_empty() => {
                &self.responses[self.responses.len() - 1]
            }
            None => panic!(
                "ScriptedProvider: no more responses (call #{index}, have {})",
                self.responses.len()
            ),
        };

        // Call ids must stay unique within a transcript.
        let mut response = response.clone();
        if let ModelReply::ToolCalls { calls, .. } = &mut response.reply {
            for call in calls.iter_mut() {
                call.id = format!("{}_{index}", call.id);
            }
        }
        Ok(response)
    }
}

/// A provider whose every call fails.
pub struct FailingProvider;

#[async_trait]
impl Provider for FailingProvider {
    fn name(&self) -> &str {
        "failing_mock"
    }

    async fn complete(&self, _request: ProviderRequest) -> Result<ProviderResponse, ProviderError> {
        Err(ProviderError::Network("connection reset".into()))
    }
}

/// A provider that never answers.
pub struct HangingProvider;

#[async_trait]
impl Provider for HangingProvider {
    fn name(&self) -> &str {
        "hanging_mock"
    }

    async fn complete(&self, _request: ProviderRequest) -> Result<ProviderResponse, ProviderError> {
        futures::future::pending().await
    }
}

fn usage() -> Option<Usage> {
    Some(Usage {
        prompt_tokens: 10,
        completion_tokens: 5,
        total_tokens: 15,
    })
}

/// Create a simple text response (no tool calls).
pub fn text_response(text: &str) -> ProviderResponse {
    ProviderResponse {
        reply: ModelReply::from_parts(text, vec![]),
        usage: usage(),
        model: "mock-model".into(),
    }
}

/// Create a response requesting `(tool, args)` calls, with ids `call_<n>`.
pub fn tool_call_response(calls: Vec<(&str, Value)>, thought: &str) -> ProviderResponse {
    let calls = calls
        .into_iter()
        .enumerate()
        .map(|(i, (name, args))| RequestedCall::new(format!("call_{i}"), name, args))
        .collect();
    ProviderResponse {
        reply: ModelReply::from_parts(thought, calls),
        usage: usage(),
        model: "mock-model".into(),
    }
}

pub fn registry_with(tools: Vec<Arc<dyn Tool>>) -> Arc<ToolRegistry> {
    let mut registry = ToolRegistry::new();
    for tool in tools {
        registry.register_arc(tool).unwrap();
    }
    Arc::new(registry)
}

/// `echo(text) → text`
pub struct EchoTool {
    schema: ArgumentSchema,
}

impl EchoTool {
    pub fn new() -> Self {
        Self {
            schema: ArgumentSchema::object().required("text", FieldKind::String, "Text to echo"),
        }
    }
}

#[async_trait]
impl Tool for EchoTool {
    fn name(&self) -> &str {
        "echo"
    }
    fn description(&self) -> &str {
        "Echoes back the input"
    }
    fn input_schema(&self) -> &ArgumentSchema {
        &self.schema
    }
    async fn execute(&self, arguments: Value) -> Result<ToolOutput, ToolError> {
        Ok(ToolOutput::Text(
            arguments["text"].as_str().unwrap_or_default().to_string(),
        ))
    }
}

fn empty_schema() -> &'static ArgumentSchema {
    static EMPTY: std::sync::OnceLock<ArgumentSchema> = std::sync::OnceLock::new();
    EMPTY.get_or_init(ArgumentSchema::object)
}

pub struct FailingTool;

#[async_trait]
impl Tool for FailingTool {
    fn name(&self) -> &str {
        "fail"
    }
    fn description(&self) -> &str {
        "Always fails"
    }
    fn input_schema(&self) -> &ArgumentSchema {
        empty_schema()
    }
    async fn execute(&self, _arguments: Value) -> Result<ToolOutput, ToolError> {
        Err(ToolError::execution("fail", "disk on fire"))
    }
}

pub struct PanickingTool;

#[async_trait]
impl Tool for PanickingTool {
    fn name(&self) -> &str {
        "panic"
    }
    fn description(&self) -> &str {
        "Panics"
    }
    fn input_schema(&self) -> &ArgumentSchema {
        empty_schema()
    }
    async fn execute(&self, _arguments: Value) -> Result<ToolOutput, ToolError> {
        panic!("boom")
    }
}

/// Returns structured output with no textual field.
pub struct ShapelessTool;

#[async_trait]
impl Tool for ShapelessTool {
    fn name(&self) -> &str {
        "shapeless"
    }
    fn description(&self) -> &str {
        "Returns rows"
    }
    fn input_schema(&self) -> &ArgumentSchema {
        empty_schema()
    }
    async fn execute(&self, _arguments: Value) -> Result<ToolOutput, ToolError> {
        Ok(ToolOutput::Structured(json!({"rows": [1, 2, 3]})))
    }
}

/// `sleep(ms)`: waits on the tokio clock, then reports.
pub struct SleepyTool;

#[async_trait]
impl Tool for SleepyTool {
    fn name(&self) -> &str {
        "sleep"
    }
    fn description(&self) -> &str {
        "Sleeps for `ms` milliseconds"
    }
    fn input_schema(&self) -> &ArgumentSchema {
        static SCHEMA: std::sync::OnceLock<ArgumentSchema> = std::sync::OnceLock::new();
        SCHEMA.get_or_init(|| {
            ArgumentSchema::object().required("ms", FieldKind::Integer, "Milliseconds")
        })
    }
    async fn execute(&self, arguments: Value) -> Result<ToolOutput, ToolError> {
        let ms = arguments["ms"].as_u64().unwrap_or_default();
        tokio::time::sleep(Duration::from_millis(ms)).await;
        Ok(format!("slept {ms} ms").into())
    }
}
