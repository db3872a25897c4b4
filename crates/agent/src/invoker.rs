//! Tool invocation — from a requested call to a tool-result text.
//!
//! Every failure a tool can cause (unknown name, bad arguments, execution
//! error, timeout, panic, unsupported output) is folded into the result text
//! so the model can react. Nothing in here aborts a run.

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::{Duration, Instant};

use futures::FutureExt;
use futures::future::join_all;
use minicursor_core::error::ToolError;
use minicursor_core::message::RequestedCall;
use minicursor_core::provider::ToolDefinition;
use minicursor_core::tool::{ToolRegistry, ToolResult};
use tracing::{debug, warn};

/// Resolves requested calls against a shared, read-only registry.
pub struct ToolInvoker {
    tools: Arc<ToolRegistry>,
    /// Per-call limit. `None` lets tools run as long as they like.
    timeout: Option<Duration>,
    /// Run the calls of one round concurrently.
    parallel: bool,
}

impl ToolInvoker {
    pub fn new(tools: Arc<ToolRegistry>) -> Self {
        Self {
            tools,
            timeout: None,
            parallel: true,
        }
    }

    /// Set the per-call timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Choose between concurrent and sequential batches.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn registry(&self) -> &ToolRegistry {
        &self.tools
    }

    /// Definitions advertised to the model.
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.tools.definitions()
    }

    /// Invoke one call. Never fails: errors become the result text.
    pub async fn invoke(&self, call: &RequestedCall) -> ToolResult {
        debug!(tool = %call.name, call_id = %call.id, "Invoking tool");
        let start = Instant::now();
        let outcome = self.try_invoke(call).await;
        let duration_ms = start.elapsed().as_millis() as u64;

        match outcome {
            Ok(output) => ToolResult {
                call_id: call.id.clone(),
                tool_name: call.name.clone(),
                success: true,
                output,
                duration_ms,
            },
            Err(e) => {
                warn!(tool = %call.name, call_id = %call.id, error = %e, "Tool call failed");
                ToolResult {
                    call_id: call.id.clone(),
                    tool_name: call.name.clone(),
                    success: false,
                    output: format!("Error: {e}"),
                    duration_ms,
                }
            }
        }
    }

    /// Invoke every call of one round. Results come back in request order,
    /// and one call failing never affects its siblings.
    pub async fn invoke_batch(&self, calls: &[RequestedCall]) -> Vec<ToolResult> {
        if self.parallel && calls.len() > 1 {
            return join_all(calls.iter().map(|call| self.invoke(call))).await;
        }

        let mut results = Vec::with_capacity(calls.len());
        for call in calls {
            results.push(self.invoke(call).await);
        }
        results
    }

    async fn try_invoke(&self, call: &RequestedCall) -> Result<String, ToolError> {
        let tool = self.tools.lookup(&call.name)?;

        tool.input_schema()
            .validate(&call.arguments)
            .map_err(|reason| ToolError::InvalidArguments {
                tool_name: call.name.clone(),
                reason,
            })?;

        let execution = AssertUnwindSafe(tool.execute(call.arguments.clone())).catch_unwind();
        let finished = match self.timeout {
            Some(limit) => tokio::time::timeout(limit, execution)
                .await
                .map_err(|_| ToolError::Timeout {
                    tool_name: call.name.clone(),
                    timeout_ms: u64::try_from(limit.as_millis()).unwrap_or(u64::MAX),
                })?,
            None => execution.await,
        };

        let output = finished
            .map_err(|panic| ToolError::execution(&call.name, panic_message(panic.as_ref())))??;
        output.into_text(&call.name)
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    let detail = panic
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| panic.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown cause".into());
    format!("tool panicked: {detail}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{
        EchoTool, FailingTool, PanickingTool, ShapelessTool, SleepyTool, registry_with,
    };
    use serde_json::json;

    fn invoker() -> ToolInvoker {
        ToolInvoker::new(registry_with(vec![
            Arc::new(EchoTool::new()),
            Arc::new(FailingTool),
            Arc::new(PanickingTool),
            Arc::new(ShapelessTool),
        ]))
    }

    #[tokio::test]
    async fn successful_call_returns_text() {
        let result = invoker()
            .invoke(&RequestedCall::new("c1", "echo", json!({"text": "hi"})))
            .await;
        assert!(result.success);
        assert_eq!(result.call_id, "c1");
        assert_eq!(result.output, "hi");
    }

    #[tokio::test]
    async fn unknown_tool_is_reported_not_fatal() {
        let result = invoker()
            .invoke(&RequestedCall::new("c1", "teleport", json!({})))
            .await;
        assert!(!result.success);
        assert!(result.output.contains("Tool not found: teleport"));
    }

    #[tokio::test]
    async fn invalid_arguments_are_reported() {
        let result = invoker()
            .invoke(&RequestedCall::new("c1", "echo", json!({"text": 7})))
            .await;
        assert!(!result.success);
        assert!(result.output.contains("Invalid arguments for echo"));
        assert!(result.output.contains("field `text` must be string"));
    }

    #[tokio::test]
    async fn execution_failure_is_reported() {
        let result = invoker()
            .invoke(&RequestedCall::new("c1", "fail", json!({})))
            .await;
        assert!(!result.success);
        assert!(result.output.contains("disk on fire"));
    }

    #[tokio::test]
    async fn panics_are_caught() {
        let result = invoker()
            .invoke(&RequestedCall::new("c1", "panic", json!({})))
            .await;
        assert!(!result.success);
        assert!(result.output.contains("tool panicked: boom"));
    }

    #[tokio::test]
    async fn unsupported_shape_is_reported() {
        let result = invoker()
            .invoke(&RequestedCall::new("c1", "shapeless", json!({})))
            .await;
        assert!(!result.success);
        assert!(result.output.contains("Unsupported result shape"));
    }

    #[tokio::test(start_paused = true)]
    async fn timeout_is_reported() {
        let invoker = ToolInvoker::new(registry_with(vec![Arc::new(SleepyTool)]))
            .with_timeout(Duration::from_secs(1));
        let result = invoker
            .invoke(&RequestedCall::new("c1", "sleep", json!({"ms": 5_000})))
            .await;
        assert!(!result.success);
        assert!(result.output.contains("timed out"));
        assert!(result.output.contains("after 1000 ms"));
    }

    #[tokio::test(start_paused = true)]
    async fn sub_second_timeout_is_reported_in_millis() {
        let invoker = ToolInvoker::new(registry_with(vec![Arc::new(SleepyTool)]))
            .with_timeout(Duration::from_millis(250));
        let result = invoker
            .invoke(&RequestedCall::new("c1", "sleep", json!({"ms": 5_000})))
            .await;
        assert!(!result.success);
        assert!(result.output.contains("sleep after 250 ms"));
    }

    #[tokio::test]
    async fn batch_isolates_failures_and_keeps_order() {
        let calls = vec![
            RequestedCall::new("c1", "fail", json!({})),
            RequestedCall::new("c2", "echo", json!({"text": "second"})),
            RequestedCall::new("c3", "missing", json!({})),
            RequestedCall::new("c4", "panic", json!({})),
            RequestedCall::new("c5", "echo", json!({"text": "fifth"})),
        ];
        let results = invoker().invoke_batch(&calls).await;
        let ids: Vec<&str> = results.iter().map(|r| r.call_id.as_str()).collect();
        assert_eq!(ids, ["c1", "c2", "c3", "c4", "c5"]);
        assert_eq!(results[1].output, "second");
        assert_eq!(results[4].output, "fifth");
        assert_eq!(results.iter().filter(|r| r.success).count(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn parallel_batch_runs_concurrently() {
        let calls = vec![
            RequestedCall::new("slow", "sleep", json!({"ms": 300})),
            RequestedCall::new("fast", "sleep", json!({"ms": 100})),
        ];

        let parallel = ToolInvoker::new(registry_with(vec![Arc::new(SleepyTool)]));
        let start = tokio::time::Instant::now();
        let results = parallel.invoke_batch(&calls).await;
        assert!(start.elapsed() < Duration::from_millis(350));
        assert_eq!(results[0].call_id, "slow");
        assert_eq!(results[1].call_id, "fast");

        let sequential =
            ToolInvoker::new(registry_with(vec![Arc::new(SleepyTool)])).with_parallel(false);
        let start = tokio::time::Instant::now();
        sequential.invoke_batch(&calls).await;
        assert!(start.elapsed() >= Duration::from_millis(400));
    }
}
