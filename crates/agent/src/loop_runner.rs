//! The agent reasoning loop implementation.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use minicursor_core::error::{Error, TranscriptError};
use minicursor_core::event::{DomainEvent, EventBus};
use minicursor_core::provider::{Provider, ProviderRequest, ToolDefinition};
use minicursor_core::tool::ToolRegistry;
use minicursor_core::transcript::Transcript;
use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::invoker::ToolInvoker;

/// Default bound on model invocations per query.
pub const DEFAULT_MAX_ITERATIONS: u32 = 30;

/// How a query ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "text", rename_all = "snake_case")]
pub enum LoopOutcome {
    /// The model answered without requesting tools.
    FinalAnswer(String),
    /// The iteration bound was hit while the model was still calling tools.
    /// Carries the text of the last assistant turn.
    Exhausted(String),
}

impl LoopOutcome {
    pub fn text(&self) -> &str {
        match self {
            Self::FinalAnswer(text) | Self::Exhausted(text) => text,
        }
    }

    pub fn is_final_answer(&self) -> bool {
        matches!(self, Self::FinalAnswer(_))
    }

    fn label(&self) -> &'static str {
        match self {
            Self::FinalAnswer(_) => "final_answer",
            Self::Exhausted(_) => "exhausted",
        }
    }
}

/// Everything a finished run leaves behind.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub outcome: LoopOutcome,
    /// The full transcript of the run
    pub transcript: Transcript,
    /// Number of model invocations made
    pub model_calls: u32,
    /// Number of tool calls resolved
    pub tool_calls: usize,
}

#[derive(Default)]
struct RunStats {
    model_calls: u32,
    tool_calls: usize,
}

/// The core agent loop that orchestrates model calls and tool execution.
///
/// One `AgentLoop` can serve many concurrent runs: each run owns its own
/// transcript, and the registry is only ever read.
pub struct AgentLoop {
    /// The model client to use
    provider: Arc<dyn Provider>,

    /// The model to use
    model: String,

    /// Temperature setting
    temperature: f32,

    /// Max tokens per model response
    max_tokens: Option<u32>,

    /// Resolves tool calls against the registry
    invoker: ToolInvoker,

    /// Event bus for domain events
    event_bus: Arc<EventBus>,
}

impl AgentLoop {
    /// Create a new agent loop.
    pub fn new(
        provider: Arc<dyn Provider>,
        model: impl Into<String>,
        temperature: f32,
        tools: Arc<ToolRegistry>,
        event_bus: Arc<EventBus>,
    ) -> Self {
        Self {
            provider,
            model: model.into(),
            temperature,
            max_tokens: None,
            invoker: ToolInvoker::new(tools),
            event_bus,
        }
    }

    /// Set the max tokens per model response.
    pub fn with_max_tokens(mut self, max: u32) -> Self {
        self.max_tokens = Some(max);
        self
    }

    /// Bound each tool call to `timeout`.
    pub fn with_tool_timeout(mut self, timeout: Duration) -> Self {
        self.invoker = self.invoker.with_timeout(timeout);
        self
    }

    /// Run the calls of one round concurrently (default) or one by one.
    pub fn with_parallel_tool_calls(mut self, parallel: bool) -> Self {
        self.invoker = self.invoker.with_parallel(parallel);
        self
    }

    pub fn tools(&self) -> &ToolRegistry {
        self.invoker.registry()
    }

    /// Run one query to completion.
    pub async fn run(
        &self,
        query: &str,
        system_preamble: Option<&str>,
        max_iterations: u32,
    ) -> Result<LoopOutcome, Error> {
        let report = self
            .run_cancellable(query, system_preamble, max_iterations, &CancellationToken::new())
            .await?;
        Ok(report.outcome)
    }

    /// Run one query to completion, stopping early when `cancel` fires.
    ///
    /// Cancellation is observed while waiting for the model and while waiting
    /// for the round's tool calls; in-flight tool futures are dropped.
    pub async fn run_cancellable(
        &self,
        query: &str,
        system_preamble: Option<&str>,
        max_iterations: u32,
        cancel: &CancellationToken,
    ) -> Result<RunReport, Error> {
        if max_iterations == 0 {
            return Err(Error::Config {
                message: "max_iterations must be at least 1".into(),
            });
        }

        let mut transcript = Transcript::seeded(system_preamble, query);
        let run_id = transcript.id.to_string();
        let definitions = self.invoker.definitions();

        info!(
            run_id = %run_id,
            max_iterations,
            tools = definitions.len(),
            "Starting agent run"
        );
        self.event_bus.publish(DomainEvent::RunStarted {
            run_id: run_id.clone(),
            query_preview: query.chars().take(80).collect(),
            timestamp: Utc::now(),
        });

        let mut stats = RunStats::default();
        let result = self
            .drive(&mut transcript, &definitions, max_iterations, cancel, &mut stats)
            .await;

        let label = match &result {
            Ok(outcome) => outcome.label(),
            Err(Error::Cancelled) => "cancelled",
            Err(_) => "failed",
        };
        info!(
            run_id = %run_id,
            outcome = label,
            model_calls = stats.model_calls,
            tool_calls = stats.tool_calls,
            "Agent run finished"
        );
        self.event_bus.publish(DomainEvent::RunFinished {
            run_id,
            outcome: label.into(),
            model_calls: stats.model_calls,
            timestamp: Utc::now(),
        });

        Ok(RunReport {
            outcome: result?,
            transcript,
            model_calls: stats.model_calls,
            tool_calls: stats.tool_calls,
        })
    }

    async fn drive(
        &self,
        transcript: &mut Transcript,
        definitions: &[ToolDefinition],
        max_iterations: u32,
        cancel: &CancellationToken,
        stats: &mut RunStats,
    ) -> Result<LoopOutcome, Error> {
        let run_id = transcript.id.to_string();

        loop {
            if stats.model_calls >= max_iterations {
                warn!(
                    run_id = %run_id,
                    iterations = stats.model_calls,
                    "Max iterations reached while the model was still calling tools"
                );
                let last = transcript.last_assistant_text().unwrap_or_default();
                return Ok(LoopOutcome::Exhausted(last.to_string()));
            }

            // Never show the model a round with missing answers.
            if transcript.has_pending_calls() {
                return Err(TranscriptError::UnansweredCalls {
                    count: transcript.pending_calls().len(),
                }
                .into());
            }

            stats.model_calls += 1;
            debug!(run_id = %run_id, iteration = stats.model_calls, "Agent loop iteration");
            self.event_bus.publish(DomainEvent::RoundStarted {
                run_id: run_id.clone(),
                iteration: stats.model_calls,
                timestamp: Utc::now(),
            });

            let request = ProviderRequest {
                model: self.model.clone(),
                entries: transcript.snapshot().to_vec(),
                temperature: self.temperature,
                max_tokens: self.max_tokens,
                tools: definitions.to_vec(),
            };

            let response = tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    warn!(run_id = %run_id, "Run cancelled while waiting for the model");
                    return Err(Error::Cancelled);
                }
                response = self.provider.complete(request) => response?,
            };

            let calls = response.reply.calls().to_vec();
            let text = response.reply.text().to_string();
            self.event_bus.publish(DomainEvent::ResponseGenerated {
                run_id: run_id.clone(),
                model: response.model.clone(),
                tool_calls: calls.len(),
                tokens_used: response.usage.map(|u| u.total_tokens),
                timestamp: Utc::now(),
            });

            if calls.is_empty() {
                transcript.append_assistant(text.clone(), Vec::new())?;
                return Ok(LoopOutcome::FinalAnswer(text));
            }

            debug!(run_id = %run_id, tool_count = calls.len(), "Executing tool calls");
            transcript.append_assistant(text, calls.clone())?;

            let results = tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    warn!(run_id = %run_id, "Run cancelled while waiting for tool calls");
                    return Err(Error::Cancelled);
                }
                results = self.invoker.invoke_batch(&calls) => results,
            };

            // Results come back in request order; append them all before the
            // next model invocation.
            for result in results {
                self.event_bus.publish(DomainEvent::ToolExecuted {
                    run_id: run_id.clone(),
                    call_id: result.call_id.clone(),
                    tool_name: result.tool_name.clone(),
                    success: result.success,
                    duration_ms: result.duration_ms,
                    timestamp: Utc::now(),
                });
                transcript.append_tool_result(&result.call_id, result.output)?;
                stats.tool_calls += 1;
            }
        }
    }
}
