//! Error types for the minicursor domain.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! Each bounded context has its own error enum; the agent loop decides which
//! of them are folded back into the transcript and which abort a run.

use thiserror::Error;

/// The top-level error type for all minicursor operations.
///
/// Only fatal conditions reach the caller of a run. Tool failures are
/// recovered into tool-result text long before they could become one of these.
#[derive(Debug, Error)]
pub enum Error {
    // --- Model client errors ---
    #[error("Model invocation failed: {0}")]
    Provider(#[from] ProviderError),

    // --- Registry errors ---
    #[error("Registry error: {0}")]
    Registry(#[from] RegistryError),

    // --- Transcript errors ---
    #[error("Transcript error: {0}")]
    Transcript(#[from] TranscriptError),

    // --- Run control ---
    #[error("Run cancelled before completion")]
    Cancelled,

    // --- Configuration errors ---
    #[error("Configuration error: {message}")]
    Config { message: String },
}

/// Result type alias using our Error.
pub type Result<T> = std::result::Result<T, Error>;

// --- Bounded context errors ---

#[derive(Debug, Clone, Error)]
pub enum ProviderError {
    #[error("API request failed: {message} (status: {status_code})")]
    ApiError { status_code: u16, message: String },

    #[error("Rate limited by provider, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Model not found: {0}")]
    ModelNotFound(String),

    #[error("Malformed model response: {0}")]
    MalformedResponse(String),

    #[error("Provider not configured: {0}")]
    NotConfigured(String),

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Network error: {0}")]
    Network(String),
}

/// Failures of a single tool invocation. All of these are recoverable: the
/// invoker turns them into tool-result text so the model can react.
#[derive(Debug, Clone, Error)]
pub enum ToolError {
    #[error("Tool not found: {0}")]
    NotFound(String),

    #[error("Invalid arguments for {tool_name}: {reason}")]
    InvalidArguments { tool_name: String, reason: String },

    #[error("Tool execution failed: {tool_name} — {reason}")]
    ExecutionFailed { tool_name: String, reason: String },

    #[error("Tool timed out: {tool_name} after {timeout_ms} ms")]
    Timeout { tool_name: String, timeout_ms: u64 },

    #[error("Unsupported result shape from {tool_name}: {shape}")]
    UnsupportedResultShape { tool_name: String, shape: String },
}

impl ToolError {
    /// Shorthand for an execution failure.
    pub fn execution(tool_name: impl Into<String>, reason: impl ToString) -> Self {
        Self::ExecutionFailed {
            tool_name: tool_name.into(),
            reason: reason.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("A tool named '{0}' is already registered")]
    DuplicateTool(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TranscriptError {
    #[error("No unanswered tool call with id '{0}'")]
    DanglingCorrelation(String),

    #[error("Tool call id '{0}' is already used in this transcript")]
    DuplicateCorrelation(String),

    #[error("{count} tool call(s) from the previous assistant turn are still unanswered")]
    UnansweredCalls { count: usize },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_error_displays_correctly() {
        let err = Error::Provider(ProviderError::ApiError {
            status_code: 429,
            message: "Too many requests".into(),
        });
        assert!(err.to_string().contains("429"));
        assert!(err.to_string().contains("Too many requests"));
        assert!(err.to_string().starts_with("Model invocation failed"));
    }

    #[test]
    fn tool_error_displays_correctly() {
        let err = ToolError::InvalidArguments {
            tool_name: "read_file".into(),
            reason: "missing required field `filePath`".into(),
        };
        assert!(err.to_string().contains("read_file"));
        assert!(err.to_string().contains("filePath"));
    }

    #[test]
    fn registry_error_converts() {
        let err: Error = RegistryError::DuplicateTool("read_file".into()).into();
        assert!(matches!(err, Error::Registry(RegistryError::DuplicateTool(_))));
        assert_eq!(
            err.to_string(),
            "Registry error: A tool named 'read_file' is already registered"
        );
    }

    #[test]
    fn transcript_error_converts() {
        let err: Error = TranscriptError::DanglingCorrelation("call_9".into()).into();
        assert!(matches!(
            err,
            Error::Transcript(TranscriptError::DanglingCorrelation(ref id)) if id == "call_9"
        ));
    }
}
