//! The per-query transcript.
//!
//! A transcript is created when a query begins and dropped when the run
//! returns. Entries are only ever appended; nothing is edited in place, so
//! every model round sees a stable, replayable history.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::error::TranscriptError;
use crate::message::{ConversationEntry, RequestedCall, Role};

/// Unique identifier for one transcript (one run).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct TranscriptId(pub String);

impl TranscriptId {
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }
}

impl Default for TranscriptId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for TranscriptId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Ordered, append-only conversation state for one query.
#[derive(Debug, Clone, Serialize)]
pub struct Transcript {
    /// Unique transcript ID
    pub id: TranscriptId,

    /// When the transcript was created
    pub created_at: DateTime<Utc>,

    entries: Vec<ConversationEntry>,

    /// Ids of requested calls that have no tool result yet, in request order.
    #[serde(skip)]
    pending: Vec<String>,

    /// Every correlation id ever requested in this transcript.
    #[serde(skip)]
    seen_call_ids: HashSet<String>,
}

impl Transcript {
    /// Create an empty transcript.
    pub fn new() -> Self {
        Self {
            id: TranscriptId::new(),
            created_at: Utc::now(),
            entries: Vec::new(),
            pending: Vec::new(),
            seen_call_ids: HashSet::new(),
        }
    }

    /// Create a transcript seeded with an optional system preamble and the user query.
    pub fn seeded(system_preamble: Option<&str>, query: impl Into<String>) -> Self {
        let mut transcript = Self::new();
        if let Some(preamble) = system_preamble {
            transcript.append_system(preamble);
        }
        transcript.append_user(query);
        transcript
    }

    pub fn append_system(&mut self, content: impl Into<String>) {
        self.entries.push(ConversationEntry::System {
            content: content.into(),
        });
    }

    pub fn append_user(&mut self, content: impl Into<String>) {
        self.entries.push(ConversationEntry::User {
            content: content.into(),
        });
    }

    /// Append a model turn.
    ///
    /// Fails if calls from the previous turn are still unanswered, or if a
    /// call id was already used earlier in this transcript.
    pub fn append_assistant(
        &mut self,
        content: impl Into<String>,
        calls: Vec<RequestedCall>,
    ) -> Result<(), TranscriptError> {
        if !self.pending.is_empty() {
            return Err(TranscriptError::UnansweredCalls {
                count: self.pending.len(),
            });
        }

        let mut batch_ids = HashSet::with_capacity(calls.len());
        for call in &calls {
            if self.seen_call_ids.contains(&call.id) || !batch_ids.insert(call.id.as_str()) {
                return Err(TranscriptError::DuplicateCorrelation(call.id.clone()));
            }
        }

        for call in &calls {
            self.seen_call_ids.insert(call.id.clone());
            self.pending.push(call.id.clone());
        }
        self.entries.push(ConversationEntry::Assistant {
            content: content.into(),
            calls,
        });
        Ok(())
    }

    /// Append the answer to a pending requested call.
    pub fn append_tool_result(
        &mut self,
        call_id: &str,
        content: impl Into<String>,
    ) -> Result<(), TranscriptError> {
        let position = self
            .pending
            .iter()
            .position(|id| id == call_id)
            .ok_or_else(|| TranscriptError::DanglingCorrelation(call_id.to_string()))?;
        self.pending.remove(position);

        self.entries.push(ConversationEntry::ToolResult {
            call_id: call_id.to_string(),
            content: content.into(),
        });
        Ok(())
    }

    /// The ordered entries, for submission to the model client.
    pub fn snapshot(&self) -> &[ConversationEntry] {
        &self.entries
    }

    /// Ids of requested calls still waiting for a result, in request order.
    pub fn pending_calls(&self) -> &[String] {
        &self.pending
    }

    pub fn has_pending_calls(&self) -> bool {
        !self.pending.is_empty()
    }

    /// Text of the most recent assistant entry, if any.
    pub fn last_assistant_text(&self) -> Option<&str> {
        self.entries
            .iter()
            .rev()
            .find(|e| e.role() == Role::Assistant)
            .map(ConversationEntry::content)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Rough token estimate (4 chars ≈ 1 token).
    pub fn estimated_tokens(&self) -> usize {
        self.entries.iter().map(|e| e.content().len() / 4).sum()
    }
}

impl Default for Transcript {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn call(id: &str) -> RequestedCall {
        RequestedCall::new(id, "echo", json!({"text": id}))
    }

    #[test]
    fn seeded_with_and_without_preamble() {
        let t = Transcript::seeded(Some("be brief"), "hello");
        assert_eq!(t.len(), 2);
        assert_eq!(t.snapshot()[0].role(), Role::System);
        assert_eq!(t.snapshot()[1].role(), Role::User);

        let t = Transcript::seeded(None, "hello");
        assert_eq!(t.len(), 1);
        assert_eq!(t.snapshot()[0].content(), "hello");
    }

    #[test]
    fn tool_results_answer_pending_calls() {
        let mut t = Transcript::seeded(None, "q");
        t.append_assistant("", vec![call("a"), call("b")]).unwrap();
        assert_eq!(t.pending_calls(), ["a", "b"]);

        t.append_tool_result("a", "one").unwrap();
        t.append_tool_result("b", "two").unwrap();
        assert!(!t.has_pending_calls());
        assert_eq!(t.len(), 4);
        assert_eq!(t.snapshot()[3].call_id(), Some("b"));
    }

    #[test]
    fn unknown_correlation_is_dangling() {
        let mut t = Transcript::seeded(None, "q");
        t.append_assistant("", vec![call("a")]).unwrap();
        let err = t.append_tool_result("zzz", "x").unwrap_err();
        assert_eq!(err, TranscriptError::DanglingCorrelation("zzz".into()));
        // Nothing was appended
        assert_eq!(t.len(), 2);
    }

    #[test]
    fn answering_twice_is_dangling() {
        let mut t = Transcript::seeded(None, "q");
        t.append_assistant("", vec![call("a")]).unwrap();
        t.append_tool_result("a", "first").unwrap();
        assert!(matches!(
            t.append_tool_result("a", "second"),
            Err(TranscriptError::DanglingCorrelation(_))
        ));
    }

    #[test]
    fn assistant_blocked_while_calls_pending() {
        let mut t = Transcript::seeded(None, "q");
        t.append_assistant("", vec![call("a"), call("b")]).unwrap();
        t.append_tool_result("a", "one").unwrap();
        assert_eq!(
            t.append_assistant("next", vec![]),
            Err(TranscriptError::UnansweredCalls { count: 1 })
        );
    }

    #[test]
    fn correlation_ids_are_unique_per_transcript() {
        let mut t = Transcript::seeded(None, "q");
        assert_eq!(
            t.append_assistant("", vec![call("a"), call("a")]),
            Err(TranscriptError::DuplicateCorrelation("a".into()))
        );

        t.append_assistant("", vec![call("a")]).unwrap();
        t.append_tool_result("a", "ok").unwrap();
        assert_eq!(
            t.append_assistant("", vec![call("a")]),
            Err(TranscriptError::DuplicateCorrelation("a".into()))
        );
    }

    #[test]
    fn last_assistant_text_tracks_latest_turn() {
        let mut t = Transcript::seeded(None, "q");
        assert_eq!(t.last_assistant_text(), None);
        t.append_assistant("thinking", vec![call("a")]).unwrap();
        t.append_tool_result("a", "result").unwrap();
        assert_eq!(t.last_assistant_text(), Some("thinking"));
    }

    #[test]
    fn token_estimate() {
        // 20 chars ≈ 5 tokens
        let t = Transcript::seeded(None, "12345678901234567890");
        assert_eq!(t.estimated_tokens(), 5);
    }
}
