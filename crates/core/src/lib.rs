//! # minicursor core
//!
//! Domain types, traits, and error definitions for the minicursor agent.
//! Nothing in here talks to the network or the filesystem: the crate only
//! defines the model every other crate implements against.
//!
//! ## Layout
//!
//! - [`message`]: conversation entries and requested tool calls
//! - [`transcript`]: the append-only, per-query conversation state
//! - [`schema`]: argument validators advertised to the model
//! - [`tool`]: the `Tool` trait and the `ToolRegistry`
//! - [`provider`]: the model-client capability the agent loop consumes
//! - [`event`]: broadcast domain events emitted while a run progresses

pub mod error;
pub mod event;
pub mod message;
pub mod provider;
pub mod schema;
pub mod tool;
pub mod transcript;

// Re-export key types at crate root for ergonomics
pub use error::{Error, Result};
pub use event::{DomainEvent, EventBus};
pub use message::{ConversationEntry, RequestedCall, Role};
pub use provider::{ModelReply, Provider, ProviderRequest, ProviderResponse, ToolDefinition};
pub use schema::{ArgumentSchema, FieldKind};
pub use tool::{Tool, ToolOutput, ToolRegistry, ToolResult};
pub use transcript::{Transcript, TranscriptId};
