//! User lookup tool backed by an in-memory store.
//!
//! Replies in the content-block shape used by MCP servers
//! (`{"content": [{"type": "text", "text": ...}]}`); the invoker
//! normalises that to plain text.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use minicursor_config::UserRecord;
use minicursor_core::error::ToolError;
use minicursor_core::schema::{ArgumentSchema, FieldKind};
use minicursor_core::tool::{Tool, ToolOutput};
use serde_json::{Value, json};

use crate::str_arg;

/// Read-only user records, keyed by id.
#[derive(Debug, Clone, Default)]
pub struct UserStore {
    users: BTreeMap<String, UserRecord>,
}

impl UserStore {
    pub fn new(records: impl IntoIterator<Item = UserRecord>) -> Self {
        Self {
            users: records
                .into_iter()
                .map(|record| (record.id.clone(), record))
                .collect(),
        }
    }

    pub fn get(&self, id: &str) -> Option<&UserRecord> {
        self.users.get(id)
    }

    /// All ids, sorted.
    pub fn ids(&self) -> Vec<&str> {
        self.users.keys().map(String::as_str).collect()
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}

pub struct QueryUserTool {
    store: Arc<UserStore>,
    schema: ArgumentSchema,
}

impl QueryUserTool {
    pub fn new(store: Arc<UserStore>) -> Self {
        Self {
            store,
            schema: ArgumentSchema::object().required(
                "userId",
                FieldKind::String,
                "User id, e.g. 001",
            ),
        }
    }
}

fn text_content(text: String) -> ToolOutput {
    ToolOutput::Structured(json!({
        "content": [{"type": "text", "text": text}]
    }))
}

#[async_trait]
impl Tool for QueryUserTool {
    fn name(&self) -> &str {
        "query_user"
    }

    fn description(&self) -> &str {
        "Look up a user by id and return their name, email and role."
    }

    fn input_schema(&self) -> &ArgumentSchema {
        &self.schema
    }

    async fn execute(&self, arguments: Value) -> Result<ToolOutput, ToolError> {
        let user_id = str_arg(self.name(), &arguments, "userId")?;

        let text = match self.store.get(user_id) {
            Some(user) => format!(
                "User {user_id}:\nName: {}\nEmail: {}\nRole: {}",
                user.name, user.email, user.role
            ),
            None => format!(
                "User id {user_id} does not exist. Available ids: {}",
                self.store.ids().join(", ")
            ),
        };
        Ok(text_content(text))
    }
}
