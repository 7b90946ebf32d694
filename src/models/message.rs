use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Role of a message in a conversation
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    User,
    Assistant,
}

/// Message metadata as pushed by the agent service in `message.updated`.
///
/// Only the identity fields are typed. Everything else the server sends
/// (timestamps, model, token usage, errors) is kept verbatim in `metadata`
/// so a cached message re-serializes to what the server sent.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MessageInfo {
    pub id: String,
    /// Empty when the server omitted it.
    #[serde(rename = "sessionID", default)]
    pub session_id: String,
    pub role: MessageRole,
    #[serde(flatten)]
    pub metadata: Map<String, Value>,
}

impl MessageInfo {
    pub fn new(id: impl Into<String>, session_id: impl Into<String>, role: MessageRole) -> Self {
        Self {
            id: id.into(),
            session_id: session_id.into(),
            role,
            metadata: Map::new(),
        }
    }

    /// Attach an extra metadata field.
    pub fn with_metadata(mut self, key: impl Into<String>, value: Value) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }

    pub fn is_assistant(&self) -> bool {
        self.role == MessageRole::Assistant
    }

    /// Creation time from `time.created` (milliseconds since epoch).
    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        self.time_field("created")
    }

    /// Completion time from `time.completed`. Assistant messages that are
    /// still generating have no completion time.
    pub fn completed_at(&self) -> Option<DateTime<Utc>> {
        self.time_field("completed")
    }

    fn time_field(&self, name: &str) -> Option<DateTime<Utc>> {
        let millis = self.metadata.get("time")?.get(name)?.as_i64()?;
        Utc.timestamp_millis_opt(millis).single()
    }
}
