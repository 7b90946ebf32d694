use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Session (conversation) metadata as returned by the agent service.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SessionInfo {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub directory: Option<String>,
    #[serde(rename = "parentID", default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
    #[serde(flatten)]
    pub metadata: Map<String, Value>,
}

impl SessionInfo {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: None,
            directory: None,
            parent_id: None,
            metadata: Map::new(),
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }
}

/// What the agent is currently doing in a session, as far as the feed has told us.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SessionActivity {
    #[default]
    Idle,
    /// Parts are streaming in.
    Busy,
    /// The last `session.error` message.
    Errored(String),
}

impl SessionActivity {
    pub fn is_busy(&self) -> bool {
        matches!(self, SessionActivity::Busy)
    }
}
