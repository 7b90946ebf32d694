//! Event types pushed by the agent service over its event feed.
//!
//! Every frame on the feed decodes to a [`RawEvent`]: a `type` string plus a
//! free-form `properties` object. [`classify`] turns that into a typed
//! [`FeedEvent`]; anything we do not understand becomes
//! [`FeedEvent::Unhandled`] rather than an error, so new server event types
//! never break an older client.
//!
//! # Module structure
//! - `classify` - session-id resolution, session filter, typed extraction

mod classify;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::models::{MessageInfo, Part, SessionInfo};

pub use classify::{classify, get_message_info, get_part_info, is_event_for_session, session_id_of};

/// An undecoded feed event: `{"type": "...", "properties": {...}}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawEvent {
    #[serde(rename = "type")]
    pub event_type: String,
    #[serde(default)]
    pub properties: Value,
}

impl RawEvent {
    pub fn new(event_type: impl Into<String>, properties: Value) -> Self {
        Self {
            event_type: event_type.into(),
            properties,
        }
    }

    /// Decode a frame payload.
    pub fn parse(data: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(data)
    }

    pub fn kind(&self) -> EventKind {
        EventKind::from_type(&self.event_type)
    }
}

/// The event variants this crate acts on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    MessageUpdated,
    MessagePartUpdated,
    MessageRemoved,
    SessionIdle,
    SessionError,
    SessionUpdated,
    ServerConnected,
    Unhandled,
}

impl EventKind {
    pub fn from_type(event_type: &str) -> Self {
        match event_type {
            "message.updated" => EventKind::MessageUpdated,
            "message.part.updated" => EventKind::MessagePartUpdated,
            "message.removed" => EventKind::MessageRemoved,
            "session.idle" => EventKind::SessionIdle,
            "session.error" => EventKind::SessionError,
            "session.updated" => EventKind::SessionUpdated,
            "server.connected" => EventKind::ServerConnected,
            _ => EventKind::Unhandled,
        }
    }

    /// Wire name, or `None` for the catch-all.
    pub fn as_str(&self) -> Option<&'static str> {
        match self {
            EventKind::MessageUpdated => Some("message.updated"),
            EventKind::MessagePartUpdated => Some("message.part.updated"),
            EventKind::MessageRemoved => Some("message.removed"),
            EventKind::SessionIdle => Some("session.idle"),
            EventKind::SessionError => Some("session.error"),
            EventKind::SessionUpdated => Some("session.updated"),
            EventKind::ServerConnected => Some("server.connected"),
            EventKind::Unhandled => None,
        }
    }
}

/// A classified feed event.
#[derive(Debug, Clone, PartialEq)]
pub enum FeedEvent {
    /// A message was created or its metadata changed
    MessageUpdated { info: MessageInfo },
    /// A part was created or changed. `delta` is the newly appended text
    /// when the server streams incrementally; `part` is always the full state.
    MessagePartUpdated { part: Part, delta: Option<String> },
    /// A message was deleted
    MessageRemoved {
        session_id: Option<String>,
        message_id: String,
    },
    /// The agent finished working in a session
    SessionIdle { session_id: String },
    /// The agent hit an error in a session
    SessionError {
        session_id: Option<String>,
        error: Option<String>,
    },
    /// Session metadata (title etc.) changed
    SessionUpdated { info: SessionInfo },
    /// The server finished accepting the feed subscription
    ServerConnected,
    /// Anything else, kept for logging and forward compatibility
    Unhandled {
        event_type: String,
        properties: Value,
    },
}

impl FeedEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            FeedEvent::MessageUpdated { .. } => EventKind::MessageUpdated,
            FeedEvent::MessagePartUpdated { .. } => EventKind::MessagePartUpdated,
            FeedEvent::MessageRemoved { .. } => EventKind::MessageRemoved,
            FeedEvent::SessionIdle { .. } => EventKind::SessionIdle,
            FeedEvent::SessionError { .. } => EventKind::SessionError,
            FeedEvent::SessionUpdated { .. } => EventKind::SessionUpdated,
            FeedEvent::ServerConnected => EventKind::ServerConnected,
            FeedEvent::Unhandled { .. } => EventKind::Unhandled,
        }
    }

    /// Returns the event type name as a string for logging.
    pub fn event_type_name(&self) -> &str {
        match self {
            FeedEvent::Unhandled { event_type, .. } => event_type,
            other => other.kind().as_str().unwrap_or("unknown"),
        }
    }

    /// Session this event belongs to, following the same resolution as
    /// [`session_id_of`] on the wire form.
    ///
    /// `session.updated` resolves to `None`: its payload nests the session
    /// under `info.id`, not `info.sessionID`, so it is a global event.
    pub fn session_id(&self) -> Option<&str> {
        let session_id = match self {
            FeedEvent::MessageUpdated { info } => Some(info.session_id.as_str()),
            FeedEvent::MessagePartUpdated { part, .. } => part.session_id.as_deref(),
            FeedEvent::MessageRemoved { session_id, .. } => session_id.as_deref(),
            FeedEvent::SessionIdle { session_id } => Some(session_id.as_str()),
            FeedEvent::SessionError { session_id, .. } => session_id.as_deref(),
            FeedEvent::SessionUpdated { .. } | FeedEvent::ServerConnected => None,
            FeedEvent::Unhandled { .. } => None,
        };
        session_id.filter(|id| !id.is_empty())
    }
}
