//! SSE line and frame types.

/// Represents a parsed SSE line
#[derive(Debug, Clone, PartialEq)]
pub enum SseLine {
    /// Event type declaration (e.g., "event: message")
    Event(String),
    /// Data payload (e.g., "data: {\"type\": \"server.connected\"}")
    Data(String),
    /// Last event id (e.g., "id: 42")
    Id(String),
    /// Empty line - signals end of frame
    Empty,
    /// Comment line (starts with ':')
    Comment(String),
}

/// One complete SSE frame: everything between two blank lines.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SseFrame {
    /// Value of the `event:` field, if the server sent one
    pub event: Option<String>,
    /// `data:` lines joined with '\n'
    pub data: String,
    /// Value of the `id:` field, if the server sent one
    pub id: Option<String>,
}

/// Errors that can occur while turning a frame into an event
#[derive(Debug, Clone, PartialEq)]
pub enum SseParseError {
    /// Frame carried no data
    MissingData,
    /// Invalid JSON in data payload
    InvalidJson { source: String },
}

impl std::fmt::Display for SseParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SseParseError::MissingData => write!(f, "SSE frame has no data"),
            SseParseError::InvalidJson { source } => {
                write!(f, "Invalid JSON in SSE frame: {}", source)
            }
        }
    }
}

impl std::error::Error for SseParseError {}

impl From<serde_json::Error> for SseParseError {
    fn from(err: serde_json::Error) -> Self {
        SseParseError::InvalidJson {
            source: err.to_string(),
        }
    }
}
