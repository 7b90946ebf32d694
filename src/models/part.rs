use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Broad category of a message part, derived from its `type` string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PartKind {
    Text,
    Reasoning,
    Tool,
    File,
    Other,
}

/// A streamed sub-part of a message: text, reasoning, a tool call, a file
/// reference, or anything newer the server invents.
///
/// Parts are keyed by `id` within their owning message (`message_id`).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Part {
    pub id: String,
    #[serde(rename = "messageID")]
    pub message_id: String,
    #[serde(rename = "sessionID", default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    #[serde(rename = "type")]
    pub part_type: String,
    #[serde(flatten)]
    pub payload: Map<String, Value>,
}

impl Part {
    pub fn new(
        id: impl Into<String>,
        message_id: impl Into<String>,
        part_type: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            message_id: message_id.into(),
            session_id: None,
            part_type: part_type.into(),
            payload: Map::new(),
        }
    }

    /// Convenience constructor for a text part.
    pub fn text(
        id: impl Into<String>,
        message_id: impl Into<String>,
        text: impl Into<String>,
    ) -> Self {
        Self::new(id, message_id, "text").with_field("text", Value::String(text.into()))
    }

    pub fn with_session(mut self, session_id: impl Into<String>) -> Self {
        self.session_id = Some(session_id.into());
        self
    }

    pub fn with_field(mut self, key: impl Into<String>, value: Value) -> Self {
        self.payload.insert(key.into(), value);
        self
    }

    pub fn kind(&self) -> PartKind {
        match self.part_type.as_str() {
            "text" => PartKind::Text,
            "reasoning" => PartKind::Reasoning,
            "tool" | "tool-invocation" => PartKind::Tool,
            "file" => PartKind::File,
            _ => PartKind::Other,
        }
    }

    /// Text body for text and reasoning parts.
    pub fn text_content(&self) -> Option<&str> {
        self.payload.get("text").and_then(Value::as_str)
    }

    /// Tool name for tool parts.
    pub fn tool_name(&self) -> Option<&str> {
        self.payload.get("tool").and_then(Value::as_str)
    }

    /// Tool execution status. Newer servers nest it as `state.status`,
    /// older ones send `state` as a bare string.
    pub fn tool_status(&self) -> Option<&str> {
        match self.payload.get("state")? {
            Value::String(status) => Some(status),
            Value::Object(state) => state.get("status").and_then(Value::as_str),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_part_deserialize() {
        let part: Part = serde_json::from_value(json!({
            "id": "prt_1",
            "messageID": "msg_1",
            "sessionID": "ses_1",
            "type": "text",
            "text": "hello"
        }))
        .unwrap();

        assert_eq!(part.id, "prt_1");
        assert_eq!(part.message_id, "msg_1");
        assert_eq!(part.session_id.as_deref(), Some("ses_1"));
        assert_eq!(part.kind(), PartKind::Text);
        assert_eq!(part.text_content(), Some("hello"));
    }

    #[test]
    fn test_part_without_session_serializes_without_key() {
        let part = Part::text("p1", "m1", "hi");
        let value = serde_json::to_value(&part).unwrap();
        assert!(value.get("sessionID").is_none());
        assert_eq!(value["type"], "text");
        assert_eq!(value["text"], "hi");
    }

    #[test]
    fn test_part_kinds() {
        assert_eq!(Part::new("p", "m", "reasoning").kind(), PartKind::Reasoning);
        assert_eq!(Part::new("p", "m", "tool").kind(), PartKind::Tool);
        assert_eq!(Part::new("p", "m", "file").kind(), PartKind::File);
        assert_eq!(Part::new("p", "m", "step-start").kind(), PartKind::Other);
    }

    #[test]
    fn test_tool_status_shapes() {
        let nested = Part::new("p", "m", "tool")
            .with_field("tool", json!("bash"))
            .with_field("state", json!({"status": "running", "input": {}}));
        assert_eq!(nested.tool_name(), Some("bash"));
        assert_eq!(nested.tool_status(), Some("running"));

        let flat = Part::new("p", "m", "tool-invocation").with_field("state", json!("completed"));
        assert_eq!(flat.tool_status(), Some("completed"));

        assert_eq!(Part::text("p", "m", "x").tool_status(), None);
    }
}
