use serde::{Deserialize, Serialize};

use super::{MessageInfo, Part, PartKind};

/// One message together with its parts, in first-seen order.
///
/// This is the unit stored in the conversation cache and the shape the
/// agent service returns from its message listing endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ConversationEntry {
    pub info: MessageInfo,
    #[serde(default)]
    pub parts: Vec<Part>,
}

impl ConversationEntry {
    /// Create an entry with no parts yet.
    pub fn new(info: MessageInfo) -> Self {
        Self {
            info,
            parts: Vec::new(),
        }
    }

    pub fn id(&self) -> &str {
        &self.info.id
    }

    /// Look up a part by id.
    pub fn part(&self, part_id: &str) -> Option<&Part> {
        self.parts.iter().find(|p| p.id == part_id)
    }

    /// Concatenated text of all text parts, in part order.
    pub fn text(&self) -> String {
        self.parts
            .iter()
            .filter(|p| p.kind() == PartKind::Text)
            .filter_map(|p| p.text_content())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::MessageRole;
    use serde_json::json;

    #[test]
    fn test_entry_text_skips_non_text_parts() {
        let mut entry = ConversationEntry::new(MessageInfo::new("m1", "s1", MessageRole::Assistant));
        entry.parts.push(Part::text("p1", "m1", "Hello, "));
        entry
            .parts
            .push(Part::new("p2", "m1", "reasoning").with_field("text", json!("thinking...")));
        entry.parts.push(Part::text("p3", "m1", "world"));

        assert_eq!(entry.text(), "Hello, world");
        assert_eq!(entry.part("p2").map(|p| p.kind()), Some(PartKind::Reasoning));
        assert!(entry.part("missing").is_none());
    }

    #[test]
    fn test_entry_deserialize_without_parts() {
        let entry: ConversationEntry = serde_json::from_value(json!({
            "info": {"id": "m1", "sessionID": "s1", "role": "user"}
        }))
        .unwrap();
        assert_eq!(entry.id(), "m1");
        assert!(entry.parts.is_empty());
    }
}
