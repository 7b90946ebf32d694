//! Type discrimination and session resolution for feed events.
//!
//! Everything here is a pure function of the event. Nothing panics and
//! nothing returns an error: a payload we cannot make sense of is reported
//! as [`FeedEvent::Unhandled`] and logged at debug level.

use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

use super::{EventKind, FeedEvent, RawEvent};
use crate::models::{MessageInfo, Part, SessionInfo};

/// Resolve the session an event belongs to.
///
/// Checked in order: `properties.info.sessionID` (message events),
/// `properties.part.sessionID` (part events), `properties.sessionID`.
/// An empty id counts as absent. `None` means the event is global, e.g.
/// `server.connected`.
pub fn session_id_of(event: &RawEvent) -> Option<&str> {
    let props = &event.properties;
    let present = |id: &&str| !id.is_empty();
    nested_str(props, "info", "sessionID")
        .filter(present)
        .or_else(|| nested_str(props, "part", "sessionID").filter(present))
        .or_else(|| props.get("sessionID").and_then(Value::as_str).filter(present))
}

/// Session filter applied before an event reaches the consumer.
///
/// Passes when no filter is set, when the event has no session (global
/// events always pass), or when the session matches. Only a definite
/// mismatch is rejected.
pub fn is_event_for_session(event: &RawEvent, filter: Option<&str>) -> bool {
    let Some(wanted) = filter else {
        return true;
    };
    match session_id_of(event) {
        None => true,
        Some(session_id) => session_id == wanted,
    }
}

/// Message metadata from a `message.updated` event.
pub fn get_message_info(event: &RawEvent) -> Option<MessageInfo> {
    if event.kind() != EventKind::MessageUpdated {
        return None;
    }
    decode_field(&event.properties, "info")
}

/// Part state from a `message.part.updated` event.
pub fn get_part_info(event: &RawEvent) -> Option<Part> {
    if event.kind() != EventKind::MessagePartUpdated {
        return None;
    }
    decode_field(&event.properties, "part")
}

/// Classify a raw event into a [`FeedEvent`].
pub fn classify(event: RawEvent) -> FeedEvent {
    let classified = match event.kind() {
        EventKind::MessageUpdated => {
            get_message_info(&event).map(|info| FeedEvent::MessageUpdated { info })
        }
        EventKind::MessagePartUpdated => get_part_info(&event).map(|part| {
            let delta = event
                .properties
                .get("delta")
                .and_then(Value::as_str)
                .map(str::to_string);
            FeedEvent::MessagePartUpdated { part, delta }
        }),
        EventKind::MessageRemoved => event
            .properties
            .get("messageID")
            .and_then(Value::as_str)
            .map(|message_id| FeedEvent::MessageRemoved {
                session_id: owned_str(&event.properties, "sessionID"),
                message_id: message_id.to_string(),
            }),
        EventKind::SessionIdle => {
            owned_str(&event.properties, "sessionID").map(|session_id| FeedEvent::SessionIdle {
                session_id,
            })
        }
        EventKind::SessionError => Some(FeedEvent::SessionError {
            session_id: owned_str(&event.properties, "sessionID"),
            error: event.properties.get("error").and_then(error_message),
        }),
        EventKind::SessionUpdated => decode_field::<SessionInfo>(&event.properties, "info")
            .map(|info| FeedEvent::SessionUpdated { info }),
        EventKind::ServerConnected => Some(FeedEvent::ServerConnected),
        EventKind::Unhandled => None,
    };

    match classified {
        Some(feed_event) => feed_event,
        None => {
            if event.kind() != EventKind::Unhandled {
                debug!(
                    "Malformed '{}' event treated as unhandled: {}",
                    event.event_type, event.properties
                );
            }
            FeedEvent::Unhandled {
                event_type: event.event_type,
                properties: event.properties,
            }
        }
    }
}

fn nested_str<'a>(props: &'a Value, outer: &str, key: &str) -> Option<&'a str> {
    props.get(outer)?.get(key)?.as_str()
}

fn owned_str(props: &Value, key: &str) -> Option<String> {
    props.get(key).and_then(Value::as_str).map(str::to_string)
}

fn decode_field<T: DeserializeOwned>(props: &Value, key: &str) -> Option<T> {
    let value = props.get(key)?;
    match T::deserialize(value) {
        Ok(decoded) => Some(decoded),
        Err(e) => {
            debug!("Failed to decode '{}': {}", key, e);
            None
        }
    }
}

/// Session errors arrive either as a plain string or as a structured
/// `{name, data: {message}}` object.
fn error_message(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(message) => Some(message.clone()),
        Value::Object(map) => map
            .get("data")
            .and_then(|data| data.get("message"))
            .or_else(|| map.get("message"))
            .or_else(|| map.get("name"))
            .and_then(Value::as_str)
            .map(str::to_string),
        other => Some(other.to_string()),
    }
}
