//! Merge operations over an ordered list of conversation entries.
//!
//! The public functions are pure: they take a slice and return a new vector.
//! Each has an in-place twin used by [`SessionCache`](super::SessionCache)
//! that reports whether anything changed. Every operation is idempotent and
//! never reorders existing entries or parts; only an append creates a new
//! position.

use tracing::trace;

use crate::events::FeedEvent;
use crate::models::{ConversationEntry, MessageInfo, Part};

/// Replace the entry's `info` in place, or append `{ info, parts: [] }`.
pub fn upsert_message(cache: &[ConversationEntry], message: MessageInfo) -> Vec<ConversationEntry> {
    let mut next = cache.to_vec();
    upsert_message_in_place(&mut next, message);
    next
}

/// Replace the part with the same id in place, or append it to its message.
///
/// A part whose message is not in the cache is dropped.
pub fn upsert_message_part(cache: &[ConversationEntry], part: Part) -> Vec<ConversationEntry> {
    let mut next = cache.to_vec();
    upsert_message_part_in_place(&mut next, part);
    next
}

/// Drop the entry with this id, if any.
pub fn remove_message(cache: &[ConversationEntry], message_id: &str) -> Vec<ConversationEntry> {
    let mut next = cache.to_vec();
    remove_message_in_place(&mut next, message_id);
    next
}

/// Apply one classified event. Events that do not touch messages leave the
/// cache unchanged.
pub fn apply_event(cache: &[ConversationEntry], event: &FeedEvent) -> Vec<ConversationEntry> {
    let mut next = cache.to_vec();
    apply_event_in_place(&mut next, event);
    next
}

pub(crate) fn upsert_message_in_place(cache: &mut Vec<ConversationEntry>, message: MessageInfo) -> bool {
    match cache.iter_mut().find(|entry| entry.info.id == message.id) {
        Some(entry) if entry.info == message => false,
        Some(entry) => {
            entry.info = message;
            true
        }
        None => {
            cache.push(ConversationEntry::new(message));
            true
        }
    }
}

pub(crate) fn upsert_message_part_in_place(cache: &mut [ConversationEntry], part: Part) -> bool {
    let Some(entry) = cache.iter_mut().find(|entry| entry.info.id == part.message_id) else {
        trace!(
            "Dropping part {} for unknown message {}",
            part.id,
            part.message_id
        );
        return false;
    };

    match entry.parts.iter_mut().find(|existing| existing.id == part.id) {
        Some(existing) if *existing == part => false,
        Some(existing) => {
            *existing = part;
            true
        }
        None => {
            entry.parts.push(part);
            true
        }
    }
}

pub(crate) fn remove_message_in_place(cache: &mut Vec<ConversationEntry>, message_id: &str) -> bool {
    let before = cache.len();
    cache.retain(|entry| entry.info.id != message_id);
    cache.len() != before
}

pub(crate) fn apply_event_in_place(cache: &mut Vec<ConversationEntry>, event: &FeedEvent) -> bool {
    match event {
        FeedEvent::MessageUpdated { info } => upsert_message_in_place(cache, info.clone()),
        FeedEvent::MessagePartUpdated { part, .. } => {
            upsert_message_part_in_place(cache, part.clone())
        }
        FeedEvent::MessageRemoved { message_id, .. } => remove_message_in_place(cache, message_id),
        FeedEvent::SessionIdle { .. }
        | FeedEvent::SessionError { .. }
        | FeedEvent::SessionUpdated { .. }
        | FeedEvent::ServerConnected
        | FeedEvent::Unhandled { .. } => false,
    }
}
