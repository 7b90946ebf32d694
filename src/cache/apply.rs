//! Event application for SessionCache

use tracing::debug;

use crate::events::FeedEvent;
use crate::models::SessionActivity;

use super::merge::apply_event_in_place;
use super::SessionCache;

impl SessionCache {
    /// Merge one event. Returns true if the cache changed.
    pub fn apply(&mut self, event: &FeedEvent) -> bool {
        if !self.accepts(event) {
            debug!(
                "Ignoring {} for session {:?} outside scope {:?}",
                event.event_type_name(),
                event.session_id(),
                self.scope
            );
            return false;
        }

        let entries_changed = apply_event_in_place(&mut self.entries, event);
        let meta_changed = self.apply_session_state(event);

        let changed = entries_changed || meta_changed;
        if changed {
            self.version += 1;
        }
        changed
    }

    /// True when the event is global or belongs to the scoped session.
    fn accepts(&self, event: &FeedEvent) -> bool {
        match (self.scope.as_deref(), event.session_id()) {
            (Some(scope), Some(session_id)) => scope == session_id,
            _ => true,
        }
    }

    fn apply_session_state(&mut self, event: &FeedEvent) -> bool {
        match event {
            // Only parts that actually landed mean the agent is working
            FeedEvent::MessagePartUpdated { part, .. } => {
                self.entry(&part.message_id).is_some() && self.set_activity(SessionActivity::Busy)
            }
            FeedEvent::SessionIdle { .. } => self.set_activity(SessionActivity::Idle),
            FeedEvent::SessionError { error, .. } => {
                let message = error.clone().unwrap_or_else(|| "unknown error".to_string());
                self.set_activity(SessionActivity::Errored(message))
            }
            FeedEvent::SessionUpdated { info } => {
                let in_scope = self.scope.as_deref().map_or(true, |scope| scope == info.id);
                if !in_scope || self.session.as_ref() == Some(info) {
                    return false;
                }
                self.session = Some(info.clone());
                true
            }
            FeedEvent::MessageUpdated { .. }
            | FeedEvent::MessageRemoved { .. }
            | FeedEvent::ServerConnected
            | FeedEvent::Unhandled { .. } => false,
        }
    }

    fn set_activity(&mut self, activity: SessionActivity) -> bool {
        if self.activity == activity {
            return false;
        }
        self.activity = activity;
        true
    }
}
