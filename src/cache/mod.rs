//! Conversation cache module
//!
//! Holds the ordered message list for one session scope and merges feed
//! events into it. The pure merge functions live in [`merge`]; event
//! application with scope and activity tracking lives in `apply`.

mod apply;
pub mod merge;

use crate::models::{ConversationEntry, SessionActivity, SessionInfo};

pub use merge::{apply_event, remove_message, upsert_message, upsert_message_part};

/// Local cache for one session scope.
///
/// With a scope set, events that definitely belong to another session are
/// ignored. Without one, every message event is merged into a single list.
#[derive(Debug, Default)]
pub struct SessionCache {
    /// Session this cache is scoped to
    pub(crate) scope: Option<String>,
    /// Entries in first-seen order
    pub(crate) entries: Vec<ConversationEntry>,
    /// Latest known activity of the scoped session
    pub(crate) activity: SessionActivity,
    /// Latest `session.updated` payload for the scoped session
    pub(crate) session: Option<SessionInfo>,
    /// Bumped on every change, for cheap "did anything happen" checks
    pub(crate) version: u64,
}

impl SessionCache {
    /// Create an empty cache for a scope.
    pub fn new(scope: Option<String>) -> Self {
        Self {
            scope,
            ..Self::default()
        }
    }

    pub fn scope(&self) -> Option<&str> {
        self.scope.as_deref()
    }

    /// Entries in the order the feed first delivered them.
    pub fn entries(&self) -> &[ConversationEntry] {
        &self.entries
    }

    /// Look up an entry by message id.
    pub fn entry(&self, message_id: &str) -> Option<&ConversationEntry> {
        self.entries.iter().find(|e| e.info.id == message_id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn activity(&self) -> &SessionActivity {
        &self.activity
    }

    pub fn session(&self) -> Option<&SessionInfo> {
        self.session.as_ref()
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    /// Switch to another scope. The old contents are discarded wholesale.
    pub fn rescope(&mut self, scope: Option<String>) {
        self.scope = scope;
        self.entries.clear();
        self.activity = SessionActivity::Idle;
        self.session = None;
        self.version += 1;
    }

    /// Replace all entries, e.g. with the result of a full refetch.
    pub fn replace_all(&mut self, entries: Vec<ConversationEntry>) {
        self.entries = entries;
        self.version += 1;
    }
}
