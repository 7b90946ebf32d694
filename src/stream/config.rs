//! Connection manager configuration.

use std::time::Duration;

/// Default delay between a failure and the next subscription attempt.
pub const DEFAULT_RECONNECT_DELAY: Duration = Duration::from_millis(3000);

/// Default number of consecutive failures before giving up.
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Reconnect policy knobs.
#[derive(Debug, Clone, PartialEq)]
pub struct StreamConfig {
    pub auto_reconnect: bool,
    /// Fixed delay, no backoff
    pub reconnect_delay: Duration,
    pub max_retries: u32,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            auto_reconnect: true,
            reconnect_delay: DEFAULT_RECONNECT_DELAY,
            max_retries: DEFAULT_MAX_RETRIES,
        }
    }
}

impl StreamConfig {
    pub fn with_auto_reconnect(mut self, enabled: bool) -> Self {
        self.auto_reconnect = enabled;
        self
    }

    pub fn with_reconnect_delay(mut self, delay: Duration) -> Self {
        self.reconnect_delay = delay;
        self
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }
}

/// What one subscription is for: the feed URL plus the scope it serves.
#[derive(Debug, Clone, PartialEq)]
pub struct StreamScope {
    /// Full feed URL, including any workspace query
    pub url: String,
    /// Workspace directory the feed is bound to
    pub workspace: Option<String>,
    /// Session filter applied to delivered events
    pub session_id: Option<String>,
}

impl StreamScope {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            workspace: None,
            session_id: None,
        }
    }

    pub fn with_workspace(mut self, workspace: impl Into<String>) -> Self {
        self.workspace = Some(workspace.into());
        self
    }

    pub fn with_session(mut self, session_id: impl Into<String>) -> Self {
        self.session_id = Some(session_id.into());
        self
    }
}
