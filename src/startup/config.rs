//! Runtime configuration for the feed.
//!
//! Defaults, then environment, then command-line flags, each layer
//! overriding the last.

use std::time::Duration;

use crate::api::DEFAULT_BASE_URL;
use crate::error::{FeedError, FeedResult};
use crate::stream::StreamConfig;

pub const ENV_URL: &str = "SESSION_FEED_URL";
pub const ENV_WORKSPACE: &str = "SESSION_FEED_WORKSPACE";
pub const ENV_SESSION: &str = "SESSION_FEED_SESSION";
pub const ENV_RECONNECT_MS: &str = "SESSION_FEED_RECONNECT_MS";
pub const ENV_MAX_RETRIES: &str = "SESSION_FEED_MAX_RETRIES";
pub const ENV_NO_RECONNECT: &str = "SESSION_FEED_NO_RECONNECT";

/// Configuration for a feed session.
///
/// # Example
///
/// ```ignore
/// use session_feed::startup::FeedConfig;
///
/// let config = FeedConfig::from_env()?
///     .with_workspace("/work/repo")
///     .with_max_retries(5);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct FeedConfig {
    /// Base URL of the agent service
    pub base_url: String,
    /// Workspace directory the feed is scoped to
    pub workspace: Option<String>,
    /// Session to follow; `None` lets bootstrap pick one
    pub session: Option<String>,
    /// Reconnect policy
    pub stream: StreamConfig,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            workspace: None,
            session: None,
            stream: StreamConfig::default(),
        }
    }
}

impl FeedConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    pub fn with_workspace(mut self, workspace: impl Into<String>) -> Self {
        self.workspace = Some(workspace.into());
        self
    }

    pub fn with_session(mut self, session: impl Into<String>) -> Self {
        self.session = Some(session.into());
        self
    }

    pub fn with_auto_reconnect(mut self, enabled: bool) -> Self {
        self.stream = self.stream.with_auto_reconnect(enabled);
        self
    }

    pub fn with_reconnect_delay(mut self, delay: Duration) -> Self {
        self.stream = self.stream.with_reconnect_delay(delay);
        self
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.stream = self.stream.with_max_retries(max_retries);
        self
    }

    /// Defaults overridden by `SESSION_FEED_*` variables.
    ///
    /// Empty variables are treated as unset. Numbers that do not parse are a
    /// configuration error rather than being silently ignored.
    pub fn from_env() -> FeedResult<Self> {
        let mut config = Self::default();

        if let Some(url) = env_value(ENV_URL) {
            config.base_url = url;
        }
        config.workspace = env_value(ENV_WORKSPACE);
        config.session = env_value(ENV_SESSION);

        if let Some(raw) = env_value(ENV_RECONNECT_MS) {
            let ms: u64 = raw
                .parse()
                .map_err(|_| FeedError::config(ENV_RECONNECT_MS, format!("not a number: {}", raw)))?;
            config = config.with_reconnect_delay(Duration::from_millis(ms));
        }
        if let Some(raw) = env_value(ENV_MAX_RETRIES) {
            let retries: u32 = raw
                .parse()
                .map_err(|_| FeedError::config(ENV_MAX_RETRIES, format!("not a number: {}", raw)))?;
            config = config.with_max_retries(retries);
        }
        if let Some(raw) = env_value(ENV_NO_RECONNECT) {
            let disabled = !matches!(raw.as_str(), "0" | "false" | "no");
            config = config.with_auto_reconnect(!disabled);
        }

        Ok(config)
    }
}

fn env_value(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}
