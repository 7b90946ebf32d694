//! Error category classification.
//!
//! Categories drive two decisions: whether a failure is worth retrying and
//! what kind of hint to show next to it.

use std::fmt;

/// High-level categorization of errors for handling decisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Connection, DNS, timeout, dropped stream.
    /// Generally transient and retryable.
    Network,

    /// Agent service errors (HTTP 5xx, server closed the feed).
    /// Generally transient and retryable after delay.
    Server,

    /// Malformed payloads or invalid local state. Not retryable.
    Client,

    /// Missing or invalid settings (bad URL, bad env value).
    /// Not retryable until configuration is corrected.
    Configuration,
}

impl ErrorCategory {
    /// Returns true if errors in this category are generally transient.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ErrorCategory::Network | ErrorCategory::Server)
    }

    /// Short label suitable for logging.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCategory::Network => "network",
            ErrorCategory::Server => "server",
            ErrorCategory::Client => "client",
            ErrorCategory::Configuration => "configuration",
        }
    }

    /// Suggested recovery action for this category.
    pub fn recovery_hint(&self) -> &'static str {
        match self {
            ErrorCategory::Network => "Check that the agent service is reachable and try again",
            ErrorCategory::Server => "The agent service may be restarting. Try again shortly",
            ErrorCategory::Client => "The agent service sent data this client cannot read",
            ErrorCategory::Configuration => "Check the feed URL and SESSION_FEED_* settings",
        }
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
