//! Observable connection state.

use chrono::{DateTime, Utc};

use crate::error::StreamError;

/// Where the connection manager is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionPhase {
    /// Not connected and nothing scheduled.
    #[default]
    Idle,
    /// Subscription request in flight.
    Connecting,
    /// Subscription open.
    Connected,
    /// Waiting out the reconnect delay after a failure.
    Reconnecting,
    /// Retry budget spent. Terminal until reset or rescope.
    Exceeded,
    /// Intentionally disconnected. `connect` is ignored until rearmed.
    Stopped,
}

impl ConnectionPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConnectionPhase::Idle => "idle",
            ConnectionPhase::Connecting => "connecting",
            ConnectionPhase::Connected => "connected",
            ConnectionPhase::Reconnecting => "reconnecting",
            ConnectionPhase::Exceeded => "exceeded",
            ConnectionPhase::Stopped => "stopped",
        }
    }
}

impl std::fmt::Display for ConnectionPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Snapshot of the feed connection, published after every transition.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ConnectionState {
    /// Subscription currently open
    pub connected: bool,
    /// Last transport failure, cleared when a subscription opens
    pub error: Option<StreamError>,
    /// Consecutive failures since the last successfully parsed event
    pub failed_attempts: u32,
    /// Set once the manager gave up reconnecting
    pub has_exceeded_retries: bool,
    pub phase: ConnectionPhase,
    /// When the last event was parsed
    pub last_event_at: Option<DateTime<Utc>>,
}

impl ConnectionState {
    /// Retries are used up and nothing is open. Covers a single failure with
    /// auto-reconnect off, which leaves the phase at `Idle`.
    pub fn gave_up(&self) -> bool {
        self.has_exceeded_retries && !self.connected
    }

    /// One-line status for logs and status bars.
    pub fn status_line(&self) -> String {
        match (&self.phase, &self.error) {
            (ConnectionPhase::Reconnecting, Some(err)) => format!(
                "reconnecting after {} failure(s): {}",
                self.failed_attempts, err
            ),
            (ConnectionPhase::Exceeded, _) => {
                format!("offline after {} failed attempts", self.failed_attempts)
            }
            (phase, _) => phase.to_string(),
        }
    }
}
