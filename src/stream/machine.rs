//! Reconnect state machine for the event feed.
//!
//! `ConnectionMachine` owns every piece of connection bookkeeping and never
//! touches the network or the clock. Each input returns the [`Action`]s the
//! caller must carry out, in order. The async side lives in
//! [`manager`](super::manager).
//!
//! Every subscription and every reconnect timer is tagged with the
//! generation that created it. Signals carrying an older generation are
//! dropped, so a task that outlived a disconnect or a rescope cannot act on
//! the new scope.

use std::time::Duration;

use chrono::Utc;
use tracing::{debug, info, warn};

use crate::error::StreamError;
use crate::events::{classify, is_event_for_session, FeedEvent};
use crate::sse::{decode_frame, SseFrame};

use super::config::StreamConfig;
use super::state::{ConnectionPhase, ConnectionState};

/// What the consumer receives, in transport order.
#[derive(Debug, Clone, PartialEq)]
pub enum StreamUpdate {
    /// A subscription opened.
    Connected,
    /// The subscription closed. `error` is `None` for an intentional close.
    Disconnected { error: Option<StreamError> },
    /// An event that passed the session filter.
    Event(FeedEvent),
}

/// Side effects requested by the machine.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// Open a subscription tagged with `generation`.
    Open { generation: u64 },
    /// Drop the live subscription.
    Close,
    /// Call [`ConnectionMachine::on_reconnect_due`] with `generation` after `delay`.
    ScheduleReconnect { generation: u64, delay: Duration },
    /// Drop the pending reconnect timer.
    CancelReconnect,
    /// Deliver an update to the consumer.
    Emit(StreamUpdate),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Subscription {
    None,
    Opening,
    Open,
}

/// Connection bookkeeping for one feed.
#[derive(Debug)]
pub struct ConnectionMachine {
    config: StreamConfig,
    session_filter: Option<String>,
    state: ConnectionState,
    generation: u64,
    subscription: Subscription,
    /// Generation of the armed reconnect timer
    pending_reconnect: Option<u64>,
    stopped: bool,
}

impl ConnectionMachine {
    pub fn new(config: StreamConfig, session_filter: Option<String>) -> Self {
        Self {
            config,
            session_filter,
            state: ConnectionState::default(),
            generation: 0,
            subscription: Subscription::None,
            pending_reconnect: None,
            stopped: false,
        }
    }

    pub fn state(&self) -> &ConnectionState {
        &self.state
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn session_filter(&self) -> Option<&str> {
        self.session_filter.as_deref()
    }

    /// Open a subscription unless one is already open, the manager was
    /// stopped, or the retry budget is spent.
    pub fn connect(&mut self) -> Vec<Action> {
        if self.stopped {
            debug!("connect() ignored: manager stopped until rearmed");
            return Vec::new();
        }
        if self.subscription != Subscription::None {
            debug!("connect() ignored: subscription already {:?}", self.subscription);
            return Vec::new();
        }
        if self.state.failed_attempts >= self.config.max_retries {
            self.state.has_exceeded_retries = true;
            self.state.phase = ConnectionPhase::Exceeded;
            debug!(
                "connect() ignored: {} failed attempts, retry budget spent",
                self.state.failed_attempts
            );
            return Vec::new();
        }

        let mut actions = Vec::new();
        if self.pending_reconnect.take().is_some() {
            actions.push(Action::CancelReconnect);
        }

        self.generation += 1;
        self.subscription = Subscription::Opening;
        self.state.phase = ConnectionPhase::Connecting;
        actions.push(Action::Open {
            generation: self.generation,
        });
        actions
    }

    /// The subscription tagged `generation` opened.
    pub fn on_open(&mut self, generation: u64) -> Vec<Action> {
        if !self.is_current(generation) || self.subscription != Subscription::Opening {
            return Vec::new();
        }

        info!("Event feed connected (generation {})", generation);
        self.subscription = Subscription::Open;
        self.state.connected = true;
        self.state.error = None;
        self.state.phase = ConnectionPhase::Connected;
        vec![Action::Emit(StreamUpdate::Connected)]
    }

    /// One frame arrived on the subscription tagged `generation`.
    ///
    /// Undecodable frames are logged and dropped without touching the state.
    pub fn on_frame(&mut self, generation: u64, frame: &SseFrame) -> Vec<Action> {
        if !self.is_current(generation) || self.subscription != Subscription::Open {
            return Vec::new();
        }

        let raw = match decode_frame(frame) {
            Ok(raw) => raw,
            Err(e) => {
                warn!("Discarding undecodable frame: {} - {}", e, frame.data);
                return Vec::new();
            }
        };

        self.state.last_event_at = Some(Utc::now());
        if self.state.failed_attempts > 0 {
            debug!(
                "First event after {} failure(s), resetting retry budget",
                self.state.failed_attempts
            );
            self.state.failed_attempts = 0;
            self.state.has_exceeded_retries = false;
        }

        if !is_event_for_session(&raw, self.session_filter.as_deref()) {
            return Vec::new();
        }

        vec![Action::Emit(StreamUpdate::Event(classify(raw)))]
    }

    /// The subscription tagged `generation` failed or ended.
    pub fn on_failure(&mut self, generation: u64, error: StreamError) -> Vec<Action> {
        if !self.is_current(generation) || self.subscription == Subscription::None {
            return Vec::new();
        }

        self.subscription = Subscription::None;
        self.state.connected = false;
        self.state.failed_attempts += 1;
        self.state.error = Some(error.clone());

        let mut actions = vec![
            Action::Close,
            Action::Emit(StreamUpdate::Disconnected { error: Some(error) }),
        ];

        if self.config.auto_reconnect && self.state.failed_attempts < self.config.max_retries {
            warn!(
                "Event feed failed (attempt {} of {}), reconnecting in {:?}",
                self.state.failed_attempts, self.config.max_retries, self.config.reconnect_delay
            );
            self.pending_reconnect = Some(generation);
            self.state.phase = ConnectionPhase::Reconnecting;
            actions.push(Action::ScheduleReconnect {
                generation,
                delay: self.config.reconnect_delay,
            });
        } else {
            warn!(
                "Event feed failed {} time(s), not reconnecting",
                self.state.failed_attempts
            );
            self.state.has_exceeded_retries = true;
            self.state.phase = if self.state.failed_attempts >= self.config.max_retries {
                ConnectionPhase::Exceeded
            } else {
                ConnectionPhase::Idle
            };
        }

        actions
    }

    /// The reconnect timer armed for `generation` fired.
    pub fn on_reconnect_due(&mut self, generation: u64) -> Vec<Action> {
        if self.pending_reconnect != Some(generation) {
            debug!("Ignoring stale reconnect timer (generation {})", generation);
            return Vec::new();
        }
        self.pending_reconnect = None;
        self.connect()
    }

    /// Intentional stop. Later `connect()` calls are ignored until
    /// [`rearm`](Self::rearm) or [`rescope`](Self::rescope).
    pub fn disconnect(&mut self) -> Vec<Action> {
        let actions = self.teardown();
        self.stopped = true;
        self.state.phase = ConnectionPhase::Stopped;
        info!("Event feed stopped");
        actions
    }

    /// Allow `connect()` again after a [`disconnect`](Self::disconnect).
    pub fn rearm(&mut self) {
        self.stopped = false;
        if self.state.phase == ConnectionPhase::Stopped {
            self.state.phase = ConnectionPhase::Idle;
        }
    }

    /// Clear the retry budget so the next `connect()` opens again.
    pub fn reset_retries(&mut self) {
        self.state.failed_attempts = 0;
        self.state.has_exceeded_retries = false;
        if self.state.phase == ConnectionPhase::Exceeded {
            self.state.phase = ConnectionPhase::Idle;
        }
    }

    /// Tear everything down and reconnect for a new session filter.
    ///
    /// A scope change is not a failure: the retry budget starts over.
    pub fn rescope(&mut self, session_filter: Option<String>) -> Vec<Action> {
        let mut actions = self.teardown();

        self.session_filter = session_filter;
        self.stopped = false;
        self.state = ConnectionState::default();

        actions.extend(self.connect());
        actions
    }

    /// Cancel the timer, close the subscription and invalidate every signal
    /// already in flight.
    fn teardown(&mut self) -> Vec<Action> {
        let mut actions = Vec::new();
        if self.pending_reconnect.take().is_some() {
            actions.push(Action::CancelReconnect);
        }
        if self.subscription != Subscription::None {
            actions.push(Action::Close);
        }

        let was_connected = self.state.connected;
        self.subscription = Subscription::None;
        self.state.connected = false;
        self.generation += 1;

        if was_connected {
            actions.push(Action::Emit(StreamUpdate::Disconnected { error: None }));
        }
        actions
    }

    fn is_current(&self, generation: u64) -> bool {
        if generation != self.generation {
            debug!(
                "Ignoring signal from generation {} (current {})",
                generation, self.generation
            );
            return false;
        }
        true
    }
}
