//! Async driver for [`ConnectionMachine`].
//!
//! `StreamManager::spawn` starts an actor task that owns the machine, the
//! live subscription task and the reconnect timer. The caller talks to it
//! through a [`StreamHandle`]. Dropping the handle shuts the actor down.

use std::sync::Arc;
use std::time::Duration;

use futures_util::StreamExt;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::error::StreamError;
use crate::sse::{frame_stream, SseFrame};
use crate::traits::{Headers, HttpClient};

use super::config::{StreamConfig, StreamScope};
use super::machine::{Action, ConnectionMachine, StreamUpdate};
use super::state::ConnectionState;

/// Requests from the handle to the actor.
#[derive(Debug)]
enum Command {
    Connect,
    Disconnect,
    Rearm,
    ResetRetries,
    Rescope(StreamScope),
    Shutdown,
}

/// Reports from subscription and timer tasks back to the actor.
#[derive(Debug)]
enum Signal {
    Opened { generation: u64 },
    Frame { generation: u64, frame: SseFrame },
    Failed { generation: u64, error: StreamError },
    ReconnectDue { generation: u64 },
}

/// Caller side of a running stream manager.
///
/// Control calls never fail and never block: they queue a command for the
/// actor. Results show up in [`state`](Self::state) and as
/// [`StreamUpdate`]s from [`recv`](Self::recv).
#[derive(Debug)]
pub struct StreamHandle {
    cmd_tx: mpsc::UnboundedSender<Command>,
    state_rx: watch::Receiver<ConnectionState>,
    updates_rx: mpsc::UnboundedReceiver<StreamUpdate>,
    scope: StreamScope,
    task: Option<JoinHandle<()>>,
}

impl StreamHandle {
    /// Open the feed. No-op while connected, stopped, or out of retries.
    pub fn connect(&self) {
        self.send(Command::Connect);
    }

    /// Close the feed and cancel any pending reconnect. `connect` is
    /// ignored afterwards until [`rearm`](Self::rearm).
    pub fn disconnect(&self) {
        self.send(Command::Disconnect);
    }

    /// Allow `connect` again after `disconnect`.
    pub fn rearm(&self) {
        self.send(Command::Rearm);
    }

    /// Clear the retry budget after the manager gave up.
    pub fn reset_retries(&self) {
        self.send(Command::ResetRetries);
    }

    /// Tear down and reconnect for a new scope with a fresh retry budget.
    pub fn rescope(&mut self, scope: StreamScope) {
        self.scope = scope.clone();
        self.send(Command::Rescope(scope));
    }

    /// Scope as of the last `rescope` call.
    pub fn scope(&self) -> &StreamScope {
        &self.scope
    }

    /// Latest published connection state.
    pub fn state(&self) -> ConnectionState {
        self.state_rx.borrow().clone()
    }

    /// Subscribe to connection state changes
    pub fn state_receiver(&self) -> watch::Receiver<ConnectionState> {
        self.state_rx.clone()
    }

    /// Next update in transport order. `None` once the actor has exited and
    /// every queued update was read.
    pub async fn recv(&mut self) -> Option<StreamUpdate> {
        self.updates_rx.recv().await
    }

    /// Next update if one is already queued.
    pub fn try_recv(&mut self) -> Option<StreamUpdate> {
        self.updates_rx.try_recv().ok()
    }

    /// Stop the actor. Any open subscription and pending timer are dropped.
    pub fn shutdown(&self) {
        self.send(Command::Shutdown);
    }

    /// Stop the actor and wait for it to exit.
    pub async fn shutdown_and_wait(mut self) {
        self.shutdown();
        if let Some(task) = self.task.take() {
            let _ = task.await;
        }
    }

    fn send(&self, command: Command) {
        if self.cmd_tx.send(command).is_err() {
            debug!("Stream manager already shut down");
        }
    }
}

impl Drop for StreamHandle {
    fn drop(&mut self) {
        let _ = self.cmd_tx.send(Command::Shutdown);
    }
}

/// Owns the machine and the tasks it asks for.
pub struct StreamManager {
    client: Arc<dyn HttpClient>,
    url: String,
    machine: ConnectionMachine,
    state_tx: watch::Sender<ConnectionState>,
    updates_tx: mpsc::UnboundedSender<StreamUpdate>,
    signal_tx: mpsc::UnboundedSender<Signal>,
    subscription: Option<JoinHandle<()>>,
    reconnect_timer: Option<JoinHandle<()>>,
}

impl StreamManager {
    /// Start a manager for `scope`. Nothing is opened until
    /// [`StreamHandle::connect`].
    pub fn spawn(
        client: Arc<dyn HttpClient>,
        scope: StreamScope,
        config: StreamConfig,
    ) -> StreamHandle {
        let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
        let (signal_tx, signal_rx) = mpsc::unbounded_channel();
        let (updates_tx, updates_rx) = mpsc::unbounded_channel();
        let (state_tx, state_rx) = watch::channel(ConnectionState::default());

        let manager = StreamManager {
            client,
            url: scope.url.clone(),
            machine: ConnectionMachine::new(config, scope.session_id.clone()),
            state_tx,
            updates_tx,
            signal_tx,
            subscription: None,
            reconnect_timer: None,
        };

        let task = tokio::spawn(manager.run(cmd_rx, signal_rx));

        StreamHandle {
            cmd_tx,
            state_rx,
            updates_rx,
            scope,
            task: Some(task),
        }
    }

    async fn run(
        mut self,
        mut cmd_rx: mpsc::UnboundedReceiver<Command>,
        mut signal_rx: mpsc::UnboundedReceiver<Signal>,
    ) {
        loop {
            tokio::select! {
                // Commands first so a disconnect wins over queued frames
                biased;

                command = cmd_rx.recv() => {
                    match command {
                        Some(Command::Shutdown) | None => {
                            debug!("Shutdown requested, closing event feed");
                            let actions = self.machine.disconnect();
                            self.execute(actions);
                            break;
                        }
                        Some(command) => {
                            let actions = self.handle_command(command);
                            self.execute(actions);
                        }
                    }
                }
                Some(signal) = signal_rx.recv() => {
                    let actions = self.handle_signal(signal);
                    self.execute(actions);
                }
            }
        }

        self.abort_subscription();
        self.abort_timer();
        info!("Stream manager stopped");
    }

    fn handle_command(&mut self, command: Command) -> Vec<Action> {
        match command {
            Command::Connect => self.machine.connect(),
            Command::Disconnect => self.machine.disconnect(),
            Command::Rearm => {
                self.machine.rearm();
                Vec::new()
            }
            Command::ResetRetries => {
                self.machine.reset_retries();
                Vec::new()
            }
            Command::Rescope(scope) => {
                info!(
                    "Rescoping event feed to {} (session {:?})",
                    scope.url, scope.session_id
                );
                self.url = scope.url;
                self.machine.rescope(scope.session_id)
            }
            // Handled by the run loop
            Command::Shutdown => Vec::new(),
        }
    }

    fn handle_signal(&mut self, signal: Signal) -> Vec<Action> {
        match signal {
            Signal::Opened { generation } => self.machine.on_open(generation),
            Signal::Frame { generation, frame } => self.machine.on_frame(generation, &frame),
            Signal::Failed { generation, error } => self.machine.on_failure(generation, error),
            Signal::ReconnectDue { generation } => {
                self.reconnect_timer = None;
                self.machine.on_reconnect_due(generation)
            }
        }
    }

    /// Publish the new state, then carry out the actions in order.
    fn execute(&mut self, actions: Vec<Action>) {
        self.state_tx.send_if_modified(|state| {
            let next = self.machine.state();
            if state == next {
                return false;
            }
            *state = next.clone();
            true
        });

        for action in actions {
            match action {
                Action::Open { generation } => self.open(generation),
                Action::Close => self.abort_subscription(),
                Action::ScheduleReconnect { generation, delay } => {
                    self.schedule_reconnect(generation, delay)
                }
                Action::CancelReconnect => self.abort_timer(),
                Action::Emit(update) => {
                    if self.updates_tx.send(update).is_err() {
                        debug!("Update receiver dropped");
                    }
                }
            }
        }
    }

    fn open(&mut self, generation: u64) {
        self.abort_subscription();
        debug!("Opening event feed {} (generation {})", self.url, generation);
        self.subscription = Some(tokio::spawn(run_subscription(
            self.client.clone(),
            self.url.clone(),
            generation,
            self.signal_tx.clone(),
        )));
    }

    fn schedule_reconnect(&mut self, generation: u64, delay: Duration) {
        self.abort_timer();
        let signal_tx = self.signal_tx.clone();
        self.reconnect_timer = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let _ = signal_tx.send(Signal::ReconnectDue { generation });
        }));
    }

    fn abort_subscription(&mut self) {
        if let Some(task) = self.subscription.take() {
            task.abort();
        }
    }

    fn abort_timer(&mut self) {
        if let Some(timer) = self.reconnect_timer.take() {
            timer.abort();
        }
    }
}

/// One subscription: open, relay frames, report how it ended.
async fn run_subscription(
    client: Arc<dyn HttpClient>,
    url: String,
    generation: u64,
    signal_tx: mpsc::UnboundedSender<Signal>,
) {
    let body = match client.get_stream(&url, &Headers::new()).await {
        Ok(body) => body,
        Err(e) => {
            warn!("Failed to open event feed {}: {}", url, e);
            let _ = signal_tx.send(Signal::Failed {
                generation,
                error: StreamError::from(e),
            });
            return;
        }
    };

    if signal_tx.send(Signal::Opened { generation }).is_err() {
        return;
    }

    let mut frames = frame_stream(body);
    while let Some(item) = frames.next().await {
        let signal = match item {
            Ok(frame) => Signal::Frame { generation, frame },
            Err(e) => {
                let _ = signal_tx.send(Signal::Failed {
                    generation,
                    error: StreamError::lost(e),
                });
                return;
            }
        };
        if signal_tx.send(signal).is_err() {
            return;
        }
    }

    debug!("Event feed body ended (generation {})", generation);
    let _ = signal_tx.send(Signal::Failed {
        generation,
        error: StreamError::ServerClosed,
    });
}
