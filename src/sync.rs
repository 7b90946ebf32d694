//! Glue between the event feed, the cache and bootstrap.
//!
//! [`ConversationSync`] drains the stream manager's updates in delivery
//! order, merges events into a [`SessionCache`], hands `server.connected`
//! to the [`BootstrapCoordinator`] and serves refetch requests by replacing
//! the cache with the server's full history.

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::bootstrap::{BootstrapCoordinator, BootstrapOutcome};
use crate::cache::SessionCache;
use crate::error::{FeedError, FeedResult, StreamError};
use crate::events::FeedEvent;
use crate::stream::{StreamHandle, StreamScope, StreamUpdate};
use crate::traits::{RefetchReason, SessionProvisioner};

/// Builds the feed URL for a workspace.
pub type FeedUrlFn = dyn Fn(Option<&str>) -> String + Send + Sync;

/// Keeps one [`SessionCache`] in step with the event feed.
pub struct ConversationSync {
    stream: StreamHandle,
    cache: SessionCache,
    bootstrap: BootstrapCoordinator,
    provisioner: Arc<dyn SessionProvisioner>,
    refetch_rx: mpsc::UnboundedReceiver<RefetchReason>,
    feed_url: Arc<FeedUrlFn>,
    /// Set after the first successful open, so later opens count as reconnects
    seen_connection: bool,
}

impl ConversationSync {
    /// Wrap a running stream. The cache and bootstrap take their scope from
    /// the stream's current scope.
    pub fn new(
        stream: StreamHandle,
        provisioner: Arc<dyn SessionProvisioner>,
        feed_url: impl Fn(Option<&str>) -> String + Send + Sync + 'static,
    ) -> Self {
        let (refetch_tx, refetch_rx) = mpsc::unbounded_channel();
        let scope = stream.scope().clone();

        Self {
            cache: SessionCache::new(scope.session_id),
            bootstrap: BootstrapCoordinator::new(provisioner.clone(), refetch_tx, scope.workspace),
            stream,
            provisioner,
            refetch_rx,
            feed_url: Arc::new(feed_url),
            seen_connection: false,
        }
    }

    pub fn cache(&self) -> &SessionCache {
        &self.cache
    }

    pub fn stream(&self) -> &StreamHandle {
        &self.stream
    }

    pub fn bootstrap(&self) -> &BootstrapCoordinator {
        &self.bootstrap
    }

    /// Explicit user retry of default session provisioning.
    pub async fn retry_bootstrap(&mut self) -> BootstrapOutcome {
        self.bootstrap.retry().await
    }

    /// Process one update or refetch request.
    ///
    /// Returns whether the cache changed, or `None` once the stream manager
    /// has shut down and every update was consumed.
    pub async fn run_once(&mut self) -> Option<bool> {
        tokio::select! {
            biased;

            Some(reason) = self.refetch_rx.recv() => Some(self.handle_refetch(reason).await),
            update = self.stream.recv() => match update {
                Some(update) => Some(self.handle_update(update).await),
                None => None,
            },
        }
    }

    /// Process updates until the stream manager shuts down.
    pub async fn run(&mut self) {
        while self.run_once().await.is_some() {}
        debug!("Conversation sync finished");
    }

    /// Process updates until the stream manager shuts down or gives up,
    /// handing the cache to `on_change` after every change.
    ///
    /// Giving up is returned as the last stream error. Steps are never
    /// interrupted, so connection state is only checked between them; to
    /// stop early, run this in its own task and abort the task.
    pub async fn follow<F>(&mut self, mut on_change: F) -> FeedResult<()>
    where
        F: FnMut(&SessionCache),
    {
        let mut state_rx = self.stream.state_receiver();
        let mut phase = state_rx.borrow().phase;

        while let Some(changed) = self.run_once().await {
            if changed {
                on_change(&self.cache);
            }

            if !state_rx.has_changed().unwrap_or(false) {
                continue;
            }
            let state = state_rx.borrow_and_update().clone();
            if state.phase != phase {
                info!("Feed {}", state.status_line());
                phase = state.phase;
            }
            if state.gave_up() {
                let error = state.error.unwrap_or(StreamError::ServerClosed);
                return Err(FeedError::Stream(error));
            }
        }

        debug!("Conversation sync finished");
        Ok(())
    }

    /// Follow another session in the same workspace.
    ///
    /// The cache is dropped and reloaded, and the feed reconnects with the
    /// new filter.
    pub async fn set_session(&mut self, session_id: Option<String>) -> FeedResult<()> {
        info!("Switching to session {:?}", session_id);
        let scope = StreamScope {
            session_id: session_id.clone(),
            ..self.stream.scope().clone()
        };

        self.cache.rescope(session_id);
        self.stream.rescope(scope);
        // The refetch below covers the rescoped feed's first open
        self.seen_connection = false;
        self.refetch().await
    }

    /// Follow another workspace. The session is cleared and the bootstrap
    /// latch released, so the next `server.connected` provisions again.
    pub fn set_workspace(&mut self, workspace: Option<String>) {
        info!("Switching to workspace {:?}", workspace);
        let scope = StreamScope {
            url: (self.feed_url)(workspace.as_deref()),
            workspace: workspace.clone(),
            session_id: None,
        };

        self.bootstrap.reset_for_workspace(workspace);
        self.cache.rescope(None);
        self.stream.rescope(scope);
        self.seen_connection = false;
    }

    /// Replace the cache with the full history of the scoped session.
    pub async fn refetch(&mut self) -> FeedResult<()> {
        let Some(session_id) = self.cache.scope().map(str::to_string) else {
            debug!("Refetch skipped: no session selected");
            return Ok(());
        };

        let entries = self.provisioner.list_messages(&session_id).await?;
        info!(
            "Refetched {} message(s) for session {}",
            entries.len(),
            session_id
        );
        // The scope may have moved while the request was in flight
        if self.cache.scope() == Some(session_id.as_str()) {
            self.cache.replace_all(entries);
        }
        Ok(())
    }

    async fn handle_update(&mut self, update: StreamUpdate) -> bool {
        match update {
            StreamUpdate::Connected => {
                let reconnected = self.seen_connection;
                self.seen_connection = true;
                if reconnected {
                    // Events sent while we were away are not replayed
                    return self.refetch_logged().await;
                }
                false
            }
            StreamUpdate::Disconnected { error } => {
                if let Some(error) = error {
                    debug!("Feed disconnected: {}", error.user_message());
                }
                false
            }
            StreamUpdate::Event(event) => {
                let changed = self.cache.apply(&event);
                if matches!(event, FeedEvent::ServerConnected) {
                    self.bootstrap.handle_event(&event).await;
                }
                changed
            }
        }
    }

    async fn handle_refetch(&mut self, reason: RefetchReason) -> bool {
        match reason {
            RefetchReason::Provisioned { session_id } if self.cache.scope().is_none() => {
                let before = self.cache.version();
                if let Err(e) = self.set_session(Some(session_id)).await {
                    warn!("Refetch after provisioning failed: {}", e);
                }
                self.cache.version() != before
            }
            RefetchReason::Provisioned { .. } | RefetchReason::Manual => {
                self.refetch_logged().await
            }
        }
    }

    async fn refetch_logged(&mut self) -> bool {
        let before = self.cache.version();
        if let Err(e) = self.refetch().await {
            warn!("Refetch failed [{}]: {}", e.error_code(), e);
        }
        self.cache.version() != before
    }
}

impl std::fmt::Debug for ConversationSync {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConversationSync")
            .field("scope", self.stream.scope())
            .field("cache_len", &self.cache.len())
            .field("bootstrap", &self.bootstrap)
            .finish_non_exhaustive()
    }
}
