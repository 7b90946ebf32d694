//! Default session provisioning on `server.connected`.
//!
//! The first time the server announces itself for a workspace, a session is
//! created and a full refetch is requested. A latch keeps this to once per
//! connection lifetime, across reconnects. It is released only by a
//! workspace change or an explicit retry; a failed provisioning keeps it set.

use std::sync::Arc;

use tracing::{debug, error, info};

use crate::error::FeedError;
use crate::events::FeedEvent;
use crate::models::SessionInfo;
use crate::traits::{RefetchReason, RefetchTrigger, SessionProvisioner};

/// What a call into the coordinator did.
#[derive(Debug, Clone, PartialEq)]
pub enum BootstrapOutcome {
    /// Not a `server.connected` event.
    Ignored,
    /// Latch already set for this workspace.
    AlreadyHandled,
    /// A session was created and a refetch requested.
    Provisioned(SessionInfo),
    /// Provisioning failed. The latch stays set.
    Failed(FeedError),
}

/// Reacts to `server.connected` by provisioning a default session once.
pub struct BootstrapCoordinator {
    provisioner: Arc<dyn SessionProvisioner>,
    trigger: Box<dyn RefetchTrigger>,
    workspace: Option<String>,
    handled: bool,
}

impl BootstrapCoordinator {
    pub fn new(
        provisioner: Arc<dyn SessionProvisioner>,
        trigger: impl RefetchTrigger + 'static,
        workspace: Option<String>,
    ) -> Self {
        Self {
            provisioner,
            trigger: Box::new(trigger),
            workspace,
            handled: false,
        }
    }

    pub fn workspace(&self) -> Option<&str> {
        self.workspace.as_deref()
    }

    /// True once provisioning has been attempted for the current workspace.
    pub fn has_handled(&self) -> bool {
        self.handled
    }

    /// Feed one event. Only `server.connected` does anything.
    pub async fn handle_event(&mut self, event: &FeedEvent) -> BootstrapOutcome {
        if !matches!(event, FeedEvent::ServerConnected) {
            return BootstrapOutcome::Ignored;
        }
        if self.handled {
            debug!("server.connected again, default session already handled");
            return BootstrapOutcome::AlreadyHandled;
        }
        self.provision().await
    }

    /// Release the latch for a new workspace. The next `server.connected`
    /// provisions again.
    pub fn reset_for_workspace(&mut self, workspace: Option<String>) {
        debug!("Bootstrap latch released for workspace {:?}", workspace);
        self.workspace = workspace;
        self.handled = false;
    }

    /// Explicit user retry: release the latch and provision right away.
    pub async fn retry(&mut self) -> BootstrapOutcome {
        self.handled = false;
        self.provision().await
    }

    async fn provision(&mut self) -> BootstrapOutcome {
        // Set before awaiting so a second server.connected cannot race us
        self.handled = true;

        match self
            .provisioner
            .create_session(self.workspace.as_deref())
            .await
        {
            Ok(session) => {
                info!(
                    "Provisioned default session {} for workspace {:?}",
                    session.id, self.workspace
                );
                self.trigger.request_refetch(RefetchReason::Provisioned {
                    session_id: session.id.clone(),
                });
                BootstrapOutcome::Provisioned(session)
            }
            Err(e) => {
                error!(
                    "Failed to provision default session [{}]: {}",
                    e.error_code(),
                    e
                );
                BootstrapOutcome::Failed(e)
            }
        }
    }
}

impl std::fmt::Debug for BootstrapCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BootstrapCoordinator")
            .field("workspace", &self.workspace)
            .field("handled", &self.handled)
            .finish_non_exhaustive()
    }
}
