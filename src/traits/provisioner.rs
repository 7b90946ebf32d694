//! Seams for the side effects triggered by the event feed.
//!
//! The bootstrap coordinator provisions a default session when the server
//! announces itself, then asks for the cache to be rebuilt from scratch.
//! Both effects belong to external collaborators, so they are traits here.

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::error::FeedResult;
use crate::models::{ConversationEntry, SessionInfo};

/// Creates and lists sessions on the agent service.
///
/// # Example
///
/// ```ignore
/// use session_feed::traits::SessionProvisioner;
///
/// async fn bootstrap<P: SessionProvisioner>(p: &P) -> FeedResult<String> {
///     let session = p.create_session(Some("/work/repo")).await?;
///     Ok(session.id)
/// }
/// ```
#[async_trait]
pub trait SessionProvisioner: Send + Sync {
    /// Create a session, optionally bound to a workspace directory.
    async fn create_session(&self, workspace: Option<&str>) -> FeedResult<SessionInfo>;

    /// Fetch the full ordered message history of a session.
    async fn list_messages(&self, session_id: &str) -> FeedResult<Vec<ConversationEntry>>;
}

/// Why a full refetch was requested.
#[derive(Debug, Clone, PartialEq)]
pub enum RefetchReason {
    /// A default session was provisioned after `server.connected`.
    Provisioned { session_id: String },
    /// Explicit request from the consumer.
    Manual,
}

/// Receives requests to invalidate the cache and reload it in full.
pub trait RefetchTrigger: Send + Sync {
    /// Request a refetch. Must not block.
    fn request_refetch(&self, reason: RefetchReason);
}

impl RefetchTrigger for mpsc::UnboundedSender<RefetchReason> {
    fn request_refetch(&self, reason: RefetchReason) {
        // The receiver being gone just means nobody cares anymore
        let _ = self.send(reason);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unbounded_sender_as_trigger() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        tx.request_refetch(RefetchReason::Manual);
        tx.request_refetch(RefetchReason::Provisioned {
            session_id: "ses_1".to_string(),
        });

        assert_eq!(rx.try_recv().unwrap(), RefetchReason::Manual);
        assert_eq!(
            rx.try_recv().unwrap(),
            RefetchReason::Provisioned {
                session_id: "ses_1".to_string()
            }
        );
    }

    #[test]
    fn test_trigger_with_dropped_receiver_does_not_panic() {
        let (tx, rx) = mpsc::unbounded_channel::<RefetchReason>();
        drop(rx);
        tx.request_refetch(RefetchReason::Manual);
    }
}
