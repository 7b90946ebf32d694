//! Mock session provisioner for testing.

use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::error::{FeedError, FeedResult, NetworkError};
use crate::models::{ConversationEntry, SessionInfo};
use crate::traits::SessionProvisioner;

/// In-memory [`SessionProvisioner`] that records every call.
///
/// `create_session` answers from a queue of scripted results; once the queue
/// is empty it creates `ses_mock_<n>` sessions. `list_messages` answers from
/// a per-session table (missing sessions are a 404).
#[derive(Debug, Clone, Default)]
pub struct MockProvisioner {
    create_results: Arc<Mutex<VecDeque<FeedResult<SessionInfo>>>>,
    histories: Arc<Mutex<HashMap<String, Vec<ConversationEntry>>>>,
    create_calls: Arc<Mutex<Vec<Option<String>>>>,
    list_calls: Arc<Mutex<Vec<String>>>,
    create_delay: Arc<Mutex<Option<Duration>>>,
}

impl MockProvisioner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue the result of the next `create_session` call.
    pub fn push_create_result(&self, result: FeedResult<SessionInfo>) {
        self.create_results.lock().unwrap().push_back(result);
    }

    /// Make the next `create_session` call fail with a server error.
    pub fn fail_next_create(&self) {
        self.push_create_result(Err(FeedError::Network(NetworkError::HttpStatus {
            status: 500,
            message: "provisioning failed".to_string(),
        })));
    }

    /// Make every `create_session` call take `delay` before answering.
    pub fn set_create_delay(&self, delay: Duration) {
        *self.create_delay.lock().unwrap() = Some(delay);
    }

    /// Set the history returned for a session.
    pub fn set_history(&self, session_id: &str, entries: Vec<ConversationEntry>) {
        self.histories
            .lock()
            .unwrap()
            .insert(session_id.to_string(), entries);
    }

    /// Workspaces passed to `create_session`, in call order.
    pub fn create_calls(&self) -> Vec<Option<String>> {
        self.create_calls.lock().unwrap().clone()
    }

    /// Number of `create_session` calls.
    pub fn create_count(&self) -> usize {
        self.create_calls.lock().unwrap().len()
    }

    /// Session ids passed to `list_messages`, in call order.
    pub fn list_calls(&self) -> Vec<String> {
        self.list_calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl SessionProvisioner for MockProvisioner {
    async fn create_session(&self, workspace: Option<&str>) -> FeedResult<SessionInfo> {
        let call_number = {
            let mut calls = self.create_calls.lock().unwrap();
            calls.push(workspace.map(str::to_string));
            calls.len()
        };

        let delay = *self.create_delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        match self.create_results.lock().unwrap().pop_front() {
            Some(result) => result,
            None => {
                let mut session = SessionInfo::new(format!("ses_mock_{}", call_number));
                session.directory = workspace.map(str::to_string);
                Ok(session)
            }
        }
    }

    async fn list_messages(&self, session_id: &str) -> FeedResult<Vec<ConversationEntry>> {
        self.list_calls.lock().unwrap().push(session_id.to_string());

        self.histories
            .lock()
            .unwrap()
            .get(session_id)
            .cloned()
            .ok_or_else(|| {
                FeedError::Network(NetworkError::HttpStatus {
                    status: 404,
                    message: format!("session {} not found", session_id),
                })
            })
    }
}
