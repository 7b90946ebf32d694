//! Mock implementations for test fixtures.
//!
//! This module re-exports the mock implementations from
//! `session_feed::adapters::mock` and adds a recording refetch trigger.

#![allow(dead_code)]

pub use session_feed::adapters::mock::{
    sse_frame, LiveFeed, MockHttpClient, MockProvisioner, MockResponse, MockStream,
};
pub use session_feed::traits::{HttpError, RefetchReason, RefetchTrigger};

use std::sync::{Arc, Mutex};

/// [`RefetchTrigger`] that remembers every request.
#[derive(Debug, Clone, Default)]
pub struct RecordingTrigger {
    requests: Arc<Mutex<Vec<RefetchReason>>>,
}

impl RecordingTrigger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn requests(&self) -> Vec<RefetchReason> {
        self.requests.lock().unwrap().clone()
    }

    pub fn count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

impl RefetchTrigger for RecordingTrigger {
    fn request_refetch(&self, reason: RefetchReason) {
        self.requests.lock().unwrap().push(reason);
    }
}

/// A feed that refuses every one of the next `n` subscriptions.
pub fn refuse_streams(client: &MockHttpClient, n: usize) {
    for _ in 0..n {
        client.push_stream(MockStream::Fail(HttpError::ConnectionFailed(
            "connection refused".to_string(),
        )));
    }
}
