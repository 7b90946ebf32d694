//! Common test utilities for integration tests.
//!
//! Event payload builders in the agent service's wire shape, plus helpers
//! for spawning a stream manager against the mock HTTP client.
//!
//! # Example
//!
//! ```ignore
//! use common::{message_updated, spawn_manager, MockHttpClient, MockStream};
//!
//! let client = MockHttpClient::new();
//! client.push_stream(MockStream::events(&[message_updated("m1", "s1")]));
//! let handle = spawn_manager(&client, Some("s1"), fast_config());
//! ```

#![allow(dead_code)]

pub mod mocks;

pub use mocks::*;

use std::sync::Arc;
use std::time::Duration;

use serde_json::{json, Value};
use session_feed::stream::{StreamConfig, StreamHandle, StreamManager, StreamScope, StreamUpdate};

pub const FEED_URL: &str = "http://agent.test/event";

/// Reconnect delay used by the timer tests.
pub const TEST_DELAY: Duration = Duration::from_millis(100);

pub fn fast_config() -> StreamConfig {
    StreamConfig::default().with_reconnect_delay(TEST_DELAY)
}

pub fn spawn_manager(
    client: &MockHttpClient,
    session: Option<&str>,
    config: StreamConfig,
) -> StreamHandle {
    let mut scope = StreamScope::new(FEED_URL);
    scope.session_id = session.map(str::to_string);
    StreamManager::spawn(Arc::new(client.clone()), scope, config)
}

/// Next update, failing the test if none arrives within a second of
/// (possibly paused) tokio time.
pub async fn next_update(handle: &mut StreamHandle) -> StreamUpdate {
    match tokio::time::timeout(Duration::from_secs(1), handle.recv()).await {
        Ok(Some(update)) => update,
        Ok(None) => panic!("stream manager shut down"),
        Err(_) => panic!("no update within 1s"),
    }
}

/// Let spawned tasks run until everything runnable has settled.
pub async fn settle() {
    for _ in 0..10 {
        tokio::task::yield_now().await;
    }
}

pub fn server_connected() -> Value {
    json!({"type": "server.connected", "properties": {}})
}

pub fn message_updated(id: &str, session: &str) -> Value {
    json!({
        "type": "message.updated",
        "properties": {
            "info": {"id": id, "sessionID": session, "role": "assistant"}
        }
    })
}

pub fn part_updated(id: &str, message_id: &str, session: &str, text: &str) -> Value {
    json!({
        "type": "message.part.updated",
        "properties": {
            "part": {
                "id": id,
                "messageID": message_id,
                "sessionID": session,
                "type": "text",
                "text": text
            }
        }
    })
}

pub fn session_idle(session: &str) -> Value {
    json!({"type": "session.idle", "properties": {"sessionID": session}})
}
