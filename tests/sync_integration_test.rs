//! End-to-end: feed frames through the manager into the cache.

mod common;

use std::sync::Arc;
use std::time::Duration;

use common::*;
use session_feed::error::FeedError;
use session_feed::models::{ConversationEntry, MessageInfo, MessageRole};
use session_feed::stream::{ConnectionPhase, StreamHandle};
use session_feed::sync::ConversationSync;

fn sync_for(
    client: &MockHttpClient,
    provisioner: &MockProvisioner,
    session: Option<&str>,
) -> ConversationSync {
    let handle: StreamHandle = spawn_manager(client, session, fast_config());
    handle.connect();
    ConversationSync::new(handle, Arc::new(provisioner.clone()), |_| FEED_URL.to_string())
}

/// Run until the cache version reaches `version`.
async fn run_until_version(sync: &mut ConversationSync, version: u64) {
    while sync.cache().version() < version {
        if sync.run_once().await.is_none() {
            panic!("feed ended at version {}", sync.cache().version());
        }
    }
}

#[tokio::test(start_paused = true)]
async fn test_streamed_reply_builds_cache() {
    let client = MockHttpClient::new();
    let (live, feed) = MockStream::live();
    client.push_stream(live);
    let provisioner = MockProvisioner::new();
    let mut sync = sync_for(&client, &provisioner, Some("s1"));

    feed.send_event(&message_updated("m1", "s1"));
    feed.send_event(&part_updated("p1", "m1", "s1", "Hel"));
    feed.send_event(&part_updated("p1", "m1", "s1", "Hello"));
    feed.send_event(&part_updated("p2", "m1", "s1", " world"));
    feed.send_event(&message_updated("x1", "s2"));

    run_until_version(&mut sync, 4).await;

    let entries = sync.cache().entries();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].text(), "Hello world");
    assert!(sync.cache().activity().is_busy());

    feed.send_event(&session_idle("s1"));
    run_until_version(&mut sync, 5).await;
    assert!(!sync.cache().activity().is_busy());
}

#[tokio::test(start_paused = true)]
async fn test_reconnect_refetches_history() {
    let client = MockHttpClient::new();
    client.push_stream(MockStream::events(&[message_updated("m1", "s1")]));
    let provisioner = MockProvisioner::new();
    provisioner.set_history(
        "s1",
        vec![
            ConversationEntry::new(MessageInfo::new("m1", "s1", MessageRole::User)),
            ConversationEntry::new(MessageInfo::new("m2", "s1", MessageRole::Assistant)),
        ],
    );
    let mut sync = sync_for(&client, &provisioner, Some("s1"));

    // m1 from the feed, then the reconnect refetch replaces everything
    run_until_version(&mut sync, 2).await;

    let ids: Vec<_> = sync.cache().entries().iter().map(|e| e.id()).collect();
    assert_eq!(ids, vec!["m1", "m2"]);
    assert_eq!(provisioner.list_calls(), vec!["s1".to_string()]);
}

#[tokio::test(start_paused = true)]
async fn test_bootstrap_adopts_provisioned_session() {
    let client = MockHttpClient::new();
    client.push_stream(MockStream::Hold(vec![sse_frame(&server_connected())]));
    let provisioner = MockProvisioner::new();
    provisioner.set_history("ses_mock_1", Vec::new());
    let mut sync = sync_for(&client, &provisioner, None);

    // rescope bumps the version, refetch bumps it again
    run_until_version(&mut sync, 2).await;

    assert_eq!(sync.cache().scope(), Some("ses_mock_1"));
    assert_eq!(
        sync.stream().scope().session_id.as_deref(),
        Some("ses_mock_1")
    );
    assert_eq!(provisioner.create_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_follow_adopts_session_while_frames_arrive_during_provisioning() {
    let client = MockHttpClient::new();
    let (live, feed) = MockStream::live();
    client.push_stream(live);
    client.push_stream(MockStream::Hold(Vec::new()));
    let provisioner = MockProvisioner::new();
    provisioner.set_create_delay(Duration::from_millis(50));
    provisioner.set_history("ses_mock_1", Vec::new());
    let mut sync = sync_for(&client, &provisioner, None);

    let (scope_tx, mut scope_rx) = tokio::sync::mpsc::unbounded_channel();
    let follow = tokio::spawn(async move {
        sync.follow(move |cache| {
            let _ = scope_tx.send(cache.scope().map(str::to_string));
        })
        .await
    });

    // A frame lands while create_session is still sleeping
    feed.send_event(&server_connected());
    tokio::time::sleep(Duration::from_millis(10)).await;
    feed.send_event(&session_idle("ses_elsewhere"));

    let adopted = tokio::time::timeout(Duration::from_secs(1), async {
        while let Some(scope) = scope_rx.recv().await {
            if scope.is_some() {
                return scope;
            }
        }
        None
    })
    .await
    .expect("provisioned session never adopted");

    assert_eq!(adopted.as_deref(), Some("ses_mock_1"));
    assert_eq!(provisioner.create_count(), 1);
    assert_eq!(provisioner.list_calls(), vec!["ses_mock_1".to_string()]);
    follow.abort();
}

#[tokio::test(start_paused = true)]
async fn test_follow_returns_when_feed_gives_up_without_reconnect() {
    let client = MockHttpClient::new();
    refuse_streams(&client, 1);
    let provisioner = MockProvisioner::new();
    let handle = spawn_manager(
        &client,
        Some("s1"),
        fast_config().with_auto_reconnect(false),
    );
    handle.connect();
    let mut sync =
        ConversationSync::new(handle, Arc::new(provisioner), |_| FEED_URL.to_string());

    let result = tokio::time::timeout(Duration::from_secs(1), sync.follow(|_| {}))
        .await
        .expect("follow kept waiting after the feed gave up");

    assert!(matches!(result, Err(FeedError::Stream(_))));
    let state = sync.stream().state();
    assert_eq!(state.phase, ConnectionPhase::Idle);
    assert!(state.gave_up());
}
