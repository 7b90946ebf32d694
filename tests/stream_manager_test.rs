//! Stream manager lifecycle tests against the mock HTTP client.
//!
//! Time is paused: tokio advances the clock whenever every task is idle,
//! so reconnect delays elapse instantly and deterministically.

mod common;

use std::time::Duration;

use common::*;
use session_feed::error::StreamError;
use session_feed::events::FeedEvent;
use session_feed::stream::{ConnectionPhase, StreamScope, StreamUpdate};

fn expect_disconnected(update: StreamUpdate) -> StreamError {
    match update {
        StreamUpdate::Disconnected { error: Some(error) } => error,
        other => panic!("Expected Disconnected with error, got {:?}", other),
    }
}

fn expect_event(update: StreamUpdate) -> FeedEvent {
    match update {
        StreamUpdate::Event(event) => event,
        other => panic!("Expected Event, got {:?}", other),
    }
}

#[tokio::test(start_paused = true)]
async fn test_gives_up_after_max_retries() {
    let client = MockHttpClient::new();
    refuse_streams(&client, 5);
    let mut handle = spawn_manager(&client, None, fast_config());

    handle.connect();
    for attempt in 1..=3 {
        let error = expect_disconnected(next_update(&mut handle).await);
        assert!(matches!(error, StreamError::ConnectionFailed { .. }));
        assert_eq!(handle.state().failed_attempts, attempt);
    }

    let state = handle.state();
    assert!(state.has_exceeded_retries);
    assert_eq!(state.phase, ConnectionPhase::Exceeded);

    tokio::time::sleep(Duration::from_secs(10)).await;
    settle().await;
    assert_eq!(client.stream_open_count(), 3);

    // Manual connect does not bypass the budget
    handle.connect();
    settle().await;
    assert_eq!(client.stream_open_count(), 3);
}

#[tokio::test(start_paused = true)]
async fn test_reset_retries_reopens() {
    let client = MockHttpClient::new();
    refuse_streams(&client, 3);
    let mut handle = spawn_manager(&client, None, fast_config());

    handle.connect();
    for _ in 0..3 {
        next_update(&mut handle).await;
    }
    assert!(handle.state().has_exceeded_retries);

    handle.reset_retries();
    handle.connect();
    assert_eq!(next_update(&mut handle).await, StreamUpdate::Connected);
    assert_eq!(client.stream_open_count(), 4);
    assert!(!handle.state().has_exceeded_retries);
}

#[tokio::test(start_paused = true)]
async fn test_first_event_resets_failure_count() {
    let client = MockHttpClient::new();
    refuse_streams(&client, 2);
    let (live, feed) = MockStream::live();
    client.push_stream(live);
    let mut handle = spawn_manager(&client, Some("s1"), fast_config());

    handle.connect();
    expect_disconnected(next_update(&mut handle).await);
    expect_disconnected(next_update(&mut handle).await);
    assert_eq!(next_update(&mut handle).await, StreamUpdate::Connected);

    // Opening alone does not count as success
    assert_eq!(handle.state().failed_attempts, 2);

    feed.send_event(&message_updated("m1", "s1"));
    let event = expect_event(next_update(&mut handle).await);
    assert_eq!(event.session_id(), Some("s1"));
    assert_eq!(handle.state().failed_attempts, 0);
    assert!(handle.state().last_event_at.is_some());

    // A drop after that starts a fresh budget
    feed.fail(HttpError::Io("connection reset".to_string()));
    let error = expect_disconnected(next_update(&mut handle).await);
    assert!(matches!(error, StreamError::ConnectionLost { .. }));
    let state = handle.state();
    assert_eq!(state.failed_attempts, 1);
    assert_eq!(state.phase, ConnectionPhase::Reconnecting);
}

#[tokio::test(start_paused = true)]
async fn test_disconnect_cancels_pending_reconnect() {
    let client = MockHttpClient::new();
    refuse_streams(&client, 1);
    let mut handle = spawn_manager(&client, None, fast_config());

    handle.connect();
    expect_disconnected(next_update(&mut handle).await);
    assert_eq!(handle.state().phase, ConnectionPhase::Reconnecting);

    handle.disconnect();
    tokio::time::sleep(TEST_DELAY * 10).await;
    settle().await;

    assert_eq!(client.stream_open_count(), 1);
    assert_eq!(handle.state().phase, ConnectionPhase::Stopped);

    // Suppressed until rearmed
    handle.connect();
    settle().await;
    assert_eq!(client.stream_open_count(), 1);

    handle.rearm();
    handle.connect();
    assert_eq!(next_update(&mut handle).await, StreamUpdate::Connected);
    assert_eq!(client.stream_open_count(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_rescope_abandons_old_timer() {
    let client = MockHttpClient::new();
    refuse_streams(&client, 1);
    let mut handle = spawn_manager(&client, Some("s1"), fast_config());

    handle.connect();
    expect_disconnected(next_update(&mut handle).await);

    handle.rescope(StreamScope::new(FEED_URL).with_session("s2"));
    assert_eq!(next_update(&mut handle).await, StreamUpdate::Connected);
    assert_eq!(handle.state().failed_attempts, 0);
    assert_eq!(handle.scope().session_id.as_deref(), Some("s2"));

    tokio::time::sleep(TEST_DELAY * 10).await;
    settle().await;
    assert_eq!(client.stream_open_count(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_rescope_applies_new_filter() {
    let client = MockHttpClient::new();
    client.push_stream(MockStream::Hold(Vec::new()));
    let (live, feed) = MockStream::live();
    client.push_stream(live);
    let mut handle = spawn_manager(&client, Some("s1"), fast_config());

    handle.connect();
    assert_eq!(next_update(&mut handle).await, StreamUpdate::Connected);

    handle.rescope(StreamScope::new(FEED_URL).with_session("s2"));
    assert_eq!(
        next_update(&mut handle).await,
        StreamUpdate::Disconnected { error: None }
    );
    assert_eq!(next_update(&mut handle).await, StreamUpdate::Connected);

    feed.send_event(&message_updated("m1", "s1"));
    feed.send_event(&message_updated("m2", "s2"));
    let event = expect_event(next_update(&mut handle).await);
    assert_eq!(event.session_id(), Some("s2"));
}

#[tokio::test(start_paused = true)]
async fn test_duplicate_connect_opens_once() {
    let client = MockHttpClient::new();
    let mut handle = spawn_manager(&client, None, fast_config());

    handle.connect();
    handle.connect();
    handle.connect();
    assert_eq!(next_update(&mut handle).await, StreamUpdate::Connected);
    handle.connect();
    settle().await;

    assert_eq!(client.stream_open_count(), 1);
    assert!(handle.try_recv().is_none());
}

#[tokio::test(start_paused = true)]
async fn test_parse_failure_is_skipped() {
    let client = MockHttpClient::new();
    let (live, feed) = MockStream::live();
    client.push_stream(live);
    let mut handle = spawn_manager(&client, None, fast_config());

    handle.connect();
    assert_eq!(next_update(&mut handle).await, StreamUpdate::Connected);

    feed.send_raw("data: {not json\n\n");
    feed.send_event(&session_idle("s1"));

    let event = expect_event(next_update(&mut handle).await);
    assert_eq!(event, FeedEvent::SessionIdle { session_id: "s1".to_string() });

    let state = handle.state();
    assert!(state.connected);
    assert_eq!(state.failed_attempts, 0);
    assert!(state.error.is_none());
}

#[tokio::test(start_paused = true)]
async fn test_session_filter_passes_globals_and_matches() {
    let client = MockHttpClient::new();
    client.push_stream(MockStream::Hold(vec![
        sse_frame(&server_connected()),
        sse_frame(&message_updated("x", "other")),
        sse_frame(&part_updated("p", "m", "s1", "hi")),
        sse_frame(&session_idle("other")),
        sse_frame(&session_idle("s1")),
    ]));
    let mut handle = spawn_manager(&client, Some("s1"), fast_config());

    handle.connect();
    assert_eq!(next_update(&mut handle).await, StreamUpdate::Connected);

    let names: Vec<String> = [
        next_update(&mut handle).await,
        next_update(&mut handle).await,
        next_update(&mut handle).await,
    ]
    .into_iter()
    .map(|u| expect_event(u).event_type_name().to_string())
    .collect();

    assert_eq!(
        names,
        vec!["server.connected", "message.part.updated", "session.idle"]
    );
    settle().await;
    assert!(handle.try_recv().is_none());
}

#[tokio::test(start_paused = true)]
async fn test_clean_end_of_stream_is_a_failure() {
    let client = MockHttpClient::new();
    client.push_stream(MockStream::events(&[server_connected()]));
    let mut handle = spawn_manager(&client, None, fast_config());

    handle.connect();
    assert_eq!(next_update(&mut handle).await, StreamUpdate::Connected);
    expect_event(next_update(&mut handle).await);

    let error = expect_disconnected(next_update(&mut handle).await);
    assert_eq!(error, StreamError::ServerClosed);
    assert_eq!(handle.state().failed_attempts, 1);

    // Queue is empty now, so the reconnect opens a silent stream
    assert_eq!(next_update(&mut handle).await, StreamUpdate::Connected);
    assert_eq!(client.stream_open_count(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_no_auto_reconnect() {
    let client = MockHttpClient::new();
    refuse_streams(&client, 1);
    let mut handle = spawn_manager(&client, None, fast_config().with_auto_reconnect(false));

    handle.connect();
    expect_disconnected(next_update(&mut handle).await);
    assert!(handle.state().has_exceeded_retries);

    tokio::time::sleep(TEST_DELAY * 10).await;
    settle().await;
    assert_eq!(client.stream_open_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_state_receiver_sees_transitions() {
    let client = MockHttpClient::new();
    let mut handle = spawn_manager(&client, None, fast_config());
    let mut state_rx = handle.state_receiver();

    handle.connect();
    assert_eq!(next_update(&mut handle).await, StreamUpdate::Connected);

    state_rx.changed().await.unwrap();
    assert!(state_rx.borrow_and_update().connected);

    handle.shutdown();
    settle().await;
    assert_eq!(handle.state().phase, ConnectionPhase::Stopped);
}
