//! Mock HTTP client for testing.
//!
//! Request/response calls are answered from a URL table. Feed subscriptions
//! (`get_stream`) are answered from a queue of scripted [`MockStream`]s, one
//! per subscription, so a test can describe a whole reconnect sequence up
//! front.

use async_trait::async_trait;
use bytes::Bytes;
use futures::channel::mpsc;
use futures_util::stream::{self, StreamExt};
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use crate::traits::{ByteStream, Headers, HttpClient, HttpError, Response};

/// A recorded HTTP request for verification in tests.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    /// HTTP method (GET or POST)
    pub method: String,
    /// Request URL
    pub url: String,
    /// Request headers
    pub headers: Headers,
    /// Request body (for POST requests)
    pub body: Option<String>,
}

/// Configuration for a mock request/response answer.
#[derive(Debug, Clone)]
pub enum MockResponse {
    /// Return a response
    Success(Response),
    /// Return an error
    Error(HttpError),
}

impl MockResponse {
    /// A response with the given status and a JSON body.
    pub fn json(status: u16, body: &serde_json::Value) -> Self {
        MockResponse::Success(Response::new(status, Bytes::from(body.to_string())))
    }
}

/// Script for one feed subscription.
#[derive(Debug)]
pub enum MockStream {
    /// Open, yield the chunks, then end the body.
    Frames(Vec<Bytes>),
    /// Open, yield the chunks, then stay open without further data.
    Hold(Vec<Bytes>),
    /// Refuse to open.
    Fail(HttpError),
    /// Open and relay whatever the paired [`LiveFeed`] sends.
    Live(mpsc::UnboundedReceiver<Result<Bytes, HttpError>>),
}

impl MockStream {
    /// A subscription driven by the test while it is open.
    pub fn live() -> (Self, LiveFeed) {
        let (tx, rx) = mpsc::unbounded();
        (MockStream::Live(rx), LiveFeed { tx })
    }

    /// Frames for each JSON event, then end of body.
    pub fn events(events: &[serde_json::Value]) -> Self {
        MockStream::Frames(events.iter().map(sse_frame).collect())
    }
}

/// Sending half of a [`MockStream::Live`] subscription.
#[derive(Debug, Clone)]
pub struct LiveFeed {
    tx: mpsc::UnboundedSender<Result<Bytes, HttpError>>,
}

impl LiveFeed {
    /// Push one event as a `data:` frame. Returns false once the
    /// subscription has been dropped by the reader.
    pub fn send_event(&self, event: &serde_json::Value) -> bool {
        self.tx.unbounded_send(Ok(sse_frame(event))).is_ok()
    }

    /// Push raw bytes, e.g. a malformed frame or half a frame.
    pub fn send_raw(&self, raw: &str) -> bool {
        self.tx
            .unbounded_send(Ok(Bytes::from(raw.to_string())))
            .is_ok()
    }

    /// Fail the body mid-stream.
    pub fn fail(&self, err: HttpError) -> bool {
        self.tx.unbounded_send(Err(err)).is_ok()
    }

    /// End the body cleanly.
    pub fn close(&self) {
        self.tx.close_channel();
    }

    /// True once the reader dropped the subscription.
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

/// Encode one event as an SSE frame.
pub fn sse_frame(event: &serde_json::Value) -> Bytes {
    Bytes::from(format!("data: {}\n\n", event))
}

/// Mock HTTP client for testing.
///
/// Clones share all state, so a test can keep one handle for assertions
/// while the code under test owns another.
///
/// # Example
///
/// ```ignore
/// use session_feed::adapters::mock::{MockHttpClient, MockStream};
/// use serde_json::json;
///
/// let client = MockHttpClient::new();
/// client.push_stream(MockStream::events(&[json!({"type": "server.connected", "properties": {}})]));
/// client.push_stream(MockStream::Fail(HttpError::ConnectionFailed("down".into())));
///
/// // First subscription yields one event then ends, the second is refused.
/// assert_eq!(client.stream_open_count(), 0);
/// ```
#[derive(Debug, Clone, Default)]
pub struct MockHttpClient {
    /// Configured responses by URL pattern
    responses: Arc<Mutex<HashMap<String, MockResponse>>>,
    /// Scripted feed subscriptions, consumed in order
    streams: Arc<Mutex<VecDeque<MockStream>>>,
    /// Recorded requests for verification
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl MockHttpClient {
    /// Create a new mock HTTP client.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a response for a URL. Exact matches win over prefix matches.
    pub fn set_response(&self, url: &str, response: MockResponse) {
        let mut responses = self.responses.lock().unwrap();
        responses.insert(url.to_string(), response);
    }

    /// Queue the script for the next feed subscription.
    ///
    /// With the queue empty, a subscription opens and stays silent.
    pub fn push_stream(&self, stream: MockStream) {
        self.streams.lock().unwrap().push_back(stream);
    }

    /// Get all recorded requests.
    pub fn get_requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// Number of `get_stream` calls made so far, successful or not.
    pub fn stream_open_count(&self) -> usize {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.method == "STREAM")
            .count()
    }

    /// Number of scripted subscriptions not consumed yet.
    pub fn pending_streams(&self) -> usize {
        self.streams.lock().unwrap().len()
    }

    fn record_request(&self, method: &str, url: &str, headers: &Headers, body: Option<String>) {
        let mut requests = self.requests.lock().unwrap();
        requests.push(RecordedRequest {
            method: method.to_string(),
            url: url.to_string(),
            headers: headers.clone(),
            body,
        });
    }

    fn get_response(&self, url: &str) -> Result<Response, HttpError> {
        let responses = self.responses.lock().unwrap();

        let matched = responses.get(url).or_else(|| {
            responses
                .iter()
                .filter(|(pattern, _)| url.starts_with(pattern.as_str()))
                .max_by_key(|(pattern, _)| pattern.len())
                .map(|(_, response)| response)
        });

        match matched {
            Some(MockResponse::Success(response)) => Ok(response.clone()),
            Some(MockResponse::Error(err)) => Err(err.clone()),
            None => Err(HttpError::Other(format!("No mock response for URL: {}", url))),
        }
    }
}

#[async_trait]
impl HttpClient for MockHttpClient {
    async fn get(&self, url: &str, headers: &Headers) -> Result<Response, HttpError> {
        self.record_request("GET", url, headers, None);
        self.get_response(url)
    }

    async fn post(&self, url: &str, body: &str, headers: &Headers) -> Result<Response, HttpError> {
        self.record_request("POST", url, headers, Some(body.to_string()));
        self.get_response(url)
    }

    async fn get_stream(&self, url: &str, headers: &Headers) -> Result<ByteStream, HttpError> {
        self.record_request("STREAM", url, headers, None);

        let next = self.streams.lock().unwrap().pop_front();
        match next {
            Some(MockStream::Frames(chunks)) => Ok(Box::pin(stream::iter(
                chunks.into_iter().map(Ok::<_, HttpError>),
            ))),
            Some(MockStream::Hold(chunks)) => Ok(Box::pin(
                stream::iter(chunks.into_iter().map(Ok::<_, HttpError>)).chain(stream::pending()),
            )),
            Some(MockStream::Fail(err)) => Err(err),
            Some(MockStream::Live(rx)) => Ok(Box::pin(rx)),
            None => Ok(Box::pin(stream::pending())),
        }
    }
}
