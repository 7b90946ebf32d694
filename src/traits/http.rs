//! HTTP seam used by the feed and the agent API client.
//!
//! Two shapes of request exist: short request/response calls (`get`,
//! `post`) and the long-lived event feed (`get_stream`). Production code uses
//! [`ReqwestHttpClient`](crate::adapters::ReqwestHttpClient); tests script a
//! [`MockHttpClient`](crate::adapters::MockHttpClient).

use async_trait::async_trait;
use bytes::Bytes;
use futures::Stream;
use std::collections::HashMap;
use std::pin::Pin;

/// Header name to value.
pub type Headers = HashMap<String, String>;

/// A fully buffered response.
#[derive(Debug, Clone)]
pub struct Response {
    pub status: u16,
    pub headers: Headers,
    pub body: Bytes,
}

impl Response {
    pub fn new(status: u16, body: Bytes) -> Self {
        Self::with_headers(status, Headers::new(), body)
    }

    pub fn with_headers(status: u16, headers: Headers, body: Bytes) -> Self {
        Self {
            status,
            headers,
            body,
        }
    }

    /// 2xx
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Header lookup ignoring ASCII case.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// Body as text. Invalid UTF-8 is replaced rather than rejected, since
    /// this is mostly used for error messages.
    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// Decode the body as JSON.
    pub fn json<T: serde::de::DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_slice(&self.body)
    }
}

/// Transport-level failure.
#[derive(Debug, Clone, PartialEq)]
pub enum HttpError {
    /// Could not reach the server
    ConnectionFailed(String),
    Timeout(String),
    /// Non-2xx status, with whatever body text the server sent
    ServerError { status: u16, message: String },
    Cancelled,
    /// Reading the body failed midway
    Io(String),
    InvalidUrl(String),
    Other(String),
}

impl HttpError {
    /// HTTP status, for `ServerError`.
    pub fn status(&self) -> Option<u16> {
        match self {
            HttpError::ServerError { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl std::fmt::Display for HttpError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HttpError::ConnectionFailed(msg) => write!(f, "connection failed: {}", msg),
            HttpError::Timeout(msg) => write!(f, "timed out: {}", msg),
            HttpError::ServerError { status, message } if message.is_empty() => {
                write!(f, "HTTP {}", status)
            }
            HttpError::ServerError { status, message } => write!(f, "HTTP {}: {}", status, message),
            HttpError::Cancelled => write!(f, "cancelled"),
            HttpError::Io(msg) => write!(f, "body read failed: {}", msg),
            HttpError::InvalidUrl(msg) => write!(f, "invalid URL: {}", msg),
            HttpError::Other(msg) => write!(f, "{}", msg),
        }
    }
}

impl std::error::Error for HttpError {}

/// Body chunks of a streaming response.
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes, HttpError>> + Send>>;

/// HTTP operations the crate needs.
///
/// # Example
///
/// ```ignore
/// use session_feed::traits::{Headers, HttpClient};
///
/// async fn open_feed<C: HttpClient>(client: &C, url: &str) -> Result<(), HttpError> {
///     let body = client.get_stream(url, &Headers::new()).await?;
///     // hand `body` to sse::frame_stream
///     Ok(())
/// }
/// ```
#[async_trait]
pub trait HttpClient: Send + Sync {
    /// GET, body fully buffered. Non-2xx statuses are returned as responses.
    async fn get(&self, url: &str, headers: &Headers) -> Result<Response, HttpError>;

    /// POST a JSON body, response fully buffered.
    async fn post(&self, url: &str, body: &str, headers: &Headers) -> Result<Response, HttpError>;

    /// Long-lived GET for the event feed.
    ///
    /// Unlike `get`, a non-2xx status is an error
    /// ([`HttpError::ServerError`]) so that a refused subscription never
    /// looks like an open one.
    async fn get_stream(&self, url: &str, headers: &Headers) -> Result<ByteStream, HttpError>;
}
