//! Feed subscription error types.
//!
//! A `StreamError` is what [`ConnectionState::error`] carries after the
//! event feed fails to open or drops.
//!
//! [`ConnectionState::error`]: crate::stream::ConnectionState

use std::fmt;

use crate::traits::HttpError;

/// Stream-specific error variants.
#[derive(Debug, Clone, PartialEq)]
pub enum StreamError {
    /// The subscription request could not be sent.
    ConnectionFailed { message: String },

    /// The server answered the subscription with a non-2xx status.
    HttpStatus { status: u16, message: String },

    /// The body failed mid-stream.
    ConnectionLost { message: String },

    /// The server ended the body cleanly.
    ServerClosed,

    /// Generic stream error.
    Other { message: String },
}

impl StreamError {
    /// Check if this error is likely transient and can be retried.
    pub fn is_retryable(&self) -> bool {
        match self {
            StreamError::ConnectionFailed { .. }
            | StreamError::ConnectionLost { .. }
            | StreamError::ServerClosed => true,
            StreamError::HttpStatus { status, .. } => *status >= 500 || *status == 429,
            StreamError::Other { .. } => false,
        }
    }

    /// Get a user-friendly error message.
    pub fn user_message(&self) -> String {
        match self {
            StreamError::ConnectionFailed { .. } => {
                "Unable to connect to the event feed.".to_string()
            }
            StreamError::HttpStatus { status, .. } => {
                format!("The event feed was refused (HTTP {}).", status)
            }
            StreamError::ConnectionLost { .. } => {
                "Connection to the event feed was lost.".to_string()
            }
            StreamError::ServerClosed => "The server closed the event feed.".to_string(),
            StreamError::Other { message } => format!("Stream error: {}", message),
        }
    }

    /// Get a short error code for logging.
    pub fn error_code(&self) -> &'static str {
        match self {
            StreamError::ConnectionFailed { .. } => "E_STREAM_CONN",
            StreamError::HttpStatus { .. } => "E_STREAM_HTTP",
            StreamError::ConnectionLost { .. } => "E_STREAM_LOST",
            StreamError::ServerClosed => "E_STREAM_CLOSED",
            StreamError::Other { .. } => "E_STREAM_OTHER",
        }
    }

    /// Classify an error raised while the body was already streaming.
    pub fn lost(err: HttpError) -> Self {
        StreamError::ConnectionLost {
            message: err.to_string(),
        }
    }
}

/// Errors returned while opening the subscription.
impl From<HttpError> for StreamError {
    fn from(err: HttpError) -> Self {
        match err {
            HttpError::ServerError { status, message } => StreamError::HttpStatus { status, message },
            HttpError::ConnectionFailed(message) | HttpError::Timeout(message) => {
                StreamError::ConnectionFailed { message }
            }
            other => StreamError::Other {
                message: other.to_string(),
            },
        }
    }
}

impl fmt::Display for StreamError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StreamError::ConnectionFailed { message } => {
                write!(f, "Stream connection failed: {}", message)
            }
            StreamError::HttpStatus { status, message } => {
                write!(f, "Stream refused with HTTP {}: {}", status, message)
            }
            StreamError::ConnectionLost { message } => {
                write!(f, "Stream connection lost: {}", message)
            }
            StreamError::ServerClosed => write!(f, "Server closed stream"),
            StreamError::Other { message } => write!(f, "Stream error: {}", message),
        }
    }
}

impl std::error::Error for StreamError {}
