//! Unified error type for the session feed.

use std::fmt;

use super::category::ErrorCategory;
use super::network::NetworkError;
use super::stream::StreamError;

/// Unified error type for the session feed.
///
/// Most failures in this crate are absorbed into [`ConnectionState`] rather
/// than returned. `FeedError` covers the rest: provisioning, refetch and
/// configuration.
///
/// [`ConnectionState`]: crate::stream::ConnectionState
#[derive(Debug, Clone, PartialEq)]
pub enum FeedError {
    /// Request/response calls to the agent service.
    Network(NetworkError),

    /// Event feed subscription errors.
    Stream(StreamError),

    /// A payload that could not be decoded into the expected shape.
    Decode { what: String, message: String },

    /// Invalid configuration value.
    Config { key: String, message: String },
}

impl FeedError {
    /// Shorthand for a decode failure.
    pub fn decode(what: impl Into<String>, message: impl fmt::Display) -> Self {
        FeedError::Decode {
            what: what.into(),
            message: message.to_string(),
        }
    }

    /// Shorthand for a configuration failure.
    pub fn config(key: impl Into<String>, message: impl Into<String>) -> Self {
        FeedError::Config {
            key: key.into(),
            message: message.into(),
        }
    }

    /// Get the category of this error.
    pub fn category(&self) -> ErrorCategory {
        match self {
            FeedError::Network(NetworkError::HttpStatus { status, .. }) if *status >= 500 => {
                ErrorCategory::Server
            }
            FeedError::Network(NetworkError::InvalidUrl { .. }) => ErrorCategory::Configuration,
            FeedError::Network(NetworkError::InvalidResponse { .. }) => ErrorCategory::Client,
            FeedError::Network(_) => ErrorCategory::Network,
            FeedError::Stream(StreamError::ServerClosed)
            | FeedError::Stream(StreamError::HttpStatus { .. }) => ErrorCategory::Server,
            FeedError::Stream(_) => ErrorCategory::Network,
            FeedError::Decode { .. } => ErrorCategory::Client,
            FeedError::Config { .. } => ErrorCategory::Configuration,
        }
    }

    /// Check if this error is retryable.
    pub fn is_retryable(&self) -> bool {
        match self {
            FeedError::Network(err) => err.is_retryable(),
            FeedError::Stream(err) => err.is_retryable(),
            FeedError::Decode { .. } | FeedError::Config { .. } => false,
        }
    }

    /// Get a user-friendly error message.
    pub fn user_message(&self) -> String {
        match self {
            FeedError::Network(err) => err.user_message(),
            FeedError::Stream(err) => err.user_message(),
            FeedError::Decode { what, .. } => {
                format!("Could not read the {} sent by the agent service.", what)
            }
            FeedError::Config { key, message } => format!("Invalid {}: {}", key, message),
        }
    }

    /// Get a short error code for logging.
    pub fn error_code(&self) -> &'static str {
        match self {
            FeedError::Network(err) => err.error_code(),
            FeedError::Stream(err) => err.error_code(),
            FeedError::Decode { .. } => "E_DECODE",
            FeedError::Config { .. } => "E_CONFIG",
        }
    }

    /// Get the recovery hint for this error.
    pub fn recovery_hint(&self) -> &'static str {
        self.category().recovery_hint()
    }
}

impl fmt::Display for FeedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FeedError::Network(err) => write!(f, "{}", err),
            FeedError::Stream(err) => write!(f, "{}", err),
            FeedError::Decode { what, message } => {
                write!(f, "Failed to decode {}: {}", what, message)
            }
            FeedError::Config { key, message } => {
                write!(f, "Invalid configuration for {}: {}", key, message)
            }
        }
    }
}

impl std::error::Error for FeedError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            FeedError::Network(err) => Some(err),
            FeedError::Stream(err) => Some(err),
            _ => None,
        }
    }
}

impl From<NetworkError> for FeedError {
    fn from(err: NetworkError) -> Self {
        FeedError::Network(err)
    }
}

impl From<StreamError> for FeedError {
    fn from(err: StreamError) -> Self {
        FeedError::Stream(err)
    }
}

impl From<serde_json::Error> for FeedError {
    fn from(err: serde_json::Error) -> Self {
        FeedError::decode("JSON payload", err)
    }
}
