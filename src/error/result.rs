//! Result type alias for feed operations.

use super::feed_error::FeedError;

/// Type alias for Results using FeedError.
///
/// # Example
///
/// ```ignore
/// use session_feed::error::FeedResult;
///
/// async fn provision() -> FeedResult<SessionInfo> {
///     api.create_session(Some("/work/repo")).await
/// }
/// ```
pub type FeedResult<T> = Result<T, FeedError>;
