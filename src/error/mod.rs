//! Unified error handling for the session feed.
//!
//! - **Error Categories**: high-level classification for retry decisions
//! - **Domain-specific Errors**: `NetworkError` for request/response calls,
//!   `StreamError` for the event feed subscription
//! - **Unified Error Type**: `FeedError` consolidates both plus decode and
//!   configuration failures
//! - **Result Type Alias**: `FeedResult<T>`
//!
//! | Category | Description | Retryable |
//! |----------|-------------|-----------|
//! | Network | Connection, timeout, dropped feed | Yes |
//! | Server | 5xx, feed closed by server | Yes |
//! | Client | Undecodable payloads | No |
//! | Configuration | Bad URL or env value | No |

mod category;
mod feed_error;
mod network;
mod result;
mod stream;

pub use category::ErrorCategory;
pub use feed_error::FeedError;
pub use network::NetworkError;
pub use result::FeedResult;
pub use stream::StreamError;
