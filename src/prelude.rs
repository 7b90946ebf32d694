//! Prelude module for convenient imports.
//!
//! ```ignore
//! use session_feed::prelude::*;
//! ```

// Model types
pub use crate::models::{ConversationEntry, MessageInfo, MessageRole, Part, SessionActivity, SessionInfo};

// Events
pub use crate::events::{classify, FeedEvent, RawEvent};

// Cache
pub use crate::cache::SessionCache;

// Stream
pub use crate::stream::{
    ConnectionPhase, ConnectionState, StreamConfig, StreamHandle, StreamManager, StreamScope,
    StreamUpdate,
};

// Glue
pub use crate::bootstrap::{BootstrapCoordinator, BootstrapOutcome};
pub use crate::sync::ConversationSync;

// Error types
pub use crate::error::{FeedError, FeedResult};
