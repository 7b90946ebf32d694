//! Conversation data model: messages, parts, and the cache entry that joins them.

mod entry;
mod message;
mod part;
mod session;

pub use entry::ConversationEntry;
pub use message::{MessageInfo, MessageRole};
pub use part::{Part, PartKind};
pub use session::{SessionActivity, SessionInfo};
