//! SSE (Server-Sent Events) stream parser
//!
//! Parses the agent service's event feed. Each frame is `data: <JSON>`
//! followed by a blank line:
//! - `data: <json>` - data payload line (several are joined with '\n')
//! - `event: <type>` / `id: <id>` - optional fields, tolerated
//! - Empty line - signals end of frame
//! - Lines starting with `:` - comments (ignored)
//!
//! # Module structure
//! - `events` - Line/frame types and SseParseError
//! - `parser` - SseParser and frame decoding
//! - `stream` - Byte stream to frame stream adapter

mod events;
mod parser;
mod stream;

// Re-export public types
pub use events::{SseFrame, SseLine, SseParseError};
pub use parser::{decode_frame, parse_sse_line, SseParser};
pub use stream::{frame_stream, FrameStream};
