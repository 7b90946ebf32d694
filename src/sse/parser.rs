//! SSE stream parsing logic
//!
//! Contains the stateful SseParser for accumulating lines into frames, and
//! the decode step from a frame to a [`RawEvent`].

use crate::events::RawEvent;
use crate::sse::events::{SseFrame, SseLine, SseParseError};

/// Parse a single SSE line into its component type
pub fn parse_sse_line(line: &str) -> SseLine {
    if line.is_empty() {
        return SseLine::Empty;
    }

    if let Some(stripped) = line.strip_prefix(':') {
        return SseLine::Comment(stripped.trim().to_string());
    }

    if let Some(rest) = line.strip_prefix("event:") {
        return SseLine::Event(rest.trim().to_string());
    }

    if let Some(rest) = line.strip_prefix("data:") {
        // A single leading space is part of the framing, not the payload
        return SseLine::Data(rest.strip_prefix(' ').unwrap_or(rest).to_string());
    }

    if let Some(rest) = line.strip_prefix("id:") {
        return SseLine::Id(rest.trim().to_string());
    }

    // Unknown field (e.g. "retry:") - treat as comment
    SseLine::Comment(line.to_string())
}

/// Decode a frame's data into a raw feed event.
pub fn decode_frame(frame: &SseFrame) -> Result<RawEvent, SseParseError> {
    if frame.data.trim().is_empty() {
        return Err(SseParseError::MissingData);
    }
    Ok(RawEvent::parse(&frame.data)?)
}

/// Stateful SSE parser that accumulates lines and emits complete frames
#[derive(Debug, Default)]
pub struct SseParser {
    /// Current event type being accumulated
    current_event_type: Option<String>,
    /// Current event id
    current_id: Option<String>,
    /// Accumulated data lines (SSE allows multiple data: lines)
    data_buffer: Vec<String>,
}

impl SseParser {
    /// Create a new SSE parser
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed a line (without its trailing newline) to the parser.
    ///
    /// Returns `Some(frame)` when the line completes a frame that carried
    /// data. Frames made only of comments or fields are dropped.
    pub fn feed_line(&mut self, line: &str) -> Option<SseFrame> {
        match parse_sse_line(line.trim_end_matches('\r')) {
            SseLine::Event(event_type) => {
                self.current_event_type = Some(event_type);
                None
            }
            SseLine::Data(data) => {
                self.data_buffer.push(data);
                None
            }
            SseLine::Id(id) => {
                self.current_id = Some(id);
                None
            }
            SseLine::Empty => self.try_emit_frame(),
            SseLine::Comment(_) => None,
        }
    }

    fn try_emit_frame(&mut self) -> Option<SseFrame> {
        let event = self.current_event_type.take();
        let id = self.current_id.take();
        if self.data_buffer.is_empty() {
            return None;
        }

        let data = self.data_buffer.join("\n");
        self.data_buffer.clear();
        Some(SseFrame { event, data, id })
    }

    /// Reset the parser state
    pub fn reset(&mut self) {
        self.current_event_type = None;
        self.current_id = None;
        self.data_buffer.clear();
    }
}
