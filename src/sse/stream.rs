//! Byte stream to SSE frame stream adapter.

use std::pin::Pin;

use futures_util::stream::{self, Stream};
use futures_util::StreamExt;

use crate::sse::{SseFrame, SseParser};
use crate::traits::{ByteStream, HttpError};

/// Boxed stream of SSE frames.
pub type FrameStream = Pin<Box<dyn Stream<Item = Result<SseFrame, HttpError>> + Send>>;

/// Split a response body into SSE frames.
///
/// Lines are cut on raw bytes so a multi-byte character split across two
/// chunks survives. A transport error is yielded once and ends the stream.
/// A frame left unterminated when the body ends is still emitted.
pub fn frame_stream(bytes: ByteStream) -> FrameStream {
    let frames = stream::unfold(
        (bytes, SseParser::new(), Vec::<u8>::new(), false),
        |(mut bytes, mut parser, mut buffer, finished)| async move {
            if finished {
                return None;
            }
            loop {
                // First, try to process any complete lines in the buffer
                if let Some(newline_pos) = buffer.iter().position(|b| *b == b'\n') {
                    let line_bytes: Vec<u8> = buffer.drain(..=newline_pos).collect();
                    let line = String::from_utf8_lossy(&line_bytes[..newline_pos]).into_owned();
                    if let Some(frame) = parser.feed_line(&line) {
                        return Some((Ok(frame), (bytes, parser, buffer, false)));
                    }
                    continue;
                }

                // Need more data from the stream
                match bytes.next().await {
                    Some(Ok(chunk)) => buffer.extend_from_slice(&chunk),
                    Some(Err(e)) => return Some((Err(e), (bytes, parser, buffer, true))),
                    None => {
                        if !buffer.is_empty() {
                            let line = String::from_utf8_lossy(&buffer).into_owned();
                            buffer.clear();
                            if let Some(frame) = parser.feed_line(&line) {
                                return Some((Ok(frame), (bytes, parser, buffer, true)));
                            }
                        }
                        return parser
                            .feed_line("")
                            .map(|frame| (Ok(frame), (bytes, parser, buffer, true)));
                    }
                }
            }
        },
    );

    Box::pin(frames)
}
