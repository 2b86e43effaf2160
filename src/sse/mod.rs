//! Chat stream ingestion.
//!
//! The chat endpoint answers with SSE-shaped text:
//! - `event: <name>` - names the next payload
//! - `data: <json>` - payload; may continue over several `data:` lines
//! - Empty line - frame boundary
//! - Lines starting with `:` - comments (ignored)
//!
//! Bytes flow through [`Utf8Decoder`] → [`LineBuffer`] → [`FrameAssembler`]
//! → [`Dispatcher`], tied together by [`StreamSession`].
//!
//! # Module structure
//! - `decoder` - incremental UTF-8 decoding
//! - `buffer` - line splitting with a length cap
//! - `parser` - line classification and frame assembly
//! - `dispatch` - frame to [`ChatStreamEvent`] mapping
//! - `session` - the synchronous pipeline
//! - `events` - event, frame and error types

mod buffer;
mod decoder;
mod dispatch;
mod events;
mod parser;
mod payloads;
mod session;

pub use buffer::{LineBuffer, DEFAULT_MAX_LINE_BYTES};
pub use decoder::Utf8Decoder;
pub use dispatch::Dispatcher;
pub use events::{ChatStreamEvent, SseFrame, SseLine, SseParseError};
pub use parser::{parse_sse_line, FrameAssembler};
pub use session::StreamSession;
