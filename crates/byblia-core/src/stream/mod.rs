//! Outbound event-stream pipeline.
//!
//! `StreamEvent`s from a generation session pass through a
//! [`CoalescingBuffer`] and leave as `data: ...\n\n` records terminated by
//! the `[DONE]` sentinel.

mod coalesce;
mod framer;
mod response;


pub use coalesce::CoalescingBuffer;
pub use framer::{EventFrame, StreamFramer, WireFrame, DONE_FRAME};
pub use response::build_sse_response;
