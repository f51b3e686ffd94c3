use std::convert::Infallible;

use async_stream::stream;
use bytes::Bytes;
use futures::{Stream, StreamExt};
use serde::Serialize;

use byblia_types::models::config::StreamConfig;
use byblia_types::{ChatMessage, CompletionMeta, StreamEvent, GENERIC_GENERATION_ERROR};

use super::CoalescingBuffer;

pub const DONE_FRAME: &str = "data: [DONE]\n\n";

/// JSON payload of one `data:` record.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum WireFrame<'a> {
    Event(EventFrame<'a>),
    Error { error: &'a str },
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EventFrame<'a> {
    Chunk {
        content: &'a str,
    },
    Complete {
        token_usage: u32,
        temperature: f64,
        interaction_id: i64,
        #[serde(skip_serializing_if = "Option::is_none")]
        message_history: Option<&'a [ChatMessage]>,
    },
}

impl<'a> WireFrame<'a> {
    pub fn chunk(content: &'a str) -> Self {
        Self::Event(EventFrame::Chunk { content })
    }

    pub fn complete(meta: &'a CompletionMeta) -> Self {
        Self::Event(EventFrame::Complete {
            token_usage: meta.token_usage.total,
            temperature: meta.temperature,
            interaction_id: meta.interaction_id.value(),
            message_history: meta.message_history.as_deref(),
        })
    }

    pub fn error(error: &'a str) -> Self {
        Self::Error { error }
    }

    /// Serialize as one blank-line-terminated `data:` record.
    pub fn to_sse(&self) -> String {
        match serde_json::to_string(self) {
            Ok(json) => format!("data: {}\n\n", json),
            Err(e) => {
                tracing::error!("Failed to serialize stream frame: {}", e);
                format!(
                    "data: {}\n\n",
                    serde_json::json!({ "error": GENERIC_GENERATION_ERROR })
                )
            },
        }
    }
}

/// Turns session events into wire frames.
#[derive(Debug, Clone, Copy)]
pub struct StreamFramer {
    coalesce_max_chars: usize,
}

impl StreamFramer {
    pub fn new(config: &StreamConfig) -> Self {
        Self { coalesce_max_chars: config.coalesce_max_chars }
    }

    /// Encode a single event without buffering. Terminal events are not
    /// followed by the sentinel here; see [`Self::frame_stream`].
    pub fn encode(event: &StreamEvent) -> String {
        match event {
            StreamEvent::Fragment(text) => WireFrame::chunk(text).to_sse(),
            StreamEvent::Completion(meta) => WireFrame::complete(meta).to_sse(),
            StreamEvent::Error(message) => WireFrame::error(message).to_sse(),
        }
    }

    /// Frame an event sequence into the response body.
    ///
    /// Emits at most one terminal record, always followed by `[DONE]`. A
    /// source that ends without a terminal event is closed with the generic
    /// error record. Events after the first terminal one are ignored.
    pub fn frame_stream<S>(self, events: S) -> impl Stream<Item = Result<Bytes, Infallible>> + Send
    where
        S: Stream<Item = StreamEvent> + Send + 'static,
    {
        let mut buffer = CoalescingBuffer::new(self.coalesce_max_chars);

        stream! {
            let mut events = std::pin::pin!(events);

            while let Some(event) = events.next().await {
                match event {
                    StreamEvent::Fragment(text) => {
                        if let Some(ready) = buffer.push(&text) {
                            yield Ok(Bytes::from(WireFrame::chunk(&ready).to_sse()));
                        }
                    },
                    terminal => {
                        if let Some(rest) = buffer.flush() {
                            yield Ok(Bytes::from(WireFrame::chunk(&rest).to_sse()));
                        }
                        yield Ok(Bytes::from(Self::encode(&terminal)));
                        yield Ok(Bytes::from_static(DONE_FRAME.as_bytes()));
                        return;
                    },
                }
            }

            tracing::warn!("Event source ended without a terminal event");
            if let Some(rest) = buffer.flush() {
                yield Ok(Bytes::from(WireFrame::chunk(&rest).to_sse()));
            }
            yield Ok(Bytes::from(WireFrame::error(GENERIC_GENERATION_ERROR).to_sse()));
            yield Ok(Bytes::from_static(DONE_FRAME.as_bytes()));
        }
    }
}
