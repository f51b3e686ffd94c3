use bytes::BytesMut;
use serde::Deserialize;

use crate::error::ClientError;
use crate::types::{ChatEvent, Completion};

/// Wire frame of the `/chat` stream.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Frame {
    Typed(TypedFrame),
    Error { error: String },
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum TypedFrame {
    Chunk { content: String },
    Complete(Completion),
}

/// Outcome of decoding one `data:` record.
#[derive(Debug, Clone, PartialEq)]
pub enum SseRecord {
    Event(ChatEvent),
    Done,
}

/// Accumulates response bytes and yields complete `data:` records.
///
/// Frames may arrive split across network chunks, or several per chunk.
#[derive(Debug, Default)]
pub struct SseBuffer {
    buffer: BytesMut,
}

impl SseBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, chunk: &[u8]) -> Result<Vec<SseRecord>, ClientError> {
        self.buffer.extend_from_slice(chunk);

        let mut records = Vec::new();
        while let Some(pos) = self.buffer.iter().position(|&b| b == b'\n') {
            let line_raw = self.buffer.split_to(pos + 1);
            let line = std::str::from_utf8(&line_raw)
                .map_err(|e| ClientError::Stream(e.to_string()))?
                .trim();

            let Some(data) = line.strip_prefix("data:").map(str::trim_start) else {
                continue;
            };
            if data.is_empty() {
                continue;
            }
            records.push(decode(data)?);
        }
        Ok(records)
    }

    /// Whether unconsumed bytes remain (a truncated frame at end of stream).
    pub fn has_pending(&self) -> bool {
        self.buffer.iter().any(|b| !b.is_ascii_whitespace())
    }
}

fn decode(data: &str) -> Result<SseRecord, ClientError> {
    if data == "[DONE]" {
        return Ok(SseRecord::Done);
    }

    let frame: Frame = serde_json::from_str(data)
        .map_err(|e| ClientError::Stream(format!("JSON parse error: {}", e)))?;

    let event = match frame {
        Frame::Typed(TypedFrame::Chunk { content }) => ChatEvent::Chunk(content),
        Frame::Typed(TypedFrame::Complete(completion)) => ChatEvent::Complete(completion),
        Frame::Error { error } => ChatEvent::Error(error),
    };
    Ok(SseRecord::Event(event))
}
