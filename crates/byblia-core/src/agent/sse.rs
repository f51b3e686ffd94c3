use bytes::BytesMut;

use super::AgentError;

const MAX_BUFFER_SIZE: usize = 10 * 1024 * 1024;

/// Parse a single SSE line into a `(field, value)` pair.
pub fn parse_sse_line(line: &str) -> Option<(&str, &str)> {
    let colon_pos = line.find(':')?;
    let key = &line[..colon_pos];
    let value = line[colon_pos + 1..].trim_start();
    Some((key, value))
}

/// Reassembles `data:` payloads from arbitrarily split network chunks.
#[derive(Debug, Default)]
pub struct SseLineDecoder {
    buffer: BytesMut,
}

impl SseLineDecoder {
    /// Feed raw bytes; returns every complete `data:` payload now available.
    pub fn feed(&mut self, chunk: &[u8]) -> Result<Vec<String>, AgentError> {
        self.buffer.extend_from_slice(chunk);
        if self.buffer.len() > MAX_BUFFER_SIZE {
            return Err(AgentError::Decode(format!(
                "SSE buffer exceeded {}MB without a line break",
                MAX_BUFFER_SIZE / 1024 / 1024
            )));
        }

        let mut payloads = Vec::new();
        while let Some(pos) = self.buffer.iter().position(|&b| b == b'\n') {
            let line_raw = self.buffer.split_to(pos + 1);
            let Ok(line) = std::str::from_utf8(&line_raw) else {
                tracing::warn!("SSE line UTF-8 decode error | {} bytes", line_raw.len());
                continue;
            };
            if let Some(data) = data_payload(line) {
                payloads.push(data.to_string());
            }
        }
        Ok(payloads)
    }

    /// Payload of a trailing line that arrived without a newline.
    pub fn finish(&mut self) -> Option<String> {
        let rest = self.buffer.split();
        std::str::from_utf8(&rest).ok().and_then(data_payload).map(str::to_string)
    }
}

fn data_payload(line: &str) -> Option<&str> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }
    match parse_sse_line(line)? {
        ("data", value) => Some(value),
        _ => None,
    }
}
