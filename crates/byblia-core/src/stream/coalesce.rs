/// Small accumulator that batches fragments into fewer frames.
///
/// Text is released as soon as the buffer holds `max_chars` characters or a
/// word/sentence boundary. With `max_chars <= 1` every push passes through.
#[derive(Debug, Default)]
pub struct CoalescingBuffer {
    buf: String,
    chars: usize,
    max_chars: usize,
}

impl CoalescingBuffer {
    pub fn new(max_chars: usize) -> Self {
        Self { buf: String::new(), chars: 0, max_chars }
    }

    pub fn is_enabled(&self) -> bool {
        self.max_chars > 1
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Append `text`, returning the buffered contents if a flush is due.
    pub fn push(&mut self, text: &str) -> Option<String> {
        if text.is_empty() {
            return None;
        }
        if !self.is_enabled() {
            return Some(text.to_string());
        }

        self.buf.push_str(text);
        self.chars += text.chars().count();

        if self.chars >= self.max_chars || text.chars().any(is_boundary) {
            return self.flush();
        }
        None
    }

    /// Take whatever is buffered.
    pub fn flush(&mut self) -> Option<String> {
        if self.buf.is_empty() {
            return None;
        }
        self.chars = 0;
        Some(std::mem::take(&mut self.buf))
    }
}

fn is_boundary(c: char) -> bool {
    c.is_whitespace()
        || matches!(c, '.' | ',' | ';' | ':' | '!' | '?' | ')' | ']' | '}' | '"' | '\'' | '»' | '”')
}
