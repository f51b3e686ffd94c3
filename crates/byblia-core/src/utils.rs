//! Log-safe text helpers.

/// Characters of a prompt shown in logs.
pub const PROMPT_PREVIEW_CHARS: usize = 60;

/// Characters of an upstream error body kept in logs.
pub const UPSTREAM_BODY_LOG_CHARS: usize = 500;

/// Truncate to `max_chars` characters, appending an ellipsis when cut.
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}

pub fn prompt_preview(prompt: &str) -> String {
    truncate_chars(prompt, PROMPT_PREVIEW_CHARS)
}
