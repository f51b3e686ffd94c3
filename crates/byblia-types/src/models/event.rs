//! Events produced by a generation session and consumed by the stream framer.

use serde::{Deserialize, Serialize};

use super::chat::ChatMessage;
use super::interaction::InteractionId;

/// Divisor of the character-count token estimate.
pub const CHARS_PER_TOKEN: usize = 4;

/// Where a token count came from.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum UsageSource {
    /// Counted by the model upstream
    Reported,
    /// Approximated as `ceil(chars / CHARS_PER_TOKEN)`
    Estimated,
}

/// Token usage of one exchange, tagged with its provenance.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct TokenUsage {
    pub total: u32,
    pub source: UsageSource,
}

impl TokenUsage {
    pub fn reported(total: u32) -> Self {
        Self { total, source: UsageSource::Reported }
    }

    /// Approximate usage from the amount of text exchanged.
    ///
    /// This is a rough heuristic for when the upstream omits usage; it is not a tokenizer.
    pub fn estimate(text: &str) -> Self {
        let chars = text.chars().count();
        let total = chars.div_ceil(CHARS_PER_TOKEN);
        Self { total: u32::try_from(total).unwrap_or(u32::MAX), source: UsageSource::Estimated }
    }

    pub fn is_estimated(&self) -> bool {
        self.source == UsageSource::Estimated
    }
}

/// Metadata carried by the terminal success event.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionMeta {
    pub token_usage: TokenUsage,
    pub temperature: f64,
    pub interaction_id: InteractionId,
    /// Conversation context including this exchange, when history is enabled.
    pub message_history: Option<Vec<ChatMessage>>,
}

/// One event of a session's output, in emission order.
#[derive(Debug, Clone, PartialEq)]
pub enum StreamEvent {
    Fragment(String),
    Completion(CompletionMeta),
    Error(String),
}

impl StreamEvent {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completion(_) | Self::Error(_))
    }
}
