//! Model upstream, session and streaming configuration.

use serde::{Deserialize, Serialize};
use validator::Validate;

/// OpenAI-compatible model upstream.
#[derive(Clone, Serialize, Deserialize, PartialEq, Eq, Validate)]
pub struct ModelConfig {
    /// Model identifier sent upstream and persisted with each interaction
    #[validate(length(min = 1_u64))]
    pub model_id: String,
    /// Bearer token for the upstream
    #[serde(default, skip_serializing)]
    pub api_key: String,
    /// Base URL; `/chat/completions` is appended
    #[validate(url)]
    pub base_url: String,
    /// Optional system instruction prepended to every generation
    #[serde(default)]
    pub system_prompt: Option<String>,
    /// Bound on a single-shot completion and on waiting for stream headers, in seconds
    #[validate(range(min = 1_u64, max = 3600_u64))]
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
    /// Longest silence tolerated between two reads of a streamed answer, in seconds
    #[validate(range(min = 1_u64, max = 600_u64))]
    #[serde(default = "default_stream_idle_timeout")]
    pub stream_idle_timeout_secs: u64,
}

fn default_request_timeout() -> u64 {
    120
}

fn default_stream_idle_timeout() -> u64 {
    30
}

impl std::fmt::Debug for ModelConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelConfig")
            .field("model_id", &self.model_id)
            .field("api_key", &if self.api_key.is_empty() { "<unset>" } else { "<redacted>" })
            .field("base_url", &self.base_url)
            .field("system_prompt", &self.system_prompt.as_ref().map(|p| p.len()))
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("stream_idle_timeout_secs", &self.stream_idle_timeout_secs)
            .finish()
    }
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            model_id: "deepseek-chat".to_string(),
            api_key: String::new(),
            base_url: "https://api.deepseek.com".to_string(),
            system_prompt: None,
            request_timeout_secs: default_request_timeout(),
            stream_idle_timeout_secs: default_stream_idle_timeout(),
        }
    }
}

/// Per-request generation behaviour.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Validate)]
pub struct SessionConfig {
    /// Lower bound of the sampled temperature
    #[validate(range(min = 0.0, max = 2.0))]
    pub min_temperature: f64,
    /// Upper bound of the sampled temperature
    #[validate(range(min = 0.0, max = 2.0))]
    pub max_temperature: f64,
    /// Temperature used by the non-streaming fallback; `None` reuses the sampled one
    #[validate(range(min = 0.0, max = 2.0))]
    #[serde(default)]
    pub fallback_temperature: Option<f64>,
    /// Maximum prompt length in characters (after trimming)
    #[validate(range(min = 1_usize))]
    pub max_prompt_chars: usize,
    /// Echo the updated conversation context in the completion event
    #[serde(default = "default_true")]
    pub history_enabled: bool,
    /// Bound on prior messages accepted and echoed back
    #[validate(range(min = 2_usize, max = 200_usize))]
    pub max_history_messages: usize,
    /// How long the session waits for the store before reporting the sentinel id
    #[validate(range(min = 1_u64))]
    pub record_timeout_ms: u64,
}

fn default_true() -> bool {
    true
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            min_temperature: 0.2,
            max_temperature: 1.0,
            fallback_temperature: None,
            max_prompt_chars: 4000,
            history_enabled: true,
            max_history_messages: 20,
            record_timeout_ms: 5000,
        }
    }
}

/// Outbound framing and pacing.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Validate)]
pub struct StreamConfig {
    /// Coalescing buffer size in characters; 0 or 1 sends every fragment as-is
    #[validate(range(max = 256_usize))]
    pub coalesce_max_chars: usize,
    /// Chunk size used to replay a non-streaming fallback answer
    #[validate(range(min = 1_usize, max = 4096_usize))]
    pub fallback_chunk_chars: usize,
    /// Pause between replayed fallback chunks; 0 disables pacing
    #[validate(range(max = 1000_u64))]
    pub fallback_chunk_delay_ms: u64,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self { coalesce_max_chars: 8, fallback_chunk_chars: 8, fallback_chunk_delay_ms: 15 }
    }
}
