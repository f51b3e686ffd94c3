use serde::Deserialize;

pub use byblia_types::{ChatMessage, FeedbackResponse, InteractionRecord, MessageRole};

/// Metadata of the terminal `complete` frame.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Completion {
    pub token_usage: u32,
    pub temperature: f64,
    pub interaction_id: i64,
    #[serde(default)]
    pub message_history: Option<Vec<ChatMessage>>,
}

/// One decoded event of a `/chat` stream.
#[derive(Debug, Clone, PartialEq)]
pub enum ChatEvent {
    Chunk(String),
    Complete(Completion),
    /// In-stream failure reported by the server
    Error(String),
}

#[derive(Debug, Clone)]
pub struct RetryConfig {
    pub max_retries: u32,
    pub base_delay_ms: u64,
    pub max_delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self { max_retries: 2, base_delay_ms: 500, max_delay_ms: 10_000 }
    }
}

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: String,
    /// Sent as the `Origin` header; production servers reject requests without one
    pub origin: Option<String>,
    pub timeout_secs: u64,
    pub retry: RetryConfig,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8000".to_string(),
            origin: None,
            timeout_secs: 120,
            retry: RetryConfig::default(),
        }
    }
}
