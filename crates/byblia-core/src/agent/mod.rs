//! Model-agent collaborator: the upstream that actually writes the answers.
//!
//! The session only needs two calls: an incremental stream of text and a
//! one-shot completion used as fallback. [`OpenAiCompatibleAgent`] speaks the
//! `/chat/completions` dialect shared by DeepSeek, OpenAI and friends.

mod openai;
mod sse;

use std::pin::Pin;

use async_trait::async_trait;
use futures::Stream;

use byblia_types::ChatMessage;

pub use openai::OpenAiCompatibleAgent;
pub use sse::{parse_sse_line, SseLineDecoder};

/// Inputs of one generation call.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    pub prompt: String,
    /// Prior conversation, oldest first
    pub history: Vec<ChatMessage>,
    pub temperature: f64,
}

/// One item of an incremental generation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AgentChunk {
    Text(String),
    /// Total tokens reported by the upstream, usually after the last text
    Usage(u32),
}

/// Result of a non-streaming call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentCompletion {
    pub text: String,
    pub usage: Option<u32>,
}

/// Incremental output. Dropping it releases the upstream connection.
pub type GenerationHandle = Pin<Box<dyn Stream<Item = Result<AgentChunk, AgentError>> + Send>>;

#[derive(Debug, thiserror::Error)]
pub enum AgentError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Upstream returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Upstream error payload: {0}")]
    Upstream(String),

    #[error("Failed to decode upstream response: {0}")]
    Decode(String),

    #[error("Upstream returned an empty response")]
    EmptyResponse,

    #[error("Upstream did not answer within {0:?}")]
    Timeout(std::time::Duration),
}

#[async_trait]
pub trait ModelAgent: Send + Sync {
    /// Identifier persisted with each interaction.
    fn model_id(&self) -> &str;

    async fn stream(&self, request: &GenerationRequest) -> Result<GenerationHandle, AgentError>;

    async fn complete(&self, request: &GenerationRequest) -> Result<AgentCompletion, AgentError>;
}
