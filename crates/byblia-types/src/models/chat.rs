//! Request/response bodies of the public HTTP API.

use serde::{Deserialize, Serialize};

/// Author of a message in the conversation context.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    System,
    User,
    Assistant,
}

/// One prior message carried as conversational context.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChatMessage {
    pub role: MessageRole,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self { role: MessageRole::User, content: content.into() }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self { role: MessageRole::Assistant, content: content.into() }
    }
}

/// Body of `POST /chat`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChatRequest {
    pub prompt: String,
    #[serde(
        default,
        rename = "messageHistory",
        alias = "message_history",
        skip_serializing_if = "Option::is_none"
    )]
    pub message_history: Option<Vec<ChatMessage>>,
}

impl ChatRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self { prompt: prompt.into(), message_history: None }
    }
}

/// Body of `POST /feedback`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct FeedbackRequest {
    #[serde(rename = "interactionId", alias = "interaction_id")]
    pub interaction_id: i64,
    pub feedback: bool,
}

/// Response of `POST /feedback`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FeedbackResponse {
    pub success: bool,
    pub message: String,
}

/// Query string of `GET /interactions`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct InteractionsQuery {
    #[serde(default = "default_limit")]
    pub limit: i64,
}

fn default_limit() -> i64 {
    10
}

impl Default for InteractionsQuery {
    fn default() -> Self {
        Self { limit: default_limit() }
    }
}
