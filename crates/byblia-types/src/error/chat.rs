//! Errors surfaced by the chat request pipeline.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Generic message shown to clients whenever generation fails for good.
///
/// Raw upstream errors are logged server-side and never forwarded.
pub const GENERIC_GENERATION_ERROR: &str =
    "Failed to process your question. Please try again later.";

/// Errors that can occur while serving a chat or feedback request.
#[derive(Debug, Clone, Error, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", content = "details")]
pub enum ChatError {
    /// Request body failed validation (empty prompt, prompt too long, bad JSON)
    #[error("Invalid request: {message}")]
    Validation { message: String },

    /// Declared origin is not on the allow-list
    #[error("Unauthorized access: {reason}")]
    OriginRejected { reason: String },

    /// Client exceeded its sliding-window budget
    #[error("Too many requests. Please try again in {retry_after_secs}s.")]
    RateLimited { retry_after_secs: u64 },

    /// Model upstream failed on both the streaming and the fallback path
    #[error("Upstream generation failed: {message}")]
    UpstreamGeneration { message: String },

    /// Persistence collaborator failed
    #[error("Persistence error: {message}")]
    Persistence { message: String },

    /// Referenced interaction does not exist
    #[error("Not found: {message}")]
    NotFound { message: String },

    /// Feedback was already recorded with a different value
    #[error("Feedback for interaction {interaction_id} was already recorded")]
    FeedbackConflict { interaction_id: i64 },

    /// In-flight request ceiling reached
    #[error("Server is busy. Please try again shortly.")]
    Overloaded,

    /// Internal error (bugs, unexpected states)
    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl ChatError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation { message: message.into() }
    }

    pub fn persistence(message: impl Into<String>) -> Self {
        Self::Persistence { message: message.into() }
    }

    /// Check if this is a client error (4xx equivalent).
    pub fn is_client_error(&self) -> bool {
        self.http_status_code() < 500
    }

    /// Get HTTP status code for this error.
    pub fn http_status_code(&self) -> u16 {
        match self {
            Self::Validation { .. } => 400,
            Self::OriginRejected { .. } => 403,
            Self::NotFound { .. } => 404,
            Self::FeedbackConflict { .. } => 409,
            Self::RateLimited { .. } => 429,
            Self::UpstreamGeneration { .. } => 502,
            Self::Overloaded => 503,
            Self::Persistence { .. } | Self::Internal { .. } => 500,
        }
    }

    /// Message that is safe to show to an end user.
    ///
    /// Server-side failures collapse to fixed text so that store or upstream
    /// internals never reach the client.
    pub fn client_message(&self) -> String {
        match self {
            Self::UpstreamGeneration { .. } => GENERIC_GENERATION_ERROR.to_string(),
            Self::Persistence { .. } | Self::Internal { .. } => {
                "Internal error while processing the request.".to_string()
            },
            Self::Validation { .. }
            | Self::OriginRejected { .. }
            | Self::RateLimited { .. }
            | Self::NotFound { .. }
            | Self::FeedbackConflict { .. }
            | Self::Overloaded => self.to_string(),
        }
    }
}
