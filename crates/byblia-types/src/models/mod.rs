//! Core domain models for Byblia.
//!
//! Shared data structures used by the server, the client SDK and the tests.

mod chat;
pub mod config;
mod event;
mod interaction;

pub use chat::{
    ChatMessage, ChatRequest, FeedbackRequest, FeedbackResponse, InteractionsQuery, MessageRole,
};
pub use config::AppConfig;
pub use event::{CompletionMeta, StreamEvent, TokenUsage, UsageSource, CHARS_PER_TOKEN};
pub use interaction::{FeedbackOutcome, InteractionId, InteractionRecord, NewInteraction};
