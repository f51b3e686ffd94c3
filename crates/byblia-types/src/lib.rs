//! # Byblia Types
//!
//! Core types, models, and error definitions for the Byblia chat service.
//!
//! - **`error`** - Typed error hierarchy for the request pipeline and configuration
//! - **`models`** - Wire DTOs, stream events, interaction records and configuration
//!
//! ## Architecture Role
//!
//! `byblia-types` sits at the bottom of the dependency graph:
//!
//! ```text
//!                byblia-types (this crate)
//!                        │
//!           ┌────────────┴────────────┐
//!           ▼                         ▼
//!      byblia-core              byblia-client
//!           │                         │
//!           └────────────┬────────────┘
//!                        ▼
//!                  byblia-server
//! ```

pub mod error;
pub mod models;

pub use error::{ChatError, ConfigError, GENERIC_GENERATION_ERROR};

pub use models::{
    AppConfig, ChatMessage, ChatRequest, CompletionMeta, FeedbackOutcome, FeedbackRequest,
    FeedbackResponse, InteractionId, InteractionRecord, MessageRole, NewInteraction, StreamEvent,
    TokenUsage, UsageSource,
};
