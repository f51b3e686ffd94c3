//! Persistence collaborator for interaction records.

mod memory;
mod postgres;

use async_trait::async_trait;
use byblia_types::{FeedbackOutcome, InteractionRecord, NewInteraction};

pub use memory::MemoryInteractionStore;
pub use postgres::PostgresInteractionStore;

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(String),
    #[error("Migration error: {0}")]
    Migration(String),
    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

#[async_trait]
pub trait InteractionStore: Send + Sync {
    /// Total number of stored interactions.
    async fn count(&self) -> StoreResult<i64>;

    /// Insert a record with the given ordinal; returns the assigned id.
    async fn insert(&self, interaction: &NewInteraction, interaction_number: i32)
        -> StoreResult<i64>;

    /// Store feedback unless a value is already present.
    async fn set_feedback(&self, id: i64, feedback: bool) -> StoreResult<FeedbackOutcome>;

    /// Newest records first.
    async fn recent(&self, limit: i64) -> StoreResult<Vec<InteractionRecord>>;

    /// Short backend name for logs.
    fn backend(&self) -> &'static str;
}

/// Pick the stored feedback outcome given the current value.
pub(crate) fn resolve_feedback(current: Option<bool>, requested: bool) -> FeedbackOutcome {
    match current {
        None => FeedbackOutcome::Recorded,
        Some(existing) if existing == requested => FeedbackOutcome::Unchanged,
        Some(existing) => FeedbackOutcome::Conflict { existing },
    }
}
