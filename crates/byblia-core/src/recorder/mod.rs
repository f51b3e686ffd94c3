//! Commits finished exchanges and handles out-of-band feedback.

use std::sync::Arc;
use std::time::Duration;

use byblia_types::{ChatError, FeedbackOutcome, InteractionId, InteractionRecord, NewInteraction};

use crate::store::{InteractionStore, StoreResult};
use crate::utils::prompt_preview;


/// Persists interactions without ever failing the caller.
#[derive(Clone)]
pub struct InteractionRecorder {
    store: Arc<dyn InteractionStore>,
    record_timeout: Duration,
}

impl InteractionRecorder {
    pub fn new(store: Arc<dyn InteractionStore>, record_timeout: Duration) -> Self {
        Self { store, record_timeout }
    }

    pub fn store(&self) -> &Arc<dyn InteractionStore> {
        &self.store
    }

    /// Persist one exchange and return its identifier, or the sentinel.
    ///
    /// The write runs in its own task: once started it completes even if the
    /// caller goes away. The caller waits at most `record_timeout`; a late or
    /// failed write yields `InteractionId::SENTINEL`.
    ///
    /// `interaction_number` is `count + 1` read just before the insert. Two
    /// concurrent writers can observe the same count, so the number is an
    /// ordinal hint only.
    pub async fn record(&self, interaction: NewInteraction) -> InteractionId {
        let store = Arc::clone(&self.store);
        let preview = prompt_preview(&interaction.user_prompt);

        let write = tokio::spawn(async move { persist(store.as_ref(), &interaction).await });

        match tokio::time::timeout(self.record_timeout, write).await {
            Ok(Ok(Ok(id))) => {
                tracing::info!(interaction_id = id, prompt = %preview, "Interaction recorded");
                InteractionId(id)
            },
            Ok(Ok(Err(e))) => {
                tracing::error!(error = %e, prompt = %preview, "Failed to record interaction");
                InteractionId::SENTINEL
            },
            Ok(Err(e)) => {
                tracing::error!(error = %e, "Interaction record task failed");
                InteractionId::SENTINEL
            },
            Err(_) => {
                tracing::warn!(
                    timeout_ms = self.record_timeout.as_millis() as u64,
                    prompt = %preview,
                    "Interaction record still pending, reporting sentinel id"
                );
                InteractionId::SENTINEL
            },
        }
    }

    /// Attach feedback to a stored interaction, at most once.
    pub async fn attach_feedback(
        &self,
        interaction_id: i64,
        feedback: bool,
    ) -> Result<FeedbackOutcome, ChatError> {
        if InteractionId(interaction_id).is_sentinel() {
            return Err(ChatError::validation("interactionId must be a positive integer"));
        }

        let outcome = self.store.set_feedback(interaction_id, feedback).await.map_err(|e| {
            tracing::error!(interaction_id, error = %e, "Failed to store feedback");
            ChatError::persistence(e.to_string())
        })?;

        match outcome {
            FeedbackOutcome::Recorded | FeedbackOutcome::Unchanged => {
                tracing::info!(interaction_id, feedback, ?outcome, "Feedback processed");
                Ok(outcome)
            },
            FeedbackOutcome::NotFound => Err(ChatError::NotFound {
                message: format!("Interaction {} not found", interaction_id),
            }),
            FeedbackOutcome::Conflict { existing } => {
                tracing::warn!(interaction_id, existing, requested = feedback, "Feedback conflict");
                Err(ChatError::FeedbackConflict { interaction_id })
            },
        }
    }

    /// Newest interactions first.
    pub async fn recent(&self, limit: i64) -> Result<Vec<InteractionRecord>, ChatError> {
        self.store.recent(limit).await.map_err(|e| {
            tracing::error!(error = %e, "Failed to list interactions");
            ChatError::persistence(e.to_string())
        })
    }
}

async fn persist(store: &dyn InteractionStore, interaction: &NewInteraction) -> StoreResult<i64> {
    let count = store.count().await?;
    let interaction_number = i32::try_from(count.saturating_add(1)).unwrap_or(i32::MAX);
    store.insert(interaction, interaction_number).await
}
