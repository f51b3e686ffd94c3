use async_trait::async_trait;
use chrono::Utc;
use parking_lot::RwLock;

use byblia_types::{FeedbackOutcome, InteractionRecord, NewInteraction};

use super::{resolve_feedback, InteractionStore, StoreResult};

/// Process-local store for development without a database and for tests.
#[derive(Debug, Default)]
pub struct MemoryInteractionStore {
    records: RwLock<Vec<InteractionRecord>>,
}

impl MemoryInteractionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: i64) -> Option<InteractionRecord> {
        self.records.read().iter().find(|r| r.id == id).cloned()
    }

    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }
}

#[async_trait]
impl InteractionStore for MemoryInteractionStore {
    async fn count(&self) -> StoreResult<i64> {
        Ok(self.records.read().len() as i64)
    }

    async fn insert(
        &self,
        interaction: &NewInteraction,
        interaction_number: i32,
    ) -> StoreResult<i64> {
        let mut records = self.records.write();
        let id = records.last().map_or(1, |last| last.id + 1);
        records.push(InteractionRecord {
            id,
            user_prompt: interaction.user_prompt.clone(),
            model: interaction.model.clone(),
            timestamp: Utc::now(),
            temperature: interaction.temperature,
            message: interaction.message.clone(),
            token_usage: i32::try_from(interaction.token_usage).unwrap_or(i32::MAX),
            interaction_number,
            user_feedback: None,
        });
        Ok(id)
    }

    async fn set_feedback(&self, id: i64, feedback: bool) -> StoreResult<FeedbackOutcome> {
        let mut records = self.records.write();
        let Some(record) = records.iter_mut().find(|r| r.id == id) else {
            return Ok(FeedbackOutcome::NotFound);
        };

        let outcome = resolve_feedback(record.user_feedback, feedback);
        if outcome == FeedbackOutcome::Recorded {
            record.user_feedback = Some(feedback);
        }
        Ok(outcome)
    }

    async fn recent(&self, limit: i64) -> StoreResult<Vec<InteractionRecord>> {
        let limit = usize::try_from(limit).unwrap_or(0);
        Ok(self.records.read().iter().rev().take(limit).cloned().collect())
    }

    fn backend(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_name() {
        assert_eq!(MemoryInteractionStore::new().backend(), "memory");
    }

    fn interaction(prompt: &str) -> NewInteraction {
        NewInteraction {
            user_prompt: prompt.to_string(),
            model: "deepseek-chat".to_string(),
            temperature: 0.4,
            message: "resposta".to_string(),
            token_usage: 12,
        }
    }

    #[tokio::test]
    async fn test_insert_assigns_increasing_ids() {
        let store = MemoryInteractionStore::new();
        assert_eq!(store.insert(&interaction("a"), 1).await.unwrap(), 1);
        assert_eq!(store.insert(&interaction("b"), 2).await.unwrap(), 2);
        assert_eq!(store.count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_feedback_is_written_once() {
        let store = MemoryInteractionStore::new();
        let id = store.insert(&interaction("a"), 1).await.unwrap();

        assert_eq!(store.set_feedback(id, true).await.unwrap(), FeedbackOutcome::Recorded);
        assert_eq!(store.set_feedback(id, true).await.unwrap(), FeedbackOutcome::Unchanged);
        assert_eq!(
            store.set_feedback(id, false).await.unwrap(),
            FeedbackOutcome::Conflict { existing: true }
        );
        assert_eq!(store.get(id).unwrap().user_feedback, Some(true));
        assert_eq!(store.set_feedback(99, true).await.unwrap(), FeedbackOutcome::NotFound);
    }

    #[tokio::test]
    async fn test_recent_is_newest_first() {
        let store = MemoryInteractionStore::new();
        for prompt in ["a", "b", "c"] {
            let number = store.count().await.unwrap() as i32 + 1;
            store.insert(&interaction(prompt), number).await.unwrap();
        }

        let recent = store.recent(2).await.unwrap();
        let prompts: Vec<_> = recent.iter().map(|r| r.user_prompt.as_str()).collect();
        assert_eq!(prompts, vec!["c", "b"]);
        assert_eq!(recent[0].interaction_number, 3);
    }
}
