//! Persisted interaction records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Identifier assigned by the persistence store.
///
/// `InteractionId::SENTINEL` (0) means "no persisted record available";
/// clients receive it instead of an error when persistence fails or is late.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(transparent)]
pub struct InteractionId(pub i64);

impl InteractionId {
    pub const SENTINEL: Self = Self(0);

    pub fn is_sentinel(&self) -> bool {
        self.0 <= 0
    }

    pub fn value(&self) -> i64 {
        self.0
    }
}

impl Default for InteractionId {
    fn default() -> Self {
        Self::SENTINEL
    }
}

impl std::fmt::Display for InteractionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Exchange to be persisted once a session completes.
#[derive(Debug, Clone, PartialEq)]
pub struct NewInteraction {
    pub user_prompt: String,
    pub model: String,
    pub temperature: f64,
    pub message: String,
    pub token_usage: u32,
}

/// Stored interaction as read back from the store.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InteractionRecord {
    pub id: i64,
    pub user_prompt: String,
    pub model: String,
    pub timestamp: DateTime<Utc>,
    pub temperature: f64,
    pub message: String,
    pub token_usage: i32,
    /// Best-effort ordinal read as `count + 1` before insert; not unique under concurrency.
    pub interaction_number: i32,
    pub user_feedback: Option<bool>,
}

/// Result of attaching feedback to a record.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case", tag = "outcome")]
pub enum FeedbackOutcome {
    /// Feedback stored for the first time
    Recorded,
    /// Same value was already stored; nothing changed
    Unchanged,
    /// No record with this identifier
    NotFound,
    /// A different value was already stored
    Conflict { existing: bool },
}
