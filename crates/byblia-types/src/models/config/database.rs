//! Persistence configuration.

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Interaction store configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Validate)]
pub struct DatabaseConfig {
    /// PostgreSQL connection URL; `None` selects the in-memory store
    #[serde(default)]
    pub url: Option<String>,
    /// Pool size
    #[validate(range(min = 1_u32, max = 100_u32))]
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_max_connections() -> u32 {
    10
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self { url: None, max_connections: default_max_connections() }
    }
}
