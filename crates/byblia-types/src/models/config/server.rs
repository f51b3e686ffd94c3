//! Listening socket configuration.

use serde::{Deserialize, Serialize};
use validator::Validate;

/// HTTP listener configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Validate)]
pub struct ServerConfig {
    /// Bind host
    #[validate(length(min = 1_u64))]
    pub host: String,
    /// Bind port
    #[validate(range(min = 1_u16))]
    pub port: u16,
    /// TCP keep-alive idle time for accepted connections, in seconds
    #[serde(default = "default_keep_alive")]
    pub keep_alive_secs: u64,
    /// Ceiling on concurrently handled requests
    #[validate(range(min = 1_usize))]
    #[serde(default = "default_max_concurrency")]
    pub max_concurrency: usize,
    /// Listen backlog
    #[validate(range(min = 1_i32))]
    #[serde(default = "default_backlog")]
    pub backlog: i32,
}

impl ServerConfig {
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn default_keep_alive() -> u64 {
    120
}

fn default_max_concurrency() -> usize {
    50
}

fn default_backlog() -> i32 {
    100
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            keep_alive_secs: default_keep_alive(),
            max_concurrency: default_max_concurrency(),
            backlog: default_backlog(),
        }
    }
}
