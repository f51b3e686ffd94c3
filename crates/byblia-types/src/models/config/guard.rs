//! Abuse-protection configuration: sliding-window rate limit and origin allow-list.

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Loopback origins accepted in development mode.
pub const DEVELOPMENT_ORIGINS: &[&str] = &[
    "localhost:3000",
    "127.0.0.1:3000",
    "localhost:5173",
    "127.0.0.1:5173",
    "localhost:8000",
    "127.0.0.1:8000",
];

/// Per-client sliding-window rate limit.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Validate)]
pub struct RateLimitConfig {
    /// Requests allowed per client key inside one window
    #[validate(range(min = 1_u32))]
    pub max_requests: u32,
    /// Window length in seconds
    #[validate(range(min = 1_u64))]
    pub window_secs: u64,
    /// Period of the background sweep that evicts idle keys, in seconds
    #[validate(range(min = 1_u64))]
    pub sweep_interval_secs: u64,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self { max_requests: 5, window_secs: 60, sweep_interval_secs: 300 }
    }
}

/// Origin allow-list.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Validate)]
pub struct OriginConfig {
    /// Entries matched by substring against the declared origin
    pub allowed_origins: Vec<String>,
    /// Development mode: loopback origins allowed, absent origin accepted
    #[serde(default)]
    pub development: bool,
    /// Skip the check entirely
    #[serde(default)]
    pub disabled: bool,
}

impl OriginConfig {
    /// Allow-list including the development loopback origins when enabled.
    pub fn effective_origins(&self) -> Vec<String> {
        let mut origins: Vec<String> =
            self.allowed_origins.iter().filter(|o| !o.trim().is_empty()).cloned().collect();
        if self.development {
            origins.extend(DEVELOPMENT_ORIGINS.iter().map(|o| (*o).to_string()));
        }
        origins
    }
}

impl Default for OriginConfig {
    fn default() -> Self {
        Self {
            allowed_origins: vec!["byblia.vercel.app".to_string()],
            development: false,
            disabled: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_development_extends_allow_list() {
        let config = OriginConfig { development: true, ..OriginConfig::default() };
        let origins = config.effective_origins();
        assert!(origins.contains(&"byblia.vercel.app".to_string()));
        assert!(origins.contains(&"localhost:5173".to_string()));
    }

    #[test]
    fn test_blank_entries_are_ignored() {
        let config = OriginConfig {
            allowed_origins: vec![String::new(), " ".to_string(), "example.org".to_string()],
            ..OriginConfig::default()
        };
        assert_eq!(config.effective_origins(), vec!["example.org".to_string()]);
    }
}
