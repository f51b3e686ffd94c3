//! Aggregate service configuration.

use serde::{Deserialize, Serialize};
use validator::Validate;

use super::database::DatabaseConfig;
use super::generation::{ModelConfig, SessionConfig, StreamConfig};
use super::guard::{OriginConfig, RateLimitConfig};
use super::server::ServerConfig;
use crate::error::ConfigError;

/// Full service configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub rate_limit: RateLimitConfig,
    #[serde(default)]
    pub origin: OriginConfig,
    #[serde(default)]
    pub model: ModelConfig,
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default)]
    pub stream: StreamConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
}

impl AppConfig {
    /// Validate every section plus the cross-field rules.
    pub fn validate_all(&self) -> Result<(), ConfigError> {
        check("server", self.server.validate())?;
        check("rate_limit", self.rate_limit.validate())?;
        check("origin", self.origin.validate())?;
        check("model", self.model.validate())?;
        check("session", self.session.validate())?;
        check("stream", self.stream.validate())?;
        check("database", self.database.validate())?;

        if self.session.min_temperature > self.session.max_temperature {
            return Err(ConfigError::ValidationError {
                field: "session.min_temperature".to_string(),
                message: format!(
                    "must not exceed max_temperature ({} > {})",
                    self.session.min_temperature, self.session.max_temperature
                ),
            });
        }

        if !self.origin.disabled && self.origin.effective_origins().is_empty() {
            return Err(ConfigError::ValidationError {
                field: "origin.allowed_origins".to_string(),
                message: "allow-list is empty and the origin check is enabled".to_string(),
            });
        }

        Ok(())
    }
}

fn check(
    section: &str,
    result: Result<(), validator::ValidationErrors>,
) -> Result<(), ConfigError> {
    result.map_err(|errors| ConfigError::from_validation(section, &errors))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert_eq!(AppConfig::default().validate_all(), Ok(()));
    }

    #[test]
    fn test_inverted_temperature_range_is_rejected() {
        let mut config = AppConfig::default();
        config.session.min_temperature = 0.9;
        config.session.max_temperature = 0.3;

        let err = config.validate_all().unwrap_err();
        assert!(matches!(
            err,
            ConfigError::ValidationError { ref field, .. } if field == "session.min_temperature"
        ));
    }

    #[test]
    fn test_zero_rate_limit_is_rejected() {
        let mut config = AppConfig::default();
        config.rate_limit.max_requests = 0;

        let err = config.validate_all().unwrap_err();
        assert!(err.to_string().contains("rate_limit.max_requests"));
    }

    #[test]
    fn test_bad_base_url_is_rejected() {
        let mut config = AppConfig::default();
        config.model.base_url = "not a url".to_string();
        assert!(config.validate_all().is_err());
    }

    #[test]
    fn test_empty_allow_list_needs_disabled_check() {
        let mut config = AppConfig::default();
        config.origin.allowed_origins.clear();
        assert!(config.validate_all().is_err());

        config.origin.disabled = true;
        assert!(config.validate_all().is_ok());
    }
}
