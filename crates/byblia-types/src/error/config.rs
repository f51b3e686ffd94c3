//! Configuration-related errors.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur while assembling the service configuration.
#[derive(Debug, Clone, Error, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", content = "details")]
pub enum ConfigError {
    /// A required setting was not provided
    #[error("Missing required setting: {key}")]
    Missing {
        /// Environment variable or config key that was expected
        key: String,
    },

    /// A setting could not be parsed
    #[error("Config parse error: {message}")]
    ParseError {
        /// Description of the parse failure
        message: String,
    },

    /// Config validation error (invalid values)
    #[error("Config validation error for {field}: {message}")]
    ValidationError {
        /// Name of the field that failed validation
        field: String,
        /// Description of the validation failure
        message: String,
    },
}

impl ConfigError {
    /// Flatten `validator` errors into the first offending field.
    pub fn from_validation(section: &str, errors: &validator::ValidationErrors) -> Self {
        let (field, message) = errors
            .field_errors()
            .into_iter()
            .next()
            .map(|(field, errs)| {
                let message = errs
                    .first()
                    .and_then(|e| e.message.as_ref().map(|m| m.to_string()))
                    .or_else(|| errs.first().map(|e| e.code.to_string()))
                    .unwrap_or_else(|| "invalid value".to_string());
                (format!("{}.{}", section, field), message)
            })
            .unwrap_or_else(|| (section.to_string(), errors.to_string()));

        Self::ValidationError { field, message }
    }
}
