//! Typed error definitions for Byblia.
//!
//! All errors are:
//!
//! - **Serializable** for API responses via serde
//! - **Displayable** for logging via Display trait
//! - **Matchable** for error handling logic via enum variants

mod chat;
mod config;

pub use chat::{ChatError, GENERIC_GENERATION_ERROR};
pub use config::ConfigError;
