//! Service configuration models.

mod app;
mod database;
mod generation;
mod guard;
mod server;

pub use app::AppConfig;
pub use database::DatabaseConfig;
pub use generation::{ModelConfig, SessionConfig, StreamConfig};
pub use guard::{OriginConfig, RateLimitConfig, DEVELOPMENT_ORIGINS};
pub use server::ServerConfig;
