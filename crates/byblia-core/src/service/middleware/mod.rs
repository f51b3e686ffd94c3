// Middleware module - request admission

mod client_key;
pub mod cors;
mod in_flight;
mod origin;
mod rate_limit;

pub use client_key::{client_key, ClientKey};
pub use cors::cors_layer;
pub use in_flight::in_flight_middleware;
pub use origin::origin_middleware;
pub use rate_limit::rate_limit_middleware;
