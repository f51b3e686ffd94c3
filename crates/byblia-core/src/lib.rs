//! # Byblia Core
//!
//! Request pipeline of the Byblia chat service.
//!
//! ## Architecture
//!
//! ```text
//! byblia-core/src/
//! ├── guard/      # sliding-window RateLimiter + OriginGuard
//! ├── session/    # GenerationSession state machine, request validation
//! ├── stream/     # CoalescingBuffer, StreamFramer, SSE response builder
//! ├── recorder/   # InteractionRecorder (commit + feedback)
//! ├── agent/      # ModelAgent trait + OpenAI-compatible client
//! ├── store/      # InteractionStore trait + Postgres / in-memory
//! └── service/    # axum router, middleware, handlers
//! ```
//!
//! Control flow of `POST /chat`:
//! origin guard → rate limiter → validation → session → framer → client,
//! with the recorder committing the exchange before the completion frame.

#![allow(
    clippy::significant_drop_tightening,
    reason = "DashMap and parking_lot guards are scoped to the check-and-record step"
)]
#![allow(
    clippy::derive_partial_eq_without_eq,
    reason = "Some types intentionally don't implement Eq"
)]
// Test-only lints: allow panic!, unwrap, float comparisons in test code
#![cfg_attr(
    test,
    allow(
        clippy::panic,
        clippy::unwrap_used,
        clippy::float_cmp,
        clippy::assertions_on_result_states
    )
)]

pub mod agent;
pub mod guard;
pub mod recorder;
pub mod service;
pub mod session;
pub mod store;
pub mod stream;
pub mod utils;

#[cfg(test)]
mod test_support;

pub use agent::{ModelAgent, OpenAiCompatibleAgent};
pub use guard::{OriginGuard, RateLimiter};
pub use recorder::InteractionRecorder;
pub use service::{build_router, AppState};
pub use session::GenerationSession;
pub use store::{InteractionStore, MemoryInteractionStore, PostgresInteractionStore};
pub use stream::StreamFramer;
