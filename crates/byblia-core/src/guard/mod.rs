//! Request admission: sliding-window rate limiting and origin allow-listing.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  RateLimiter                                                 │
//! │  ├── windows: DashMap<String, VecDeque<Instant>>            │
//! │  ├── sweeper: single background task evicting idle keys     │
//! │  └── config: RateLimitConfig                                 │
//! ├─────────────────────────────────────────────────────────────┤
//! │  OriginGuard                                                 │
//! │  └── allow-list (substring match), dev/disabled switches    │
//! └─────────────────────────────────────────────────────────────┘
//! ```

mod origin;
mod rate_limiter;

#[cfg(test)]
mod tests;

pub use origin::{OriginDecision, OriginGuard, OriginRejection};
pub use rate_limiter::RateLimiter;
