use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Semaphore;

use byblia_types::models::config::{AppConfig, SessionConfig, StreamConfig};

use crate::agent::ModelAgent;
use crate::guard::{OriginGuard, RateLimiter};
use crate::recorder::InteractionRecorder;
use crate::store::InteractionStore;
use crate::stream::StreamFramer;

/// Shared per-process state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub limiter: Arc<RateLimiter>,
    pub origin_guard: Arc<OriginGuard>,
    pub agent: Arc<dyn ModelAgent>,
    pub recorder: InteractionRecorder,
    pub framer: StreamFramer,
    pub session_config: SessionConfig,
    pub stream_config: StreamConfig,
    /// Slots for requests in flight, held until the response body is done
    pub in_flight: Arc<Semaphore>,
}

impl AppState {
    /// Wire components from configuration. The rate limiter's sweeper is not
    /// started here; the caller owns that lifecycle.
    pub fn new(
        config: &AppConfig,
        agent: Arc<dyn ModelAgent>,
        store: Arc<dyn InteractionStore>,
    ) -> Self {
        Self {
            limiter: RateLimiter::new(config.rate_limit),
            origin_guard: Arc::new(OriginGuard::new(&config.origin)),
            agent,
            recorder: InteractionRecorder::new(
                store,
                Duration::from_millis(config.session.record_timeout_ms),
            ),
            framer: StreamFramer::new(&config.stream),
            session_config: config.session,
            stream_config: config.stream,
            in_flight: Arc::new(Semaphore::new(config.server.max_concurrency.max(1))),
        }
    }
}
