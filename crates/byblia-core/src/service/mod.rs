//! HTTP surface: router, middleware and handlers.
//!
//! ```text
//! request ─► CORS ─► Trace ─► in-flight slots ─► body limit
//!              │
//!              ├─ GET  /, /health, /healthz                 (public)
//!              ├─ POST /feedback, GET /interactions         (origin guard)
//!              └─ POST /chat                   (origin guard ─► rate limit)
//! ```

mod error;
pub mod handlers;
pub mod middleware;
mod state;


use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::{middleware::from_fn_with_state, Router};
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

pub use error::ApiError;
pub use state::AppState;

use handlers::{handle_chat, handle_feedback, handle_interactions, health_check, service_status};
use middleware::{cors_layer, in_flight_middleware, origin_middleware, rate_limit_middleware};

/// Maximum accepted request body.
pub const MAX_BODY_BYTES: usize = 64 * 1024;

pub fn build_router(state: AppState) -> Router {
    let guard = state.origin_guard.clone();
    let limiter = state.limiter.clone();
    let in_flight = state.in_flight.clone();

    let chat = Router::<AppState>::new()
        .route("/chat", post(handle_chat))
        .route_layer(from_fn_with_state(limiter, rate_limit_middleware));

    let guarded = Router::<AppState>::new()
        .merge(chat)
        .route("/feedback", post(handle_feedback))
        .route("/interactions", get(handle_interactions))
        .route_layer(from_fn_with_state(guard.clone(), origin_middleware));

    let public = Router::<AppState>::new()
        .route("/", get(service_status))
        .route("/health", get(health_check))
        .route("/healthz", get(health_check));

    guarded
        .merge(public)
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(cors_layer(guard))
                .map_response(|res: axum::response::Response<_>| res.map(axum::body::Body::new))
                .layer(TraceLayer::new_for_http())
                .layer(from_fn_with_state(in_flight, in_flight_middleware))
                .layer(DefaultBodyLimit::max(MAX_BODY_BYTES)),
        )
}
