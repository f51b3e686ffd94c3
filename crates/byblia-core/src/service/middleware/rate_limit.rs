use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::{ConnectInfo, Request, State};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

use byblia_types::ChatError;

use super::client_key;
use crate::guard::RateLimiter;
use crate::service::ApiError;

/// Admit the request against the client's sliding window.
///
/// The resolved [`super::ClientKey`] is stored in the request extensions for
/// the handler.
pub async fn rate_limit_middleware(
    State(limiter): State<Arc<RateLimiter>>,
    mut request: Request,
    next: Next,
) -> Response {
    let key = client_key(request.headers(), request.extensions().get::<ConnectInfo<SocketAddr>>());

    if !limiter.allow(&key.0) {
        tracing::warn!(client = %key.0, "Rate limit exceeded");
        return ApiError(ChatError::RateLimited { retry_after_secs: limiter.window().as_secs() })
            .into_response();
    }

    request.extensions_mut().insert(key);
    next.run(request).await
}
