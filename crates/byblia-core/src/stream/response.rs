use axum::body::Body;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use bytes::Bytes;

use byblia_types::ChatError;

use crate::service::ApiError;

/// Wrap a framed byte stream in a `text/event-stream` response.
///
/// `X-Accel-Buffering: no` keeps reverse proxies from holding frames back.
pub fn build_sse_response<S, E>(stream: S) -> Response
where
    S: futures::Stream<Item = Result<Bytes, E>> + Send + 'static,
    E: Into<axum::BoxError> + 'static,
{
    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "text/event-stream")
        .header(header::CACHE_CONTROL, "no-cache")
        .header(header::CONNECTION, "keep-alive")
        .header("X-Accel-Buffering", "no")
        .body(Body::from_stream(stream))
        .unwrap_or_else(|e| {
            ApiError(ChatError::Internal { message: format!("SSE response setup: {}", e) })
                .into_response()
        })
}
