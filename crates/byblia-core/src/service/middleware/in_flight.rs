use std::sync::Arc;

use axum::body::Body;
use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use futures::StreamExt;
use tokio::sync::Semaphore;

use byblia_types::ChatError;

use crate::service::ApiError;

/// Bound the number of requests in flight, response bodies included.
///
/// The permit travels with the response body, so an SSE answer occupies its
/// slot until the stream ends or the client goes away. Requests over the
/// ceiling are refused with 503 instead of queueing.
pub async fn in_flight_middleware(
    State(slots): State<Arc<Semaphore>>,
    request: Request,
    next: Next,
) -> Response {
    let Ok(permit) = slots.try_acquire_owned() else {
        tracing::warn!(path = %request.uri().path(), "In-flight ceiling reached");
        return ApiError(ChatError::Overloaded).into_response();
    };

    let (parts, body) = next.run(request).await.into_parts();
    let body = body.into_data_stream().map(move |chunk| {
        let _slot = &permit;
        chunk
    });
    Response::from_parts(parts, Body::from_stream(body))
}
