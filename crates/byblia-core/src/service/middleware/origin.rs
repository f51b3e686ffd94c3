use std::sync::Arc;

use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

use byblia_types::ChatError;

use crate::guard::{OriginDecision, OriginGuard};
use crate::service::ApiError;

pub async fn origin_middleware(
    State(guard): State<Arc<OriginGuard>>,
    request: Request,
    next: Next,
) -> Response {
    let origin = OriginGuard::declared_origin(request.headers());

    match guard.check(origin, request.method()) {
        OriginDecision::Allow => next.run(request).await,
        OriginDecision::Reject(rejection) => {
            tracing::warn!(
                origin = origin.unwrap_or("<none>"),
                path = %request.uri().path(),
                reason = rejection.reason(),
                "Origin rejected"
            );
            ApiError(ChatError::OriginRejected { reason: rejection.reason().to_string() })
                .into_response()
        },
    }
}
