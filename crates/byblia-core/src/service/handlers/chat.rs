use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::response::Response;
use axum::{Extension, Json};

use byblia_types::{ChatError, ChatRequest};

use crate::service::middleware::ClientKey;
use crate::service::{ApiError, AppState};
use crate::session::{GenerationSession, RequestContext};
use crate::stream::build_sse_response;

/// `POST /chat`: stream one answer as server-sent events.
///
/// Validation happens before any byte of the stream is sent, so invalid
/// requests still get a proper status code.
pub async fn handle_chat(
    State(state): State<AppState>,
    client: Option<Extension<ClientKey>>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(request) =
        payload.map_err(|rejection| ChatError::validation(rejection.body_text()))?;

    let client_key = client.map_or_else(|| "unknown".to_string(), |Extension(key)| key.0);
    let context = RequestContext::from_request(client_key, request, &state.session_config)
        .inspect_err(|e| tracing::debug!(error = %e, "Rejected chat request"))?;

    let session = GenerationSession::new(
        context,
        state.agent.clone(),
        state.recorder.clone(),
        state.session_config,
        state.stream_config,
    );

    let body = state.framer.frame_stream(session.into_events());
    Ok(build_sse_response(body))
}
