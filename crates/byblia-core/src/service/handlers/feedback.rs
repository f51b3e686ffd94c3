use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;

use byblia_types::{ChatError, FeedbackOutcome, FeedbackRequest, FeedbackResponse};

use crate::service::{ApiError, AppState};

/// `POST /feedback`: attach a thumbs up/down to a recorded interaction.
pub async fn handle_feedback(
    State(state): State<AppState>,
    payload: Result<Json<FeedbackRequest>, JsonRejection>,
) -> Result<Json<FeedbackResponse>, ApiError> {
    let Json(request) =
        payload.map_err(|rejection| ChatError::validation(rejection.body_text()))?;

    let outcome = state.recorder.attach_feedback(request.interaction_id, request.feedback).await?;

    let message = match outcome {
        FeedbackOutcome::Unchanged => "Feedback already recorded",
        _ => "Feedback recorded successfully",
    };
    Ok(Json(FeedbackResponse { success: true, message: message.to_string() }))
}
