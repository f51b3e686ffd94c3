use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::Json;

use byblia_types::{ChatError, InteractionRecord};
use byblia_types::models::InteractionsQuery;

use crate::service::{ApiError, AppState};

pub const MAX_INTERACTIONS_LIMIT: i64 = 100;

/// `GET /interactions?limit=N`: newest recorded interactions.
pub async fn handle_interactions(
    State(state): State<AppState>,
    query: Result<Query<InteractionsQuery>, QueryRejection>,
) -> Result<Json<Vec<InteractionRecord>>, ApiError> {
    let Query(query) = query.map_err(|rejection| ChatError::validation(rejection.body_text()))?;

    if !(1..=MAX_INTERACTIONS_LIMIT).contains(&query.limit) {
        return Err(ChatError::validation(format!(
            "limit must be between 1 and {}",
            MAX_INTERACTIONS_LIMIT
        ))
        .into());
    }

    Ok(Json(state.recorder.recent(query.limit).await?))
}
