use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;

pub async fn service_status() -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(serde_json::json!({
            "status": "online",
            "message": "Byblia API is running",
            "version": env!("CARGO_PKG_VERSION"),
        })),
    )
}

pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, Json(serde_json::json!({ "status": "ok" })))
}
