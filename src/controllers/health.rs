use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::json;
use std::sync::Arc;

use crate::infrastructure::repositories::AudioRepository;

pub async fn health() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}

pub async fn health_ready(State(audio_repo): State<Arc<dyn AudioRepository>>) -> impl IntoResponse {
    if audio_repo.is_available().await {
        (
            StatusCode::OK,
            Json(json!({
                "status": "ready",
                "storage": "available"
            })),
        )
    } else {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({
                "status": "not_ready",
                "storage": "unavailable"
            })),
        )
    }
}
