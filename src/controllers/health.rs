use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use chrono::Utc;
use serde_json::json;
use std::sync::Arc;

use crate::domain::bulletin::{BulletinService, BulletinServiceApi};

pub async fn health() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}

pub async fn health_ready(State(service): State<Arc<BulletinService>>) -> impl IntoResponse {
    let health = service.dependency_health().await;
    let (status, label) = if health.all_ready() {
        (StatusCode::OK, "ready")
    } else {
        tracing::warn!(
            sources = health.sources,
            llm = health.llm,
            tts = health.tts,
            "Readiness check degraded"
        );
        (StatusCode::SERVICE_UNAVAILABLE, "degraded")
    };

    (
        status,
        Json(json!({
            "status": label,
            "sources": health.sources,
            "llm": health.llm,
            "tts": health.tts,
            "timestamp": Utc::now(),
        })),
    )
}
