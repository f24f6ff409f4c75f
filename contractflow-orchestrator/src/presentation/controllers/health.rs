//! Health check controller

use axum::{extract::State, http::StatusCode, response::Json};
use chrono::Utc;

use crate::presentation::controllers::AppState;
use crate::presentation::models::HealthResponse;

/// GET /health - Liveness and storage backend status
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service healthy", body = HealthResponse),
        (status = 503, description = "Storage backend unavailable", body = HealthResponse)
    ),
    tag = "health"
)]
pub async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let storage_ok = state.repositories.ping().await;
    let status = if storage_ok {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let body = HealthResponse {
        status: if storage_ok { "healthy" } else { "degraded" }.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        storage: state.repositories.backend_name().to_string(),
        storage_ok,
        timestamp: Utc::now(),
    };

    (status, Json(body))
}
