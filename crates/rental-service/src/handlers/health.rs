//! Health check handlers.
//!
//! - `/health`: Liveness probe. Returns OK while the process is running
//! - `/ready`: Readiness probe. Checks the database and the revocation cache

use crate::models::ReadinessResponse;
use crate::routes::AppState;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use std::sync::Arc;

/// Liveness probe handler. Checks no dependencies.
pub async fn health_check() -> &'static str {
    "OK"
}

/// Readiness probe handler.
///
/// Returns 200 when both the database and the revocation cache answer, 503
/// otherwise. Without the cache no guarded route can serve, so it counts
/// the same as the database.
///
/// Error messages stay generic; the cause is logged with `tracing::warn!`.
#[tracing::instrument(skip_all, name = "rental.health.readiness")]
pub async fn readiness_check(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    if let Err(e) = state.users.ping().await {
        tracing::warn!("Readiness check failed: database error: {}", e);
        return (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(ReadinessResponse {
                status: "not_ready",
                database: Some("unhealthy"),
                cache: None,
                error: Some("Service dependencies unavailable".to_string()),
            }),
        );
    }

    if let Err(e) = state.revocations.ping().await {
        tracing::warn!("Readiness check failed: cache error: {}", e);
        return (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(ReadinessResponse {
                status: "not_ready",
                database: Some("healthy"),
                cache: Some("unavailable"),
                error: Some("Service dependencies unavailable".to_string()),
            }),
        );
    }

    (
        StatusCode::OK,
        Json(ReadinessResponse {
            status: "ready",
            database: Some("healthy"),
            cache: Some("available"),
            error: None,
        }),
    )
}
