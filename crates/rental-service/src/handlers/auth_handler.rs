//! Registration, login and logout endpoints.
//!
//! Handlers are instrumented with `skip_all`: request bodies carry
//! passwords and must never reach a span.

use crate::errors::RentalError;
use crate::handlers::{json_body, observe_error};
use crate::middleware::AuthenticatedUser;
use crate::models::{AuthResponse, LoginRequest, MessageResponse, RegisterRequest};
use crate::routes::AppState;
use crate::services::session_service::{self, LogoutOutcome};
use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    Extension, Json,
};
use std::sync::Arc;
use tracing::instrument;

/// POST /api/v1/auth/register
///
/// Creates the account and returns 201 with a registration token.
#[instrument(name = "rental.auth.register", skip_all, fields(status))]
pub async fn register(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<AuthResponse>), RentalError> {
    let request = json_body(payload).map_err(|e| observe_error("register", e))?;

    match state.authenticator.register(request).await {
        Ok(response) => {
            tracing::Span::current().record("status", "success");
            Ok((StatusCode::CREATED, Json(response)))
        }
        Err(e) => {
            tracing::Span::current().record("status", "error");
            Err(observe_error("register", e))
        }
    }
}

/// POST /api/v1/auth/login
#[instrument(name = "rental.auth.login", skip_all, fields(status))]
pub async fn login(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<AuthResponse>, RentalError> {
    let request = json_body(payload).map_err(|e| observe_error("login", e))?;

    match state.authenticator.login(request).await {
        Ok(response) => {
            tracing::Span::current().record("status", "success");
            Ok(Json(response))
        }
        Err(e) => {
            tracing::Span::current().record("status", "error");
            Err(observe_error("login", e))
        }
    }
}

/// POST /api/v1/auth/logout
///
/// Sits behind `require_signed_token`, so an expired or already revoked
/// token still gets a 200.
#[instrument(name = "rental.auth.logout", skip_all, fields(subject_id = user.subject_id))]
pub async fn logout(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthenticatedUser>,
) -> Result<Json<MessageResponse>, RentalError> {
    let outcome = session_service::logout(
        &state.revocations,
        user.subject_id,
        &user.token,
        user.expires_at,
    )
    .await
    .map_err(|e| observe_error("logout", e))?;

    if outcome == LogoutOutcome::AlreadyExpired {
        tracing::debug!(target: "rental.auth", "Logout with a lapsed token");
    }

    Ok(Json(MessageResponse::new("You have been logged out")))
}
