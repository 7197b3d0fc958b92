//! Profile endpoints for the authenticated caller, plus the user directory.

use crate::errors::RentalError;
use crate::handlers::{json_body, path_id};
use crate::middleware::AuthenticatedUser;
use crate::models::{Apartment, UpdateProfileRequest, UserProfile};
use crate::routes::AppState;
use crate::services::apartment_service;
use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    Extension, Json,
};
use std::sync::Arc;
use tracing::instrument;

/// GET /api/v1/me
#[instrument(skip_all, fields(subject_id = user.subject_id))]
pub async fn get_me(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthenticatedUser>,
) -> Result<Json<UserProfile>, RentalError> {
    let profile = state.authenticator.get_profile(user.subject_id).await?;
    Ok(Json(profile))
}

/// PATCH /api/v1/me
#[instrument(skip_all, fields(subject_id = user.subject_id))]
pub async fn update_me(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthenticatedUser>,
    payload: Result<Json<UpdateProfileRequest>, JsonRejection>,
) -> Result<Json<UserProfile>, RentalError> {
    let request = json_body(payload)?;
    let profile = state
        .authenticator
        .update_profile(user.subject_id, request)
        .await?;
    Ok(Json(profile))
}

/// GET /api/v1/users
#[instrument(skip_all)]
pub async fn list_users(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<UserProfile>>, RentalError> {
    Ok(Json(state.authenticator.list_users().await?))
}

/// GET /api/v1/users/:id/apartments
#[instrument(skip_all, fields(owner_id = tracing::field::Empty))]
pub async fn list_user_apartments(
    State(state): State<Arc<AppState>>,
    path: Result<Path<i64>, PathRejection>,
) -> Result<Json<Vec<Apartment>>, RentalError> {
    let owner_id = path_id(path, "owner_id")?;
    let apartments = apartment_service::list_by_owner(state.apartments.as_ref(), owner_id).await?;
    Ok(Json(apartments))
}

/// GET /api/v1/me/apartments
#[instrument(skip_all, fields(subject_id = user.subject_id))]
pub async fn list_my_apartments(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthenticatedUser>,
) -> Result<Json<Vec<Apartment>>, RentalError> {
    let apartments =
        apartment_service::list_by_owner(state.apartments.as_ref(), user.subject_id).await?;
    Ok(Json(apartments))
}
