//! Review endpoints.

use crate::errors::RentalError;
use crate::handlers::{json_body, path_id};
use crate::middleware::AuthenticatedUser;
use crate::models::{CreateReviewRequest, Review, ReviewView};
use crate::routes::AppState;
use crate::services::review_service;
use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    http::StatusCode,
    Extension, Json,
};
use std::sync::Arc;
use tracing::instrument;

/// GET /api/v1/apartments/:id/reviews
#[instrument(skip_all, fields(apartment_id = tracing::field::Empty))]
pub async fn list_reviews(
    State(state): State<Arc<AppState>>,
    path: Result<Path<i64>, PathRejection>,
) -> Result<Json<Vec<ReviewView>>, RentalError> {
    let apartment_id = path_id(path, "apartment_id")?;
    let reviews = review_service::list_for_apartment(
        state.apartments.as_ref(),
        state.reviews.as_ref(),
        apartment_id,
    )
    .await?;
    Ok(Json(reviews))
}

/// POST /api/v1/apartments/:id/reviews
#[instrument(skip_all, fields(apartment_id = tracing::field::Empty, user_id = user.subject_id))]
pub async fn create_review(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthenticatedUser>,
    path: Result<Path<i64>, PathRejection>,
    payload: Result<Json<CreateReviewRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Review>), RentalError> {
    let apartment_id = path_id(path, "apartment_id")?;
    let request = json_body(payload)?;
    let review = review_service::create(
        state.apartments.as_ref(),
        state.reviews.as_ref(),
        user.subject_id,
        apartment_id,
        request,
    )
    .await?;
    Ok((StatusCode::CREATED, Json(review)))
}

/// DELETE /api/v1/reviews/:id
///
/// Author only. Anyone else gets 404.
#[instrument(skip_all, fields(review_id = tracing::field::Empty, user_id = user.subject_id))]
pub async fn delete_review(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthenticatedUser>,
    path: Result<Path<i64>, PathRejection>,
) -> Result<Json<Review>, RentalError> {
    let review_id = path_id(path, "review_id")?;
    let review =
        review_service::delete(state.reviews.as_ref(), user.subject_id, review_id).await?;
    Ok(Json(review))
}
