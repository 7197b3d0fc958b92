//! Apartment reviews.

use crate::errors::RentalError;
use crate::models::{CreateReviewRequest, NewReview, Review, ReviewView};
use crate::repositories::{ApartmentRepository, ReviewRepository};
use tracing::instrument;

async fn ensure_apartment_exists(
    apartments: &dyn ApartmentRepository,
    apartment_id: i64,
) -> Result<(), RentalError> {
    match apartments.find(apartment_id).await? {
        Some(_) => Ok(()),
        None => Err(RentalError::NotFound("Apartment not found".to_string())),
    }
}

/// Reviews of one apartment as `{user, apartment, review}` entries.
#[instrument(skip_all, fields(apartment_id = apartment_id))]
pub async fn list_for_apartment(
    apartments: &dyn ApartmentRepository,
    reviews: &dyn ReviewRepository,
    apartment_id: i64,
) -> Result<Vec<ReviewView>, RentalError> {
    ensure_apartment_exists(apartments, apartment_id).await?;

    Ok(reviews
        .list_for_apartment(apartment_id)
        .await?
        .into_iter()
        .map(ReviewView::from)
        .collect())
}

#[instrument(skip_all, fields(user_id = user_id, apartment_id = apartment_id))]
pub async fn create(
    apartments: &dyn ApartmentRepository,
    reviews: &dyn ReviewRepository,
    user_id: i64,
    apartment_id: i64,
    request: CreateReviewRequest,
) -> Result<Review, RentalError> {
    let body = request.body.trim().to_string();
    if body.is_empty() {
        return Err(RentalError::invalid_field("body", "Review cannot be empty"));
    }

    ensure_apartment_exists(apartments, apartment_id).await?;

    let review = reviews
        .insert(NewReview {
            user_id,
            apartment_id,
            body,
        })
        .await?;

    tracing::info!(target: "rental.reviews", review_id = review.id, "Review added");
    Ok(review)
}

/// Delete a review the caller wrote. Anyone else's review reads as `NotFound`.
#[instrument(skip_all, fields(user_id = user_id, review_id = review_id))]
pub async fn delete(
    reviews: &dyn ReviewRepository,
    user_id: i64,
    review_id: i64,
) -> Result<Review, RentalError> {
    reviews
        .delete(review_id, user_id)
        .await?
        .ok_or_else(|| RentalError::NotFound("Review not found".to_string()))
}
