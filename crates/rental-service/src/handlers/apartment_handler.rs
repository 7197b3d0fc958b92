//! Apartment listing endpoints.

use crate::errors::RentalError;
use crate::handlers::{json_body, path_id, query_params};
use crate::middleware::AuthenticatedUser;
use crate::models::{
    Apartment, ApartmentListing, ApartmentQuery, CreateApartmentRequest, UpdateApartmentRequest,
};
use crate::routes::AppState;
use crate::services::apartment_service;
use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    Extension, Json,
};
use std::sync::Arc;
use tracing::instrument;

/// GET /api/v1/apartments?state=
#[instrument(skip_all)]
pub async fn list_apartments(
    State(state): State<Arc<AppState>>,
    query: Result<Query<ApartmentQuery>, QueryRejection>,
) -> Result<Json<Vec<ApartmentListing>>, RentalError> {
    let query = query_params(query)?;
    let listings =
        apartment_service::list(state.apartments.as_ref(), query.state.as_deref()).await?;
    Ok(Json(listings))
}

/// POST /api/v1/apartments
#[instrument(skip_all, fields(owner_id = user.subject_id))]
pub async fn create_apartment(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthenticatedUser>,
    payload: Result<Json<CreateApartmentRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Apartment>), RentalError> {
    let request = json_body(payload)?;
    let apartment =
        apartment_service::create(state.apartments.as_ref(), user.subject_id, request).await?;
    Ok((StatusCode::CREATED, Json(apartment)))
}

/// GET /api/v1/apartments/:id
#[instrument(skip_all, fields(apartment_id = tracing::field::Empty))]
pub async fn get_apartment(
    State(state): State<Arc<AppState>>,
    path: Result<Path<i64>, PathRejection>,
) -> Result<Json<ApartmentListing>, RentalError> {
    let id = path_id(path, "apartment_id")?;
    Ok(Json(
        apartment_service::get(state.apartments.as_ref(), id).await?,
    ))
}

/// PATCH /api/v1/apartments/:id
///
/// Owner only. Anyone else gets 404.
#[instrument(skip_all, fields(apartment_id = tracing::field::Empty, owner_id = user.subject_id))]
pub async fn update_apartment(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthenticatedUser>,
    path: Result<Path<i64>, PathRejection>,
    payload: Result<Json<UpdateApartmentRequest>, JsonRejection>,
) -> Result<Json<Apartment>, RentalError> {
    let id = path_id(path, "apartment_id")?;
    let request = json_body(payload)?;
    let apartment =
        apartment_service::update(state.apartments.as_ref(), user.subject_id, id, request).await?;
    Ok(Json(apartment))
}

/// DELETE /api/v1/apartments/:id
///
/// Owner only. Returns the deleted listing.
#[instrument(skip_all, fields(apartment_id = tracing::field::Empty, owner_id = user.subject_id))]
pub async fn delete_apartment(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthenticatedUser>,
    path: Result<Path<i64>, PathRejection>,
) -> Result<Json<Apartment>, RentalError> {
    let id = path_id(path, "apartment_id")?;
    let apartment =
        apartment_service::delete(state.apartments.as_ref(), user.subject_id, id).await?;
    Ok(Json(apartment))
}
