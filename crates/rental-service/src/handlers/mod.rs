//! HTTP request handlers for the rental service.

pub mod apartment_handler;
pub mod auth_handler;
pub mod health;
pub mod metrics;
pub mod review_handler;
pub mod user_handler;

pub use apartment_handler::{
    create_apartment, delete_apartment, get_apartment, list_apartments, update_apartment,
};
pub use auth_handler::{login, logout, register};
pub use health::{health_check, readiness_check};
pub use metrics::metrics_handler;
pub use review_handler::{create_review, delete_review, list_reviews};
pub use user_handler::{get_me, list_my_apartments, list_user_apartments, list_users, update_me};

use crate::errors::RentalError;
use crate::observability::metrics::record_error;
use crate::observability::ErrorCategory;
use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{Path, Query};
use axum::Json;

/// Unwrap a JSON body, turning axum's rejection into a 422 on `body`.
pub(crate) fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, RentalError> {
    payload.map(|Json(value)| value).map_err(|rejection| {
        tracing::debug!(target: "rental.handlers", status = %rejection.status(), "Rejected request body");
        RentalError::invalid_field("body", rejection.body_text())
    })
}

/// Unwrap a numeric path id and record it on the handler span under `field`.
/// An id that cannot be parsed names no resource, so it is a 404 like any
/// other missing row.
pub(crate) fn path_id(
    path: Result<Path<i64>, PathRejection>,
    field: &'static str,
) -> Result<i64, RentalError> {
    let Path(id) = path.map_err(|rejection| {
        tracing::debug!(target: "rental.handlers", status = %rejection.status(), "Rejected path parameter");
        RentalError::NotFound("Resource not found".to_string())
    })?;
    tracing::Span::current().record(field, id);
    Ok(id)
}

/// Unwrap query parameters, turning axum's rejection into a 422 on `query`.
pub(crate) fn query_params<T>(query: Result<Query<T>, QueryRejection>) -> Result<T, RentalError> {
    query.map(|Query(value)| value).map_err(|rejection| {
        tracing::debug!(target: "rental.handlers", status = %rejection.status(), "Rejected query string");
        RentalError::invalid_field("query", rejection.body_text())
    })
}

/// Fallback for paths no route matches.
pub async fn route_not_found() -> RentalError {
    RentalError::NotFound("Route not found".to_string())
}

/// Count a failed operation by category before handing the error back.
pub(crate) fn observe_error(operation: &str, err: RentalError) -> RentalError {
    let category = ErrorCategory::from(&err);
    record_error(operation, category.as_str(), err.status_code());
    err
}
