//! Repository layer.
//!
//! Handler -> Service -> Repository. Each table is reached through a trait so
//! services can run against Postgres in production and against
//! `MemoryDatabase` in tests.

pub mod apartments;
#[cfg(any(test, feature = "test-utils"))]
pub mod memory;
pub mod reviews;
pub mod users;

pub use apartments::{ApartmentRepository, PgApartmentRepository};
#[cfg(any(test, feature = "test-utils"))]
pub use memory::MemoryDatabase;
pub use reviews::{PgReviewRepository, ReviewRepository};
pub use users::{PgUserRepository, UserRepository};

use crate::errors::RentalError;

/// Classify a sqlx error from a write.
///
/// Unique violations become `Conflict`, foreign key violations `NotFound`;
/// everything else is a database failure.
pub(crate) fn classify_write_error(err: sqlx::Error, context: &str) -> RentalError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.is_unique_violation() {
            return RentalError::Conflict(format!("{} already exists", context));
        }
        if db_err.is_foreign_key_violation() {
            return RentalError::NotFound(format!("Referenced {} not found", context));
        }
    }
    RentalError::Database(format!("Failed to write {}: {}", context, err))
}
