//! Apartment listings: the `apartments` table.
//!
//! Updates and deletes are scoped to the owner in the `WHERE` clause, so a
//! listing owned by someone else reads as absent.

use super::classify_write_error;
use crate::errors::RentalError;
use crate::models::{Apartment, ApartmentChanges, ApartmentListing, NewApartment};
use async_trait::async_trait;
use sqlx::PgPool;

#[async_trait]
pub trait ApartmentRepository: Send + Sync {
    async fn list(&self) -> Result<Vec<ApartmentListing>, RentalError>;

    /// Case-insensitive match on `state`.
    async fn list_by_state(&self, state: &str) -> Result<Vec<ApartmentListing>, RentalError>;

    async fn list_by_owner(&self, owner_id: i64) -> Result<Vec<Apartment>, RentalError>;

    async fn find(&self, id: i64) -> Result<Option<ApartmentListing>, RentalError>;

    async fn insert(&self, apartment: NewApartment) -> Result<Apartment, RentalError>;

    /// `None` if the apartment does not exist or belongs to someone else.
    async fn update(
        &self,
        id: i64,
        owner_id: i64,
        changes: ApartmentChanges,
    ) -> Result<Option<Apartment>, RentalError>;

    /// `None` if the apartment does not exist or belongs to someone else.
    async fn delete(&self, id: i64, owner_id: i64) -> Result<Option<Apartment>, RentalError>;
}

#[derive(Clone)]
pub struct PgApartmentRepository {
    pool: PgPool,
}

impl PgApartmentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ApartmentRepository for PgApartmentRepository {
    async fn list(&self) -> Result<Vec<ApartmentListing>, RentalError> {
        let listings = sqlx::query_as::<_, ApartmentListing>(
            r#"
            SELECT a.id, a.owner_id, u.name AS owner, a.type, a.address, a.state, a.created_at
            FROM apartments a
            INNER JOIN users u ON u.id = a.owner_id
            ORDER BY a.id
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| RentalError::Database(format!("Failed to list apartments: {}", e)))?;

        Ok(listings)
    }

    async fn list_by_state(&self, state: &str) -> Result<Vec<ApartmentListing>, RentalError> {
        let listings = sqlx::query_as::<_, ApartmentListing>(
            r#"
            SELECT a.id, a.owner_id, u.name AS owner, a.type, a.address, a.state, a.created_at
            FROM apartments a
            INNER JOIN users u ON u.id = a.owner_id
            WHERE LOWER(a.state) = LOWER($1)
            ORDER BY a.id
            "#,
        )
        .bind(state)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            RentalError::Database(format!("Failed to list apartments by state: {}", e))
        })?;

        Ok(listings)
    }

    async fn list_by_owner(&self, owner_id: i64) -> Result<Vec<Apartment>, RentalError> {
        let apartments = sqlx::query_as::<_, Apartment>(
            r#"
            SELECT id, owner_id, type, address, state, created_at
            FROM apartments
            WHERE owner_id = $1
            ORDER BY id
            "#,
        )
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            RentalError::Database(format!("Failed to list apartments by owner: {}", e))
        })?;

        Ok(apartments)
    }

    async fn find(&self, id: i64) -> Result<Option<ApartmentListing>, RentalError> {
        let listing = sqlx::query_as::<_, ApartmentListing>(
            r#"
            SELECT a.id, a.owner_id, u.name AS owner, a.type, a.address, a.state, a.created_at
            FROM apartments a
            INNER JOIN users u ON u.id = a.owner_id
            WHERE a.id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| RentalError::Database(format!("Failed to fetch apartment: {}", e)))?;

        Ok(listing)
    }

    async fn insert(&self, apartment: NewApartment) -> Result<Apartment, RentalError> {
        sqlx::query_as::<_, Apartment>(
            r#"
            INSERT INTO apartments (owner_id, type, address, state)
            VALUES ($1, $2, $3, $4)
            RETURNING id, owner_id, type, address, state, created_at
            "#,
        )
        .bind(apartment.owner_id)
        .bind(&apartment.apartment_type)
        .bind(&apartment.address)
        .bind(&apartment.state)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| classify_write_error(e, "owner"))
    }

    async fn update(
        &self,
        id: i64,
        owner_id: i64,
        changes: ApartmentChanges,
    ) -> Result<Option<Apartment>, RentalError> {
        let apartment = sqlx::query_as::<_, Apartment>(
            r#"
            UPDATE apartments
            SET type = COALESCE($3, type),
                address = COALESCE($4, address),
                state = COALESCE($5, state)
            WHERE id = $1 AND owner_id = $2
            RETURNING id, owner_id, type, address, state, created_at
            "#,
        )
        .bind(id)
        .bind(owner_id)
        .bind(changes.apartment_type)
        .bind(changes.address)
        .bind(changes.state)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| RentalError::Database(format!("Failed to update apartment: {}", e)))?;

        Ok(apartment)
    }

    async fn delete(&self, id: i64, owner_id: i64) -> Result<Option<Apartment>, RentalError> {
        let apartment = sqlx::query_as::<_, Apartment>(
            r#"
            DELETE FROM apartments
            WHERE id = $1 AND owner_id = $2
            RETURNING id, owner_id, type, address, state, created_at
            "#,
        )
        .bind(id)
        .bind(owner_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| RentalError::Database(format!("Failed to delete apartment: {}", e)))?;

        Ok(apartment)
    }
}
