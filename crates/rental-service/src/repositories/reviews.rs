//! Reviews: the `reviews` table.

use super::classify_write_error;
use crate::errors::RentalError;
use crate::models::{NewReview, Review, ReviewRow};
use async_trait::async_trait;
use sqlx::PgPool;

#[async_trait]
pub trait ReviewRepository: Send + Sync {
    /// Reviews of one apartment joined with author and apartment, oldest first.
    async fn list_for_apartment(&self, apartment_id: i64) -> Result<Vec<ReviewRow>, RentalError>;

    /// Fails with `NotFound` if the apartment or author does not exist.
    async fn insert(&self, review: NewReview) -> Result<Review, RentalError>;

    /// `None` if the review does not exist or was written by someone else.
    async fn delete(&self, id: i64, user_id: i64) -> Result<Option<Review>, RentalError>;
}

#[derive(Clone)]
pub struct PgReviewRepository {
    pool: PgPool,
}

impl PgReviewRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ReviewRepository for PgReviewRepository {
    async fn list_for_apartment(&self, apartment_id: i64) -> Result<Vec<ReviewRow>, RentalError> {
        let rows = sqlx::query_as::<_, ReviewRow>(
            r#"
            SELECT r.id, r.body, r.user_id, u.name AS user_name,
                   r.apartment_id, a.type, a.address, a.state
            FROM reviews r
            INNER JOIN apartments a ON a.id = r.apartment_id
            INNER JOIN users u ON u.id = r.user_id
            WHERE r.apartment_id = $1
            ORDER BY r.id
            "#,
        )
        .bind(apartment_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| RentalError::Database(format!("Failed to list reviews: {}", e)))?;

        Ok(rows)
    }

    async fn insert(&self, review: NewReview) -> Result<Review, RentalError> {
        sqlx::query_as::<_, Review>(
            r#"
            INSERT INTO reviews (user_id, apartment_id, body)
            VALUES ($1, $2, $3)
            RETURNING id, user_id, apartment_id, body, created_at
            "#,
        )
        .bind(review.user_id)
        .bind(review.apartment_id)
        .bind(&review.body)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| classify_write_error(e, "apartment or author"))
    }

    async fn delete(&self, id: i64, user_id: i64) -> Result<Option<Review>, RentalError> {
        let review = sqlx::query_as::<_, Review>(
            r#"
            DELETE FROM reviews
            WHERE id = $1 AND user_id = $2
            RETURNING id, user_id, apartment_id, body, created_at
            "#,
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| RentalError::Database(format!("Failed to delete review: {}", e)))?;

        Ok(review)
    }
}
