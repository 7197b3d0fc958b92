//! Credential store: the `users` table.

use super::classify_write_error;
use crate::errors::RentalError;
use crate::models::{NewUser, User, UserChanges};
use async_trait::async_trait;
use sqlx::PgPool;

#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Emails are stored lower-cased; callers pass a normalized email.
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RentalError>;

    async fn find_by_id(&self, id: i64) -> Result<Option<User>, RentalError>;

    async fn count_by_email(&self, email: &str) -> Result<i64, RentalError>;

    /// Fails with `Conflict` if the email is already taken.
    async fn insert(&self, user: NewUser) -> Result<User, RentalError>;

    /// Returns `None` if no user has this id.
    async fn update_by_id(&self, id: i64, changes: UserChanges)
        -> Result<Option<User>, RentalError>;

    async fn list(&self) -> Result<Vec<User>, RentalError>;

    /// Connectivity probe for readiness checks.
    async fn ping(&self) -> Result<(), RentalError>;
}

#[derive(Clone)]
pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RentalError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, name, email, password_hash, created_at, updated_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| RentalError::Database(format!("Failed to fetch user by email: {}", e)))?;

        Ok(user)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<User>, RentalError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, name, email, password_hash, created_at, updated_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| RentalError::Database(format!("Failed to fetch user by id: {}", e)))?;

        Ok(user)
    }

    async fn count_by_email(&self, email: &str) -> Result<i64, RentalError> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users WHERE email = $1")
            .bind(email)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| RentalError::Database(format!("Failed to count users: {}", e)))?;

        Ok(count)
    }

    async fn insert(&self, user: NewUser) -> Result<User, RentalError> {
        sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (name, email, password_hash)
            VALUES ($1, $2, $3)
            RETURNING id, name, email, password_hash, created_at, updated_at
            "#,
        )
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.password_hash)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| classify_write_error(e, "user"))
    }

    async fn update_by_id(
        &self,
        id: i64,
        changes: UserChanges,
    ) -> Result<Option<User>, RentalError> {
        sqlx::query_as::<_, User>(
            r#"
            UPDATE users
            SET name = COALESCE($2, name),
                email = COALESCE($3, email),
                password_hash = COALESCE($4, password_hash),
                updated_at = NOW()
            WHERE id = $1
            RETURNING id, name, email, password_hash, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(changes.name)
        .bind(changes.email)
        .bind(changes.password_hash)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| classify_write_error(e, "user"))
    }

    async fn list(&self) -> Result<Vec<User>, RentalError> {
        let users = sqlx::query_as::<_, User>(
            r#"
            SELECT id, name, email, password_hash, created_at, updated_at
            FROM users
            ORDER BY id
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| RentalError::Database(format!("Failed to list users: {}", e)))?;

        Ok(users)
    }

    async fn ping(&self) -> Result<(), RentalError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|e| RentalError::Database(format!("Database ping failed: {}", e)))?;
        Ok(())
    }
}
