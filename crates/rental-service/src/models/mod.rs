use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;

// ============================================================================
// Stored records
// ============================================================================

/// User model (maps to users table)
#[derive(Clone, FromRow)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Redacts the password hash and email.
impl fmt::Debug for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("User")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("email", &"[REDACTED]")
            .field("password_hash", &"[REDACTED]")
            .finish()
    }
}

/// Apartment model (maps to apartments table)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Apartment {
    pub id: i64,
    pub owner_id: i64,
    #[serde(rename = "type")]
    #[sqlx(rename = "type")]
    pub apartment_type: String,
    pub address: String,
    pub state: String,
    pub created_at: DateTime<Utc>,
}

/// Apartment joined with its owner's name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct ApartmentListing {
    pub id: i64,
    pub owner_id: i64,
    pub owner: String,
    #[serde(rename = "type")]
    #[sqlx(rename = "type")]
    pub apartment_type: String,
    pub address: String,
    pub state: String,
    pub created_at: DateTime<Utc>,
}

/// Review model (maps to reviews table)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Review {
    pub id: i64,
    pub user_id: i64,
    pub apartment_id: i64,
    pub body: String,
    pub created_at: DateTime<Utc>,
}

/// Flat row produced by the review listing join.
#[derive(Debug, Clone, FromRow)]
pub struct ReviewRow {
    pub id: i64,
    pub body: String,
    pub user_id: i64,
    pub user_name: String,
    pub apartment_id: i64,
    #[sqlx(rename = "type")]
    pub apartment_type: String,
    pub address: String,
    pub state: String,
}

// ============================================================================
// Repository inputs
// ============================================================================

#[derive(Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password_hash: String,
}

/// Profile fields to overwrite. `None` leaves the column untouched.
#[derive(Clone, Default)]
pub struct UserChanges {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password_hash: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewApartment {
    pub owner_id: i64,
    pub apartment_type: String,
    pub address: String,
    pub state: String,
}

#[derive(Debug, Clone, Default)]
pub struct ApartmentChanges {
    pub apartment_type: Option<String>,
    pub address: Option<String>,
    pub state: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewReview {
    pub user_id: i64,
    pub apartment_id: i64,
    pub body: String,
}

// ============================================================================
// Auth requests and responses
// ============================================================================

#[derive(Clone, Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

impl fmt::Debug for RegisterRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegisterRequest")
            .field("name", &self.name)
            .field("email", &"[REDACTED]")
            .field("password", &"[REDACTED]")
            .finish()
    }
}

#[derive(Clone, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

impl fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginRequest")
            .field("email", &"[REDACTED]")
            .field("password", &"[REDACTED]")
            .finish()
    }
}

#[derive(Clone, Default, Deserialize)]
pub struct UpdateProfileRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

impl fmt::Debug for UpdateProfileRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UpdateProfileRequest")
            .field("name", &self.name)
            .field("email", &self.email.as_ref().map(|_| "[REDACTED]"))
            .field("password", &self.password.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

/// Public view of a user. The password hash never leaves the service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: i64,
    pub name: String,
    pub email: String,
}

impl From<&User> for UserProfile {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            email: user.email.clone(),
        }
    }
}

/// Returned by register and login.
#[derive(Clone, Serialize, Deserialize)]
pub struct AuthResponse {
    pub user: UserProfile,
    pub access_token: String,
    pub token_type: String,
    pub expires_in: i64,
}

impl fmt::Debug for AuthResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthResponse")
            .field("user", &self.user)
            .field("access_token", &"[REDACTED]")
            .field("token_type", &self.token_type)
            .field("expires_in", &self.expires_in)
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

// ============================================================================
// Apartment and review requests and views
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct CreateApartmentRequest {
    #[serde(rename = "type")]
    pub apartment_type: String,
    pub address: String,
    pub state: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateApartmentRequest {
    #[serde(rename = "type")]
    pub apartment_type: Option<String>,
    pub address: Option<String>,
    pub state: Option<String>,
}

/// `?state=` filter for the apartment listing.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApartmentQuery {
    pub state: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateReviewRequest {
    pub body: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewAuthor {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewedApartment {
    pub id: i64,
    #[serde(rename = "type")]
    pub apartment_type: String,
    pub address: String,
    pub state: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewBody {
    pub id: i64,
    pub body: String,
}

/// Nested review listing entry: `{user, apartment, review}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewView {
    pub user: ReviewAuthor,
    pub apartment: ReviewedApartment,
    pub review: ReviewBody,
}

impl From<ReviewRow> for ReviewView {
    fn from(row: ReviewRow) -> Self {
        Self {
            user: ReviewAuthor {
                id: row.user_id,
                name: row.user_name,
            },
            apartment: ReviewedApartment {
                id: row.apartment_id,
                apartment_type: row.apartment_type,
                address: row.address,
                state: row.state,
            },
            review: ReviewBody {
                id: row.id,
                body: row.body,
            },
        }
    }
}

// ============================================================================
// Operational
// ============================================================================

/// Body of `/ready`.
#[derive(Debug, Serialize)]
pub struct ReadinessResponse {
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub database: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cache: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}
