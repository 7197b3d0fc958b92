//! Observability for the rental service.
//!
//! # Privacy by Default
//!
//! Service functions use `#[instrument(skip_all)]` and record only
//! explicitly chosen fields:
//! - **SAFE**: subject ids, resource ids, outcome labels
//! - **HASHED**: emails, via [`hash_for_correlation`]
//! - **NEVER**: passwords, bearer tokens, the signing secret

pub mod metrics;

use crate::errors::RentalError;
use sha2::{Digest, Sha256};

/// Hash a field value for correlation in logs (SHA-256, first 8 hex chars).
///
/// One-way but not secret-grade. Good enough to follow one email through a
/// request's log lines without writing it down.
pub fn hash_for_correlation(value: &str) -> String {
    let digest = Sha256::digest(value.as_bytes());
    digest
        .iter()
        .take(4)
        .map(|byte| format!("{:02x}", byte))
        .collect()
}

/// Error categories for metrics labels (bounded cardinality).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Rejected input
    Validation,
    /// Missing, invalid, expired or revoked tokens and bad credentials
    Authentication,
    /// Duplicate or missing resources
    Resource,
    /// Database, cache and crypto failures
    Internal,
}

impl ErrorCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCategory::Validation => "validation",
            ErrorCategory::Authentication => "authentication",
            ErrorCategory::Resource => "resource",
            ErrorCategory::Internal => "internal",
        }
    }
}

impl From<&RentalError> for ErrorCategory {
    fn from(err: &RentalError) -> Self {
        match err {
            RentalError::Validation(_) => ErrorCategory::Validation,
            RentalError::MissingToken
            | RentalError::InvalidToken(_)
            | RentalError::TokenExpired
            | RentalError::TokenRevoked
            | RentalError::AuthenticationFailed(_) => ErrorCategory::Authentication,
            RentalError::NotFound(_) | RentalError::Conflict(_) => ErrorCategory::Resource,
            RentalError::Database(_)
            | RentalError::Cache(_)
            | RentalError::Crypto(_)
            | RentalError::Internal => ErrorCategory::Internal,
        }
    }
}
