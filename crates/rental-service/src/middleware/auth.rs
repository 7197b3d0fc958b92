//! Access guard for protected routes.
//!
//! Provides two middleware functions:
//! - `require_auth` - signature, expiry, then revocation. Used on every
//!   protected route.
//! - `require_signed_token` - signature only. Used on logout so that an
//!   expired or already revoked token can still log out.
//!
//! Both read `Authorization: Bearer <token>` and attach an
//! [`AuthenticatedUser`] to the request extensions.

use crate::crypto::{TokenCodec, VerifiedToken};
use crate::errors::RentalError;
use crate::services::revocation_service::RevocationCache;
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::IntoResponse,
};
use std::fmt;
use std::sync::Arc;
use tracing::instrument;

/// State for the access guard.
#[derive(Clone)]
pub struct AuthState {
    pub codec: Arc<TokenCodec>,
    pub revocations: RevocationCache,
}

/// The caller, as established by the access guard.
#[derive(Clone)]
pub struct AuthenticatedUser {
    pub subject_id: i64,
    /// The bearer token as presented. Needed to revoke it on logout.
    pub token: String,
    pub issued_at: i64,
    pub expires_at: i64,
}

impl AuthenticatedUser {
    fn new(verified: VerifiedToken, token: String) -> Self {
        Self {
            subject_id: verified.subject_id,
            token,
            issued_at: verified.issued_at,
            expires_at: verified.expires_at,
        }
    }
}

impl fmt::Debug for AuthenticatedUser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthenticatedUser")
            .field("subject_id", &self.subject_id)
            .field("token", &"[REDACTED]")
            .field("issued_at", &self.issued_at)
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

/// Extract the bearer token from the Authorization header.
///
/// A missing header or an empty token is `MissingToken` (403); any other
/// scheme is `InvalidToken` (401).
fn extract_bearer_token(req: &Request) -> Result<&str, RentalError> {
    let Some(header) = req.headers().get("authorization") else {
        tracing::debug!(target: "rental.middleware.auth", "Missing Authorization header");
        return Err(RentalError::MissingToken);
    };

    let header = header.to_str().map_err(|_| {
        tracing::debug!(target: "rental.middleware.auth", "Non-ASCII Authorization header");
        RentalError::InvalidToken("Invalid Authorization header format".to_string())
    })?;

    let token = header.strip_prefix("Bearer ").ok_or_else(|| {
        tracing::debug!(target: "rental.middleware.auth", "Invalid Authorization header format");
        RentalError::InvalidToken("Invalid Authorization header format".to_string())
    })?;

    let token = token.trim();
    if token.is_empty() {
        return Err(RentalError::MissingToken);
    }
    Ok(token)
}

/// Full access guard.
///
/// # Response
///
/// - 403 if no token is presented
/// - 401 if the token is tampered, expired or revoked
/// - 503 if the revocation cache cannot be reached
/// - Otherwise continues with `AuthenticatedUser` in extensions
#[instrument(skip_all, name = "rental.middleware.auth")]
pub async fn require_auth(
    State(state): State<Arc<AuthState>>,
    mut req: Request,
    next: Next,
) -> Result<impl IntoResponse, RentalError> {
    let token = extract_bearer_token(&req)?.to_string();

    // Signature and expiry first: the revocation lookup only runs for
    // tokens we issued.
    let verified = state.codec.verify(&token)?;

    if state
        .revocations
        .is_revoked(verified.subject_id, &token)
        .await?
    {
        tracing::debug!(
            target: "rental.middleware.auth",
            subject_id = verified.subject_id,
            "Rejected revoked token"
        );
        return Err(RentalError::TokenRevoked);
    }

    req.extensions_mut()
        .insert(AuthenticatedUser::new(verified, token));

    Ok(next.run(req).await)
}

/// Signature-only guard for logout.
///
/// Expiry and revocation are left to the logout operation, which treats
/// both as already logged out.
#[instrument(skip_all, name = "rental.middleware.signed_token")]
pub async fn require_signed_token(
    State(state): State<Arc<AuthState>>,
    mut req: Request,
    next: Next,
) -> Result<impl IntoResponse, RentalError> {
    let token = extract_bearer_token(&req)?.to_string();
    let verified = state.codec.decode_signed(&token)?;

    req.extensions_mut()
        .insert(AuthenticatedUser::new(verified, token));

    Ok(next.run(req).await)
}
