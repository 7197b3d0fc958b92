//! Logout: turn a still-valid token into a revocation entry.

use crate::errors::RentalError;
use crate::observability::metrics::record_revocation;
use crate::services::revocation_service::RevocationCache;
use tracing::instrument;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogoutOutcome {
    /// An entry was written that lives for `ttl_seconds`.
    Revoked { ttl_seconds: u64 },
    /// The token had already lapsed; nothing to write.
    AlreadyExpired,
}

/// Revoke `token` for the rest of its lifetime, measured from the wall clock.
pub async fn logout(
    cache: &RevocationCache,
    subject_id: i64,
    token: &str,
    expires_at: i64,
) -> Result<LogoutOutcome, RentalError> {
    logout_at(
        cache,
        subject_id,
        token,
        expires_at,
        chrono::Utc::now().timestamp(),
    )
    .await
}

/// Revoke `token` for `expires_at - now` seconds.
///
/// Logging out twice, or with an expired token, succeeds.
#[instrument(skip_all, fields(subject_id = subject_id))]
pub async fn logout_at(
    cache: &RevocationCache,
    subject_id: i64,
    token: &str,
    expires_at: i64,
    now: i64,
) -> Result<LogoutOutcome, RentalError> {
    let remaining = expires_at.saturating_sub(now);
    let Ok(ttl_seconds) = u64::try_from(remaining) else {
        record_revocation("already_expired");
        return Ok(LogoutOutcome::AlreadyExpired);
    };
    if ttl_seconds == 0 {
        record_revocation("already_expired");
        return Ok(LogoutOutcome::AlreadyExpired);
    }

    if let Err(e) = cache.revoke(subject_id, token, ttl_seconds).await {
        record_revocation("error");
        return Err(e.into());
    }

    record_revocation("revoked");
    tracing::info!(target: "rental.auth", subject_id = subject_id, ttl_seconds = ttl_seconds, "Token revoked");
    Ok(LogoutOutcome::Revoked { ttl_seconds })
}
