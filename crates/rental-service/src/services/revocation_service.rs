//! Revocation list for logged-out tokens.
//!
//! One entry per revoked token, keyed `revoked:{subject_id}:{sha256(token)}`.
//! Each entry expires when the token it names would have expired, so the list
//! never outgrows the set of tokens that could still verify.

use crate::cache::{CacheError, ExpiringStore};
use crate::crypto::token_fingerprint;
use crate::observability::metrics::record_cache_operation;
use std::sync::Arc;
use std::time::Instant;
use tracing::instrument;

const REVOCATION_KEY_PREFIX: &str = "revoked";
const REVOKED_MARKER: &str = "1";

#[derive(Clone)]
pub struct RevocationCache {
    store: Arc<dyn ExpiringStore>,
}

impl RevocationCache {
    pub fn new(store: Arc<dyn ExpiringStore>) -> Self {
        Self { store }
    }

    /// Cache key for one token of one subject.
    ///
    /// The raw token never reaches the cache, only its SHA-256.
    pub fn revocation_key(subject_id: i64, token: &str) -> String {
        format!(
            "{}:{}:{}",
            REVOCATION_KEY_PREFIX,
            subject_id,
            token_fingerprint(token)
        )
    }

    /// Record `token` as revoked for `ttl_seconds`.
    ///
    /// `ttl_seconds` is the token's remaining lifetime. Zero writes nothing:
    /// the token is already unusable.
    #[instrument(skip_all, fields(subject_id = subject_id, ttl_seconds = ttl_seconds))]
    pub async fn revoke(
        &self,
        subject_id: i64,
        token: &str,
        ttl_seconds: u64,
    ) -> Result<(), CacheError> {
        if ttl_seconds == 0 {
            tracing::debug!(target: "rental.revocation", "Token already expired, nothing to revoke");
            return Ok(());
        }

        let key = Self::revocation_key(subject_id, token);
        let start = Instant::now();
        let result = self
            .store
            .set_with_expiry(&key, REVOKED_MARKER, ttl_seconds)
            .await;
        record_cache_operation("set", status_label(&result), start.elapsed());

        result
    }

    /// Whether this exact token was revoked for this subject.
    ///
    /// A store failure is an error, never "not revoked".
    #[instrument(skip_all, fields(subject_id = subject_id))]
    pub async fn is_revoked(&self, subject_id: i64, token: &str) -> Result<bool, CacheError> {
        let key = Self::revocation_key(subject_id, token);
        let start = Instant::now();
        let result = self.store.get(&key).await;
        record_cache_operation("get", status_label(&result), start.elapsed());

        Ok(result?.is_some())
    }

    pub async fn ping(&self) -> Result<(), CacheError> {
        let start = Instant::now();
        let result = self.store.ping().await;
        record_cache_operation("ping", status_label(&result), start.elapsed());
        result
    }
}

fn status_label<T>(result: &Result<T, CacheError>) -> &'static str {
    if result.is_ok() {
        "success"
    } else {
        "error"
    }
}
