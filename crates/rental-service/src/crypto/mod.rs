use crate::config::{Config, MAX_BCRYPT_COST, MIN_BCRYPT_COST};
use crate::errors::RentalError;
use crate::observability::metrics::record_token_validation;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use thiserror::Error;
use tracing::instrument;

/// Maximum accepted token size in bytes (4KB).
///
/// Checked before any base64 decoding or signature work. Issued tokens are
/// around 200 bytes.
pub const MAX_TOKEN_SIZE_BYTES: usize = 4096;

/// Plaintext fed to bcrypt when building the dummy hash used for unknown
/// emails during login.
const DUMMY_PASSWORD: &str = "rental-service-dummy-password";

/// Claims carried by every bearer token.
///
/// `sub` is the decimal rendering of the user id. `jti` is a random UUID so
/// two tokens issued to the same user within the same second still differ.
#[derive(Clone, Serialize, Deserialize)]
pub struct TokenClaims {
    pub sub: String,
    pub iat: i64,
    pub exp: i64,
    pub jti: String,
}

/// Redacts `sub` so user ids do not leak through debug output.
impl fmt::Debug for TokenClaims {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenClaims")
            .field("sub", &"[REDACTED]")
            .field("iat", &self.iat)
            .field("exp", &self.exp)
            .field("jti", &self.jti)
            .finish()
    }
}

/// A freshly signed token.
#[derive(Clone)]
pub struct IssuedToken {
    pub token: String,
    pub issued_at: i64,
    pub expires_at: i64,
}

impl IssuedToken {
    /// Lifetime in seconds as seen at issue time.
    pub fn expires_in(&self) -> i64 {
        self.expires_at - self.issued_at
    }
}

impl fmt::Debug for IssuedToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IssuedToken")
            .field("token", &"[REDACTED]")
            .field("issued_at", &self.issued_at)
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

/// Outcome of a successful verification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VerifiedToken {
    pub subject_id: i64,
    pub issued_at: i64,
    pub expires_at: i64,
}

/// Why a token was rejected.
///
/// Everything that is not a well-formed token signed with our secret
/// collapses into `InvalidSignature`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TokenError {
    #[error("token signature is invalid")]
    InvalidSignature,

    #[error("token has expired")]
    Expired,
}

impl From<TokenError> for RentalError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::InvalidSignature => {
                RentalError::InvalidToken("The access token is invalid".to_string())
            }
            TokenError::Expired => RentalError::TokenExpired,
        }
    }
}

/// Signs and verifies HS256 bearer tokens with a process-wide secret.
///
/// The secret is fixed at construction. Verification is stateless: `exp`
/// travels in the payload, so no store lookup is needed.
pub struct TokenCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    clock_skew_seconds: i64,
}

impl fmt::Debug for TokenCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenCodec")
            .field("key", &"[REDACTED]")
            .field("clock_skew_seconds", &self.clock_skew_seconds)
            .finish()
    }
}

impl TokenCodec {
    pub fn new(secret: &[u8], clock_skew_seconds: i64) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // Expiry is checked against an explicit `now` in `verify_at`.
        validation.validate_exp = false;

        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validation,
            clock_skew_seconds,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.jwt_secret_bytes(), config.jwt_clock_skew_seconds)
    }

    /// Issue a token for `subject_id` valid for `lifetime_seconds` from now.
    pub fn issue(&self, subject_id: i64, lifetime_seconds: i64) -> Result<IssuedToken, RentalError> {
        self.issue_at(subject_id, lifetime_seconds, chrono::Utc::now().timestamp())
    }

    #[instrument(skip_all, fields(subject_id = subject_id))]
    pub fn issue_at(
        &self,
        subject_id: i64,
        lifetime_seconds: i64,
        now: i64,
    ) -> Result<IssuedToken, RentalError> {
        if lifetime_seconds <= 0 {
            return Err(RentalError::Crypto(format!(
                "Token lifetime must be positive, got {}",
                lifetime_seconds
            )));
        }

        let exp = now.checked_add(lifetime_seconds).ok_or_else(|| {
            RentalError::Crypto(format!(
                "Token lifetime {} overflows expiry from {}",
                lifetime_seconds, now
            ))
        })?;

        let claims = TokenClaims {
            sub: subject_id.to_string(),
            iat: now,
            exp,
            jti: uuid::Uuid::new_v4().to_string(),
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| RentalError::Crypto(format!("Token signing failed: {}", e)))?;

        Ok(IssuedToken {
            token,
            issued_at: claims.iat,
            expires_at: claims.exp,
        })
    }

    /// Verify signature and expiry against the wall clock.
    pub fn verify(&self, token: &str) -> Result<VerifiedToken, TokenError> {
        self.verify_at(token, chrono::Utc::now().timestamp())
    }

    /// Verify signature, then `iat` against the clock skew, then expiry.
    ///
    /// A tampered token that is also expired reports `InvalidSignature`.
    #[instrument(skip_all)]
    pub fn verify_at(&self, token: &str, now: i64) -> Result<VerifiedToken, TokenError> {
        let verified = match self.decode_signed(token) {
            Ok(verified) => verified,
            Err(e) => {
                record_token_validation("error", Some("invalid_signature"));
                return Err(e);
            }
        };

        let max_iat = now + self.clock_skew_seconds;
        if verified.issued_at > max_iat {
            tracing::debug!(
                target: "rental.crypto",
                iat = verified.issued_at,
                now = now,
                max_allowed = max_iat,
                "Token rejected: iat too far in the future"
            );
            record_token_validation("error", Some("clock_skew"));
            return Err(TokenError::InvalidSignature);
        }

        if now >= verified.expires_at {
            tracing::debug!(
                target: "rental.crypto",
                exp = verified.expires_at,
                now = now,
                "Token rejected: expired"
            );
            record_token_validation("error", Some("expired"));
            return Err(TokenError::Expired);
        }

        record_token_validation("success", None);
        Ok(verified)
    }

    /// Check only that the token is well formed and carries our signature.
    ///
    /// Expiry is not enforced, so logout can accept a token that has already
    /// lapsed.
    #[instrument(skip_all)]
    pub fn decode_signed(&self, token: &str) -> Result<VerifiedToken, TokenError> {
        if token.len() > MAX_TOKEN_SIZE_BYTES {
            tracing::debug!(
                target: "rental.crypto",
                token_size = token.len(),
                max_size = MAX_TOKEN_SIZE_BYTES,
                "Token rejected: size exceeds maximum allowed"
            );
            return Err(TokenError::InvalidSignature);
        }

        let token_data =
            decode::<TokenClaims>(token, &self.decoding_key, &self.validation).map_err(|e| {
                tracing::debug!(target: "rental.crypto", error = %e, "Token verification failed");
                TokenError::InvalidSignature
            })?;

        let claims = token_data.claims;
        let subject_id = claims.sub.parse::<i64>().map_err(|_| {
            tracing::debug!(target: "rental.crypto", "Token rejected: non-numeric subject");
            TokenError::InvalidSignature
        })?;

        Ok(VerifiedToken {
            subject_id,
            issued_at: claims.iat,
            expires_at: claims.exp,
        })
    }
}

/// Hash a password with bcrypt at the given cost.
///
/// Fails with `RentalError::Crypto` when the cost is outside the accepted
/// range, even though config validation has already checked it.
#[instrument(skip_all)]
pub fn hash_password(password: &str, cost: u32) -> Result<String, RentalError> {
    if !(MIN_BCRYPT_COST..=MAX_BCRYPT_COST).contains(&cost) {
        return Err(RentalError::Crypto(format!(
            "Invalid bcrypt cost: {} (must be {}-{})",
            cost, MIN_BCRYPT_COST, MAX_BCRYPT_COST
        )));
    }

    bcrypt::hash(password, cost)
        .map_err(|e| RentalError::Crypto(format!("Password hashing failed: {}", e)))
}

/// Compare a password against a bcrypt hash in constant time.
#[instrument(skip_all)]
pub fn verify_password(password: &str, hash: &str) -> Result<bool, RentalError> {
    bcrypt::verify(password, hash)
        .map_err(|e| RentalError::Crypto(format!("Password verification failed: {}", e)))
}

/// Build the hash compared against when a login names an unknown email.
///
/// Generated at the configured cost so both login paths cost the same.
pub fn dummy_password_hash(cost: u32) -> Result<String, RentalError> {
    hash_password(DUMMY_PASSWORD, cost)
}

/// SHA-256 of the raw token, hex encoded. Used to key revocation entries
/// without storing bearer tokens in the cache.
pub fn token_fingerprint(token: &str) -> String {
    hex::encode(Sha256::digest(token.as_bytes()))
}
