//! Builder patterns for test tokens.
//!
//! The server only ever mints well-formed, unexpired tokens. These builders
//! produce the rest: expired, future-dated, foreign-signed, non-numeric
//! subjects and wrong algorithms.

use crate::crypto_fixtures::TEST_JWT_SECRET;
use chrono::Utc;
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde_json::{json, Value};

/// Builder for signed test tokens.
///
/// # Example
/// ```rust,ignore
/// let token = TestTokenBuilder::new()
///     .for_subject(1)
///     .expired_seconds_ago(60)
///     .build();
/// ```
pub struct TestTokenBuilder {
    sub: Value,
    iat: i64,
    exp: i64,
    jti: String,
    secret: String,
    algorithm: Algorithm,
}

impl TestTokenBuilder {
    /// One-hour token for subject 1, signed with the test secret.
    pub fn new() -> Self {
        let now = Utc::now().timestamp();
        Self {
            sub: json!("1"),
            iat: now,
            exp: now + 3600,
            jti: uuid::Uuid::new_v4().to_string(),
            secret: TEST_JWT_SECRET.to_string(),
            algorithm: Algorithm::HS256,
        }
    }

    pub fn for_subject(mut self, subject_id: i64) -> Self {
        self.sub = json!(subject_id.to_string());
        self
    }

    /// Put an arbitrary JSON value in `sub`.
    pub fn with_raw_subject(mut self, sub: Value) -> Self {
        self.sub = sub;
        self
    }

    /// Expire `seconds` from now.
    pub fn expires_in(mut self, seconds: i64) -> Self {
        self.exp = Utc::now().timestamp() + seconds;
        self
    }

    /// Expired `seconds` ago, issued an hour before that.
    pub fn expired_seconds_ago(mut self, seconds: i64) -> Self {
        self.exp = Utc::now().timestamp() - seconds;
        self.iat = self.exp - 3600;
        self
    }

    pub fn issued_at(mut self, timestamp: i64) -> Self {
        self.iat = timestamp;
        self
    }

    pub fn signed_with(mut self, secret: &str) -> Self {
        self.secret = secret.to_string();
        self
    }

    /// HMAC variants only.
    pub fn with_algorithm(mut self, algorithm: Algorithm) -> Self {
        self.algorithm = algorithm;
        self
    }

    /// The claims as they will be signed.
    pub fn claims(&self) -> Value {
        json!({
            "sub": self.sub,
            "iat": self.iat,
            "exp": self.exp,
            "jti": self.jti,
        })
    }

    pub fn build(self) -> String {
        encode(
            &Header::new(self.algorithm),
            &self.claims(),
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
        .expect("Failed to sign test token")
    }
}

impl Default for TestTokenBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Flip one character of the signature segment.
pub fn tamper_signature(token: &str) -> String {
    let mut chars: Vec<char> = token.chars().collect();
    let last = chars.last_mut().expect("Token must not be empty");
    *last = if *last == 'A' { 'B' } else { 'A' };
    chars.into_iter().collect()
}
