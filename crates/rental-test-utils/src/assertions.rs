//! Custom test assertions for expressive tests.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use serde::Deserialize;
use serde_json::Value;

#[derive(Debug, Deserialize)]
struct JwtHeader {
    alg: String,
}

#[derive(Debug, Deserialize)]
struct JwtClaims {
    sub: String,
    exp: i64,
    iat: i64,
    jti: String,
}

fn decode_segment<T: for<'de> Deserialize<'de>>(token: &str, index: usize) -> T {
    let segment = token
        .split('.')
        .nth(index)
        .unwrap_or_else(|| panic!("JWT is missing segment {}", index));
    let bytes = URL_SAFE_NO_PAD
        .decode(segment)
        .unwrap_or_else(|e| panic!("Failed to base64 decode JWT segment {}: {}", index, e));
    serde_json::from_slice(&bytes)
        .unwrap_or_else(|e| panic!("Failed to parse JWT segment {}: {}", index, e))
}

/// Custom assertions for issued bearer tokens.
///
/// # Example
/// ```rust,ignore
/// token
///     .assert_valid_jwt()
///     .assert_for_subject(1)
///     .assert_expires_in(86_400);
/// ```
pub trait TokenAssertions {
    /// Three segments, HS256, and the claims the service issues.
    fn assert_valid_jwt(&self) -> &Self;

    fn assert_for_subject(&self, subject_id: i64) -> &Self;

    /// `exp - now` is within 5 seconds of `seconds`.
    fn assert_expires_in(&self, seconds: i64) -> &Self;
}

impl TokenAssertions for String {
    fn assert_valid_jwt(&self) -> &Self {
        assert_eq!(
            self.split('.').count(),
            3,
            "JWT must have 3 parts (header.payload.signature)"
        );

        let header: JwtHeader = decode_segment(self, 0);
        assert_eq!(header.alg, "HS256", "Expected HS256 algorithm");

        let claims: JwtClaims = decode_segment(self, 1);
        assert!(claims.exp > claims.iat, "Token expires before it is issued");
        assert!(!claims.jti.is_empty(), "Token has no jti");

        self
    }

    fn assert_for_subject(&self, subject_id: i64) -> &Self {
        let claims: JwtClaims = decode_segment(self, 1);
        assert_eq!(
            claims.sub,
            subject_id.to_string(),
            "Token is for subject {}, expected {}",
            claims.sub,
            subject_id
        );
        self
    }

    fn assert_expires_in(&self, seconds: i64) -> &Self {
        let claims: JwtClaims = decode_segment(self, 1);
        let expires_in = claims.exp - chrono::Utc::now().timestamp();
        assert!(
            (expires_in - seconds).abs() <= 5,
            "Token expires in {} seconds, expected about {}",
            expires_in,
            seconds
        );
        self
    }
}

/// Assert an error response's status and `error.code`, returning the body.
pub async fn assert_error_response(
    response: reqwest::Response,
    expected_status: u16,
    expected_code: &str,
) -> Value {
    let status = response.status().as_u16();
    let body: Value = response
        .json()
        .await
        .expect("Error response body must be JSON");

    assert_eq!(
        status, expected_status,
        "Unexpected status, body: {}",
        body
    );
    assert_eq!(
        body["error"]["code"], expected_code,
        "Unexpected error code, body: {}",
        body
    );
    body
}

/// Fields named in a `VALIDATION_ERROR` body, in order.
pub fn validation_fields(body: &Value) -> Vec<String> {
    body["error"]["fields"]
        .as_array()
        .map(|fields| {
            fields
                .iter()
                .filter_map(|f| f["field"].as_str().map(str::to_string))
                .collect()
        })
        .unwrap_or_default()
}
