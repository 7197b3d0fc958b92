//! E2E tests for the access guard's token checks.

use jsonwebtoken::Algorithm;
use rental_test_utils::{
    assert_error_response, tamper_signature, TestRentalServer, TestTokenBuilder,
    FOREIGN_JWT_SECRET, TOSIN,
};
use reqwest::StatusCode;
use serde_json::json;

#[tokio::test]
async fn test_missing_token_is_forbidden() -> Result<(), anyhow::Error> {
    let server = TestRentalServer::spawn().await?;

    let response = server.client().get(server.api("/me")).send().await?;

    let body = assert_error_response(response, 403, "MISSING_TOKEN").await;
    assert_eq!(body["error"]["message"], "No token provided!");
    Ok(())
}

#[tokio::test]
async fn test_empty_bearer_is_forbidden() -> Result<(), anyhow::Error> {
    let server = TestRentalServer::spawn().await?;

    let response = server
        .client()
        .get(server.api("/me"))
        .header("authorization", "Bearer ")
        .send()
        .await?;

    assert_error_response(response, 403, "MISSING_TOKEN").await;
    Ok(())
}

#[tokio::test]
async fn test_non_bearer_scheme_is_invalid() -> Result<(), anyhow::Error> {
    let server = TestRentalServer::spawn().await?;
    let session = server.register(TOSIN.name, TOSIN.email, TOSIN.password).await?;

    let response = server
        .client()
        .get(server.api("/me"))
        .header("authorization", format!("Token {}", session.access_token))
        .send()
        .await?;

    assert_error_response(response, 401, "INVALID_TOKEN").await;
    Ok(())
}

#[tokio::test]
async fn test_tampered_token_is_invalid() -> Result<(), anyhow::Error> {
    let server = TestRentalServer::spawn().await?;
    let session = server.register(TOSIN.name, TOSIN.email, TOSIN.password).await?;

    let response = server
        .client()
        .get(server.api("/me"))
        .bearer_auth(tamper_signature(&session.access_token))
        .send()
        .await?;

    assert_error_response(response, 401, "INVALID_TOKEN").await;
    Ok(())
}

#[tokio::test]
async fn test_foreign_signed_token_is_invalid() -> Result<(), anyhow::Error> {
    let server = TestRentalServer::spawn().await?;
    let session = server.register(TOSIN.name, TOSIN.email, TOSIN.password).await?;
    let forged = TestTokenBuilder::new()
        .for_subject(session.user_id)
        .signed_with(FOREIGN_JWT_SECRET)
        .build();

    let response = server
        .client()
        .get(server.api("/me"))
        .bearer_auth(forged)
        .send()
        .await?;

    assert_error_response(response, 401, "INVALID_TOKEN").await;
    Ok(())
}

#[tokio::test]
async fn test_other_algorithm_is_invalid() -> Result<(), anyhow::Error> {
    let server = TestRentalServer::spawn().await?;
    let token = TestTokenBuilder::new()
        .with_algorithm(Algorithm::HS512)
        .build();

    let response = server
        .client()
        .get(server.api("/me"))
        .bearer_auth(token)
        .send()
        .await?;

    assert_error_response(response, 401, "INVALID_TOKEN").await;
    Ok(())
}

#[tokio::test]
async fn test_non_numeric_subject_is_invalid() -> Result<(), anyhow::Error> {
    let server = TestRentalServer::spawn().await?;
    let token = TestTokenBuilder::new()
        .with_raw_subject(json!("tosin"))
        .build();

    let response = server
        .client()
        .get(server.api("/me"))
        .bearer_auth(token)
        .send()
        .await?;

    assert_error_response(response, 401, "INVALID_TOKEN").await;
    Ok(())
}

#[tokio::test]
async fn test_expired_token_is_rejected() -> Result<(), anyhow::Error> {
    let server = TestRentalServer::spawn().await?;
    let session = server.register(TOSIN.name, TOSIN.email, TOSIN.password).await?;
    let expired = TestTokenBuilder::new()
        .for_subject(session.user_id)
        .expired_seconds_ago(1)
        .build();

    let response = server
        .client()
        .get(server.api("/me"))
        .bearer_auth(expired)
        .send()
        .await?;

    assert_error_response(response, 401, "TOKEN_EXPIRED").await;
    Ok(())
}

// ============================================================================
// Clock skew on `iat`
// ============================================================================

#[tokio::test]
async fn test_iat_within_skew_is_accepted() -> Result<(), anyhow::Error> {
    let server = TestRentalServer::spawn().await?;
    let session = server.register(TOSIN.name, TOSIN.email, TOSIN.password).await?;
    let skew = server.config().jwt_clock_skew_seconds;
    let token = TestTokenBuilder::new()
        .for_subject(session.user_id)
        .issued_at(chrono::Utc::now().timestamp() + skew - 30)
        .expires_in(3600)
        .build();

    let response = server
        .client()
        .get(server.api("/me"))
        .bearer_auth(token)
        .send()
        .await?;

    assert_eq!(response.status(), StatusCode::OK);
    Ok(())
}

#[tokio::test]
async fn test_iat_beyond_skew_is_invalid() -> Result<(), anyhow::Error> {
    let server = TestRentalServer::spawn().await?;
    let skew = server.config().jwt_clock_skew_seconds;
    let token = TestTokenBuilder::new()
        .issued_at(chrono::Utc::now().timestamp() + skew + 60)
        .expires_in(skew + 3600)
        .build();

    let response = server
        .client()
        .get(server.api("/me"))
        .bearer_auth(token)
        .send()
        .await?;

    assert_error_response(response, 401, "INVALID_TOKEN").await;
    Ok(())
}
