//! E2E tests for registration and login.
//!
//! ## Test Naming
//!
//! Tests follow the convention: `test_<feature>_<scenario>_<expected_result>`

use rental_service::config::{
    DEFAULT_LOGIN_TOKEN_LIFETIME_SECONDS, DEFAULT_REGISTRATION_TOKEN_LIFETIME_SECONDS,
};
use rental_test_utils::{
    assert_error_response, validation_fields, TestRentalServer, TokenAssertions, ADA,
    DISALLOWED_TLD_EMAIL, TOSIN,
};
use reqwest::StatusCode;
use serde_json::json;

// ============================================================================
// Registration
// ============================================================================

#[tokio::test]
async fn test_register_happy_path() -> Result<(), anyhow::Error> {
    let server = TestRentalServer::spawn().await?;

    let response = server
        .client()
        .post(server.api("/auth/register"))
        .json(&json!({
            "name": TOSIN.name,
            "email": TOSIN.email,
            "password": TOSIN.password
        }))
        .send()
        .await?;

    assert_eq!(response.status(), StatusCode::CREATED);

    let body: serde_json::Value = response.json().await?;
    assert_eq!(body["user"]["name"], "Tosin");
    assert_eq!(body["user"]["email"], "tosin@example.com");
    assert!(body["user"].get("password_hash").is_none());
    assert_eq!(body["token_type"], "Bearer");
    assert_eq!(
        body["expires_in"].as_i64(),
        Some(DEFAULT_REGISTRATION_TOKEN_LIFETIME_SECONDS)
    );

    let user_id = body["user"]["id"].as_i64().unwrap_or_default();
    body["access_token"]
        .as_str()
        .unwrap_or_default()
        .to_string()
        .assert_valid_jwt()
        .assert_for_subject(user_id)
        .assert_expires_in(DEFAULT_REGISTRATION_TOKEN_LIFETIME_SECONDS);
    Ok(())
}

#[tokio::test]
async fn test_register_stores_bcrypt_hash_not_password() -> Result<(), anyhow::Error> {
    let server = TestRentalServer::spawn().await?;
    let session = server
        .register(TOSIN.name, TOSIN.email, TOSIN.password)
        .await?;

    let user = server
        .db()
        .user(session.user_id)
        .ok_or_else(|| anyhow::anyhow!("user was not stored"))?;
    assert_ne!(user.password_hash, TOSIN.password);
    assert!(user.password_hash.starts_with("$2"));
    Ok(())
}

#[tokio::test]
async fn test_register_duplicate_email_conflicts() -> Result<(), anyhow::Error> {
    let server = TestRentalServer::spawn().await?;
    server
        .register(TOSIN.name, TOSIN.email, TOSIN.password)
        .await?;

    // Same address, different case and padding
    let response = server
        .client()
        .post(server.api("/auth/register"))
        .json(&json!({
            "name": "Another Tosin",
            "email": "  TOSIN@example.com ",
            "password": "AnotherPass1"
        }))
        .send()
        .await?;

    assert_error_response(response, 409, "CONFLICT").await;
    Ok(())
}

#[tokio::test]
async fn test_register_disallowed_tld_is_rejected() -> Result<(), anyhow::Error> {
    let server = TestRentalServer::spawn().await?;

    let response = server
        .client()
        .post(server.api("/auth/register"))
        .json(&json!({
            "name": "Jale",
            "email": DISALLOWED_TLD_EMAIL,
            "password": "JalePass123"
        }))
        .send()
        .await?;

    let body = assert_error_response(response, 422, "VALIDATION_ERROR").await;
    assert_eq!(validation_fields(&body), vec!["email"]);
    Ok(())
}

#[tokio::test]
async fn test_register_reports_every_invalid_field() -> Result<(), anyhow::Error> {
    let server = TestRentalServer::spawn().await?;

    let response = server
        .client()
        .post(server.api("/auth/register"))
        .json(&json!({"name": "  ", "email": "not-an-email", "password": "short"}))
        .send()
        .await?;

    let body = assert_error_response(response, 422, "VALIDATION_ERROR").await;
    assert_eq!(validation_fields(&body), vec!["name", "email", "password"]);
    Ok(())
}

#[tokio::test]
async fn test_register_missing_field_is_validation_error() -> Result<(), anyhow::Error> {
    let server = TestRentalServer::spawn().await?;

    let response = server
        .client()
        .post(server.api("/auth/register"))
        .json(&json!({"name": "Tosin", "email": "tosin@example.com"}))
        .send()
        .await?;

    let body = assert_error_response(response, 422, "VALIDATION_ERROR").await;
    assert_eq!(validation_fields(&body), vec!["body"]);
    Ok(())
}

// ============================================================================
// Login
// ============================================================================

#[tokio::test]
async fn test_login_happy_path() -> Result<(), anyhow::Error> {
    let server = TestRentalServer::spawn().await?;
    let registered = server
        .register(TOSIN.name, TOSIN.email, TOSIN.password)
        .await?;

    let response = server
        .client()
        .post(server.api("/auth/login"))
        .json(&json!({"email": TOSIN.email, "password": TOSIN.password}))
        .send()
        .await?;

    assert_eq!(response.status(), StatusCode::OK);
    let body: serde_json::Value = response.json().await?;
    assert_eq!(body["user"]["id"].as_i64(), Some(registered.user_id));
    assert_eq!(
        body["expires_in"].as_i64(),
        Some(DEFAULT_LOGIN_TOKEN_LIFETIME_SECONDS)
    );
    body["access_token"]
        .as_str()
        .unwrap_or_default()
        .to_string()
        .assert_valid_jwt()
        .assert_for_subject(registered.user_id)
        .assert_expires_in(DEFAULT_LOGIN_TOKEN_LIFETIME_SECONDS);
    Ok(())
}

#[tokio::test]
async fn test_login_email_is_case_insensitive() -> Result<(), anyhow::Error> {
    let server = TestRentalServer::spawn().await?;
    server.register(ADA.name, ADA.email, ADA.password).await?;

    let session = server.login("ADA@Example.NG", ADA.password).await?;
    assert!(session.user_id > 0);
    Ok(())
}

#[tokio::test]
async fn test_login_wrong_password_is_unauthorized() -> Result<(), anyhow::Error> {
    let server = TestRentalServer::spawn().await?;
    server
        .register(TOSIN.name, TOSIN.email, TOSIN.password)
        .await?;

    let response = server
        .client()
        .post(server.api("/auth/login"))
        .json(&json!({"email": TOSIN.email, "password": "NotMyPass1"}))
        .send()
        .await?;

    assert_eq!(
        response
            .headers()
            .get("www-authenticate")
            .and_then(|v| v.to_str().ok()),
        Some("Bearer realm=\"rental-api\"")
    );
    assert_error_response(response, 401, "INVALID_CREDENTIALS").await;
    Ok(())
}

#[tokio::test]
async fn test_login_unknown_email_matches_wrong_password() -> Result<(), anyhow::Error> {
    let server = TestRentalServer::spawn().await?;
    server
        .register(TOSIN.name, TOSIN.email, TOSIN.password)
        .await?;

    let wrong_password = server
        .client()
        .post(server.api("/auth/login"))
        .json(&json!({"email": TOSIN.email, "password": "NotMyPass1"}))
        .send()
        .await?;
    let unknown_email = server
        .client()
        .post(server.api("/auth/login"))
        .json(&json!({"email": "nobody@example.com", "password": "NotMyPass1"}))
        .send()
        .await?;

    let a = assert_error_response(wrong_password, 401, "INVALID_CREDENTIALS").await;
    let b = assert_error_response(unknown_email, 401, "INVALID_CREDENTIALS").await;
    assert_eq!(a, b, "Callers must not learn which emails are registered");
    Ok(())
}
