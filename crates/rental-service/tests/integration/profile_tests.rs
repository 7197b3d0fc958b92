//! E2E tests for `/me` and the user directory.

use rental_test_utils::{
    assert_error_response, validation_fields, TestRentalServer, TestTokenBuilder, ADA, TOSIN,
    UNKNOWN_USER_ID,
};
use reqwest::StatusCode;
use serde_json::json;

#[tokio::test]
async fn test_get_me_returns_caller_profile() -> Result<(), anyhow::Error> {
    let server = TestRentalServer::spawn().await?;
    let session = server.register(TOSIN.name, TOSIN.email, TOSIN.password).await?;

    let response = server
        .client()
        .get(server.api("/me"))
        .bearer_auth(&session.access_token)
        .send()
        .await?;

    assert_eq!(response.status(), StatusCode::OK);
    let body: serde_json::Value = response.json().await?;
    assert_eq!(body, json!({"id": session.user_id, "name": "Tosin", "email": "tosin@example.com"}));
    Ok(())
}

#[tokio::test]
async fn test_get_me_for_deleted_subject_is_not_found() -> Result<(), anyhow::Error> {
    let server = TestRentalServer::spawn().await?;
    let token = TestTokenBuilder::new().for_subject(UNKNOWN_USER_ID).build();

    let response = server
        .client()
        .get(server.api("/me"))
        .bearer_auth(token)
        .send()
        .await?;

    assert_error_response(response, 404, "NOT_FOUND").await;
    Ok(())
}

#[tokio::test]
async fn test_update_me_changes_password() -> Result<(), anyhow::Error> {
    let server = TestRentalServer::spawn().await?;
    let session = server.register(TOSIN.name, TOSIN.email, TOSIN.password).await?;

    let response = server
        .client()
        .patch(server.api("/me"))
        .bearer_auth(&session.access_token)
        .json(&json!({"name": "Tosin A.", "password": "BrandNewPass1"}))
        .send()
        .await?;
    assert_eq!(response.status(), StatusCode::OK);
    let body: serde_json::Value = response.json().await?;
    assert_eq!(body["name"], "Tosin A.");

    assert!(server.login(TOSIN.email, TOSIN.password).await.is_err());
    server.login(TOSIN.email, "BrandNewPass1").await?;
    Ok(())
}

#[tokio::test]
async fn test_update_me_requires_a_field() -> Result<(), anyhow::Error> {
    let server = TestRentalServer::spawn().await?;
    let session = server.register(TOSIN.name, TOSIN.email, TOSIN.password).await?;

    let response = server
        .client()
        .patch(server.api("/me"))
        .bearer_auth(&session.access_token)
        .json(&json!({}))
        .send()
        .await?;

    let body = assert_error_response(response, 422, "VALIDATION_ERROR").await;
    assert_eq!(validation_fields(&body), vec!["body"]);
    Ok(())
}

#[tokio::test]
async fn test_update_me_taken_email_conflicts() -> Result<(), anyhow::Error> {
    let server = TestRentalServer::spawn().await?;
    let session = server.register(TOSIN.name, TOSIN.email, TOSIN.password).await?;
    server.register(ADA.name, ADA.email, ADA.password).await?;

    let response = server
        .client()
        .patch(server.api("/me"))
        .bearer_auth(&session.access_token)
        .json(&json!({"email": ADA.email}))
        .send()
        .await?;

    assert_error_response(response, 409, "CONFLICT").await;
    Ok(())
}

#[tokio::test]
async fn test_list_users_hides_password_hashes() -> Result<(), anyhow::Error> {
    let server = TestRentalServer::spawn().await?;
    let session = server.register(TOSIN.name, TOSIN.email, TOSIN.password).await?;
    server.register(ADA.name, ADA.email, ADA.password).await?;

    let response = server
        .client()
        .get(server.api("/users"))
        .bearer_auth(&session.access_token)
        .send()
        .await?;

    assert_eq!(response.status(), StatusCode::OK);
    let body: serde_json::Value = response.json().await?;
    let users = body.as_array().cloned().unwrap_or_default();
    assert_eq!(users.len(), 2);
    assert!(users.iter().all(|u| u.get("password_hash").is_none()));
    Ok(())
}
