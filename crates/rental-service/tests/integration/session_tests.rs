//! E2E tests for logout and token revocation.

use rental_service::services::revocation_service::RevocationCache;
use rental_test_utils::{
    assert_error_response, TestRentalServer, TestTokenBuilder, EMEKA, TOSIN,
};
use reqwest::StatusCode;
use std::time::Duration;

#[tokio::test]
async fn test_logout_then_reuse_requires_login() -> Result<(), anyhow::Error> {
    let server = TestRentalServer::spawn().await?;
    let session = server
        .register(TOSIN.name, TOSIN.email, TOSIN.password)
        .await?;

    let response = server
        .client()
        .get(server.api("/me"))
        .bearer_auth(&session.access_token)
        .send()
        .await?;
    assert_eq!(response.status(), StatusCode::OK);

    let response = server
        .client()
        .post(server.api("/auth/logout"))
        .bearer_auth(&session.access_token)
        .send()
        .await?;
    assert_eq!(response.status(), StatusCode::OK);
    let body: serde_json::Value = response.json().await?;
    assert!(body["message"].is_string());

    let response = server
        .client()
        .get(server.api("/me"))
        .bearer_auth(&session.access_token)
        .send()
        .await?;
    let body = assert_error_response(response, 401, "LOGIN_REQUIRED").await;
    assert_eq!(body["error"]["message"], "You have to login!");
    Ok(())
}

#[tokio::test]
async fn test_logout_only_revokes_presented_token() -> Result<(), anyhow::Error> {
    let server = TestRentalServer::spawn().await?;
    let first = server
        .register(TOSIN.name, TOSIN.email, TOSIN.password)
        .await?;
    let second = server.login(TOSIN.email, TOSIN.password).await?;
    assert_ne!(first.access_token, second.access_token);

    server
        .client()
        .post(server.api("/auth/logout"))
        .bearer_auth(&first.access_token)
        .send()
        .await?;

    let response = server
        .client()
        .get(server.api("/me"))
        .bearer_auth(&second.access_token)
        .send()
        .await?;
    assert_eq!(response.status(), StatusCode::OK);
    Ok(())
}

#[tokio::test]
async fn test_logout_is_idempotent() -> Result<(), anyhow::Error> {
    let server = TestRentalServer::spawn().await?;
    let session = server
        .register(EMEKA.name, EMEKA.email, EMEKA.password)
        .await?;

    for _ in 0..2 {
        let response = server
            .client()
            .post(server.api("/auth/logout"))
            .bearer_auth(&session.access_token)
            .send()
            .await?;
        assert_eq!(response.status(), StatusCode::OK);
    }
    Ok(())
}

#[tokio::test]
async fn test_revocation_entry_lives_as_long_as_token() -> Result<(), anyhow::Error> {
    let server = TestRentalServer::spawn().await?;
    let session = server.register(TOSIN.name, TOSIN.email, TOSIN.password).await?;
    let expires_at = server.codec().verify(&session.access_token)?.expires_at;

    server
        .client()
        .post(server.api("/auth/logout"))
        .bearer_auth(&session.access_token)
        .send()
        .await?;

    let key = RevocationCache::revocation_key(session.user_id, &session.access_token);
    assert_eq!(server.store().keys(), vec![key.clone()]);
    assert!(!key.contains(&session.access_token), "raw tokens must not be stored");

    let ttl = server
        .store()
        .ttl(&key)
        .ok_or_else(|| anyhow::anyhow!("revocation entry missing"))?;
    let remaining = expires_at - chrono::Utc::now().timestamp();
    let remaining = Duration::from_secs(u64::try_from(remaining)?);
    assert!(ttl <= remaining + Duration::from_secs(1));
    assert!(ttl + Duration::from_secs(5) >= remaining);
    Ok(())
}

#[tokio::test]
async fn test_logout_with_expired_token_writes_nothing() -> Result<(), anyhow::Error> {
    let server = TestRentalServer::spawn().await?;
    let session = server.register(TOSIN.name, TOSIN.email, TOSIN.password).await?;
    let expired = TestTokenBuilder::new()
        .for_subject(session.user_id)
        .expired_seconds_ago(30)
        .build();

    let response = server
        .client()
        .post(server.api("/auth/logout"))
        .bearer_auth(&expired)
        .send()
        .await?;

    assert_eq!(response.status(), StatusCode::OK);
    assert!(server.store().keys().is_empty());
    Ok(())
}

#[tokio::test]
async fn test_logout_without_token_is_forbidden() -> Result<(), anyhow::Error> {
    let server = TestRentalServer::spawn().await?;

    let response = server
        .client()
        .post(server.api("/auth/logout"))
        .send()
        .await?;

    assert_error_response(response, 403, "MISSING_TOKEN").await;
    Ok(())
}
