//! Fault injection tests for revocation cache outages.
//!
//! A guard that cannot reach the cache cannot tell a revoked token from a
//! good one, so guarded routes must fail closed with 503.

use rental_test_utils::{assert_error_response, TestRentalServer, TOSIN};
use reqwest::StatusCode;

#[tokio::test]
async fn test_guarded_route_fails_closed_when_cache_down() -> Result<(), anyhow::Error> {
    let server = TestRentalServer::spawn().await?;
    let session = server.register(TOSIN.name, TOSIN.email, TOSIN.password).await?;

    server.store().set_unavailable(true);

    let response = server
        .client()
        .get(server.api("/me"))
        .bearer_auth(&session.access_token)
        .send()
        .await?;
    let body = assert_error_response(response, 503, "SERVICE_UNAVAILABLE").await;
    let message = body["error"]["message"].as_str().unwrap_or_default();
    assert!(!message.contains("cache unavailable"), "Infrastructure detail leaked: {}", message);

    server.store().set_unavailable(false);

    let response = server
        .client()
        .get(server.api("/me"))
        .bearer_auth(&session.access_token)
        .send()
        .await?;
    assert_eq!(response.status(), StatusCode::OK);
    Ok(())
}

#[tokio::test]
async fn test_logout_fails_when_cache_down() -> Result<(), anyhow::Error> {
    let server = TestRentalServer::spawn().await?;
    let session = server.register(TOSIN.name, TOSIN.email, TOSIN.password).await?;

    server.store().set_unavailable(true);
    let response = server
        .client()
        .post(server.api("/auth/logout"))
        .bearer_auth(&session.access_token)
        .send()
        .await?;
    assert_error_response(response, 503, "SERVICE_UNAVAILABLE").await;

    // Nothing was revoked, so the token still works once the cache is back.
    server.store().set_unavailable(false);
    let response = server
        .client()
        .get(server.api("/me"))
        .bearer_auth(&session.access_token)
        .send()
        .await?;
    assert_eq!(response.status(), StatusCode::OK);
    Ok(())
}

#[tokio::test]
async fn test_login_unaffected_by_cache_outage() -> Result<(), anyhow::Error> {
    let server = TestRentalServer::spawn().await?;
    server.register(TOSIN.name, TOSIN.email, TOSIN.password).await?;

    server.store().set_unavailable(true);
    server.login(TOSIN.email, TOSIN.password).await?;
    Ok(())
}

#[tokio::test]
async fn test_readiness_returns_503_when_cache_unavailable() -> Result<(), anyhow::Error> {
    let server = TestRentalServer::spawn().await?;
    server.store().set_unavailable(true);

    let response = server
        .client()
        .get(format!("{}/ready", server.url()))
        .send()
        .await?;
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    let body: serde_json::Value = response.json().await?;
    assert_eq!(body["status"], "not_ready");
    assert_eq!(body["cache"], "unavailable");
    assert_eq!(body["error"], "Service dependencies unavailable");

    // Liveness is unaffected
    let response = server
        .client()
        .get(format!("{}/health", server.url()))
        .send()
        .await?;
    assert_eq!(response.status(), StatusCode::OK);
    Ok(())
}
