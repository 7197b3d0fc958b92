//! Fault injection tests for database outages.

use rental_test_utils::{assert_error_response, TestRentalServer, TOSIN};
use reqwest::StatusCode;
use serde_json::json;

#[tokio::test]
async fn test_readiness_returns_503_when_db_unavailable() -> Result<(), anyhow::Error> {
    let server = TestRentalServer::spawn().await?;

    let response = server
        .client()
        .get(format!("{}/ready", server.url()))
        .send()
        .await?;
    assert_eq!(response.status(), StatusCode::OK);

    server.db().set_unavailable(true);

    let response = server
        .client()
        .get(format!("{}/ready", server.url()))
        .send()
        .await?;
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    let body: serde_json::Value = response.json().await?;
    assert_eq!(body["database"], "unhealthy");

    let response = server
        .client()
        .get(format!("{}/health", server.url()))
        .send()
        .await?;
    assert_eq!(response.status(), StatusCode::OK);
    Ok(())
}

#[tokio::test]
async fn test_register_db_failure_is_generic_500() -> Result<(), anyhow::Error> {
    let server = TestRentalServer::spawn().await?;
    server.db().set_unavailable(true);

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

    let body = assert_error_response(response, 500, "DATABASE_ERROR").await;
    assert_eq!(body["error"]["message"], "An internal database error occurred");
    Ok(())
}
