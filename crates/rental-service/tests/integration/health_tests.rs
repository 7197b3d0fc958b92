//! Integration tests for the health probes and the metrics endpoint.

use rental_test_utils::{assert_error_response, TestRentalServer};
use reqwest::StatusCode;

#[tokio::test]
async fn test_health_endpoint_returns_ok() -> Result<(), anyhow::Error> {
    let server = TestRentalServer::spawn().await?;

    let response = server
        .client()
        .get(format!("{}/health", server.url()))
        .send()
        .await?;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.text().await?, "OK");
    Ok(())
}

#[tokio::test]
async fn test_ready_endpoint_reports_dependencies() -> Result<(), anyhow::Error> {
    let server = TestRentalServer::spawn().await?;

    let response = server
        .client()
        .get(format!("{}/ready", server.url()))
        .send()
        .await?;

    assert_eq!(response.status(), StatusCode::OK);
    let body: serde_json::Value = response.json().await?;
    assert_eq!(body["status"], "ready");
    assert_eq!(body["database"], "healthy");
    assert_eq!(body["cache"], "available");
    assert!(body.get("error").is_none());
    Ok(())
}

#[tokio::test]
async fn test_metrics_endpoint_is_public() -> Result<(), anyhow::Error> {
    let server = TestRentalServer::spawn().await?;

    // Generate at least one request first
    server
        .client()
        .get(format!("{}/health", server.url()))
        .send()
        .await?;

    let response = server
        .client()
        .get(format!("{}/metrics", server.url()))
        .send()
        .await?;

    assert_eq!(response.status(), StatusCode::OK);
    Ok(())
}

#[tokio::test]
async fn test_unknown_route_is_not_found() -> Result<(), anyhow::Error> {
    let server = TestRentalServer::spawn().await?;

    let response = server
        .client()
        .get(format!("{}/wp-login.php", server.url()))
        .send()
        .await?;

    assert_error_response(response, 404, "NOT_FOUND").await;
    Ok(())
}
