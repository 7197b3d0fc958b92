//! E2E tests for apartment listings.

use rental_test_utils::{
    assert_error_response, validation_fields, TestRentalServer, ADA, TEST_APARTMENT_ADDRESS,
    TEST_APARTMENT_STATE, TEST_APARTMENT_TYPE, TOSIN,
};
use reqwest::StatusCode;
use serde_json::{json, Value};

#[tokio::test]
async fn test_create_apartment_happy_path() -> Result<(), anyhow::Error> {
    let server = TestRentalServer::spawn().await?;
    let owner = server.register(TOSIN.name, TOSIN.email, TOSIN.password).await?;

    let response = server
        .client()
        .post(server.api("/apartments"))
        .bearer_auth(&owner.access_token)
        .json(&json!({
            "type": TEST_APARTMENT_TYPE,
            "address": TEST_APARTMENT_ADDRESS,
            "state": TEST_APARTMENT_STATE
        }))
        .send()
        .await?;

    assert_eq!(response.status(), StatusCode::CREATED);
    let body: Value = response.json().await?;
    assert_eq!(body["owner_id"].as_i64(), Some(owner.user_id));
    assert_eq!(body["type"], "duplex");
    assert_eq!(body["state"], "Lagos");
    Ok(())
}

#[tokio::test]
async fn test_create_apartment_blank_fields_rejected() -> Result<(), anyhow::Error> {
    let server = TestRentalServer::spawn().await?;
    let owner = server.register(TOSIN.name, TOSIN.email, TOSIN.password).await?;

    let response = server
        .client()
        .post(server.api("/apartments"))
        .bearer_auth(&owner.access_token)
        .json(&json!({"type": " ", "address": "", "state": "Lagos"}))
        .send()
        .await?;

    let body = assert_error_response(response, 422, "VALIDATION_ERROR").await;
    assert_eq!(validation_fields(&body), vec!["type", "address"]);
    Ok(())
}

#[tokio::test]
async fn test_list_apartments_filters_by_state() -> Result<(), anyhow::Error> {
    let server = TestRentalServer::spawn().await?;
    let owner = server.register(TOSIN.name, TOSIN.email, TOSIN.password).await?;
    server
        .create_apartment(&owner.access_token, "duplex", "12 Marina Road", "Lagos")
        .await?;
    server
        .create_apartment(&owner.access_token, "flat", "3 Aminu Kano Crescent", "Abuja")
        .await?;

    let all: Value = server
        .client()
        .get(server.api("/apartments"))
        .bearer_auth(&owner.access_token)
        .send()
        .await?
        .json()
        .await?;
    assert_eq!(all.as_array().map(Vec::len), Some(2));

    let lagos: Value = server
        .client()
        .get(server.api("/apartments?state=LAGOS"))
        .bearer_auth(&owner.access_token)
        .send()
        .await?
        .json()
        .await?;
    let lagos = lagos.as_array().cloned().unwrap_or_default();
    assert_eq!(lagos.len(), 1);
    assert_eq!(lagos[0]["address"], "12 Marina Road");
    assert_eq!(lagos[0]["owner"], "Tosin");
    Ok(())
}

#[tokio::test]
async fn test_get_apartment_includes_owner_name() -> Result<(), anyhow::Error> {
    let server = TestRentalServer::spawn().await?;
    let owner = server.register(TOSIN.name, TOSIN.email, TOSIN.password).await?;
    let id = server
        .create_apartment(&owner.access_token, "bungalow", "4 Allen Avenue", "Lagos")
        .await?;

    let response = server
        .client()
        .get(server.api(&format!("/apartments/{}", id)))
        .bearer_auth(&owner.access_token)
        .send()
        .await?;

    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await?;
    assert_eq!(body["owner"], "Tosin");
    assert_eq!(body["type"], "bungalow");

    let response = server
        .client()
        .get(server.api("/apartments/424242"))
        .bearer_auth(&owner.access_token)
        .send()
        .await?;
    assert_error_response(response, 404, "NOT_FOUND").await;
    Ok(())
}

#[tokio::test]
async fn test_update_apartment_is_owner_scoped() -> Result<(), anyhow::Error> {
    let server = TestRentalServer::spawn().await?;
    let owner = server.register(TOSIN.name, TOSIN.email, TOSIN.password).await?;
    let other = server.register(ADA.name, ADA.email, ADA.password).await?;
    let id = server
        .create_apartment(&owner.access_token, "duplex", "12 Marina Road", "Lagos")
        .await?;

    let response = server
        .client()
        .patch(server.api(&format!("/apartments/{}", id)))
        .bearer_auth(&other.access_token)
        .json(&json!({"address": "Somewhere else"}))
        .send()
        .await?;
    assert_error_response(response, 404, "NOT_FOUND").await;

    let response = server
        .client()
        .patch(server.api(&format!("/apartments/{}", id)))
        .bearer_auth(&owner.access_token)
        .json(&json!({"address": "14 Marina Road"}))
        .send()
        .await?;
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await?;
    assert_eq!(body["address"], "14 Marina Road");
    assert_eq!(body["type"], "duplex");
    Ok(())
}

#[tokio::test]
async fn test_delete_apartment_is_owner_scoped() -> Result<(), anyhow::Error> {
    let server = TestRentalServer::spawn().await?;
    let owner = server.register(TOSIN.name, TOSIN.email, TOSIN.password).await?;
    let other = server.register(ADA.name, ADA.email, ADA.password).await?;
    let id = server
        .create_apartment(&owner.access_token, "duplex", "12 Marina Road", "Lagos")
        .await?;

    let response = server
        .client()
        .delete(server.api(&format!("/apartments/{}", id)))
        .bearer_auth(&other.access_token)
        .send()
        .await?;
    assert_error_response(response, 404, "NOT_FOUND").await;

    let response = server
        .client()
        .delete(server.api(&format!("/apartments/{}", id)))
        .bearer_auth(&owner.access_token)
        .send()
        .await?;
    assert_eq!(response.status(), StatusCode::OK);

    let response = server
        .client()
        .get(server.api(&format!("/apartments/{}", id)))
        .bearer_auth(&owner.access_token)
        .send()
        .await?;
    assert_error_response(response, 404, "NOT_FOUND").await;
    Ok(())
}

#[tokio::test]
async fn test_owner_listings() -> Result<(), anyhow::Error> {
    let server = TestRentalServer::spawn().await?;
    let owner = server.register(TOSIN.name, TOSIN.email, TOSIN.password).await?;
    let other = server.register(ADA.name, ADA.email, ADA.password).await?;
    server
        .create_apartment(&owner.access_token, "duplex", "12 Marina Road", "Lagos")
        .await?;
    server
        .create_apartment(&other.access_token, "flat", "9 Bode Thomas Street", "Lagos")
        .await?;

    let mine: Value = server
        .client()
        .get(server.api("/me/apartments"))
        .bearer_auth(&owner.access_token)
        .send()
        .await?
        .json()
        .await?;
    let mine = mine.as_array().cloned().unwrap_or_default();
    assert_eq!(mine.len(), 1);
    assert_eq!(mine[0]["address"], "12 Marina Road");

    let theirs: Value = server
        .client()
        .get(server.api(&format!("/users/{}/apartments", other.user_id)))
        .bearer_auth(&owner.access_token)
        .send()
        .await?
        .json()
        .await?;
    let theirs = theirs.as_array().cloned().unwrap_or_default();
    assert_eq!(theirs.len(), 1);
    assert_eq!(theirs[0]["owner_id"].as_i64(), Some(other.user_id));
    Ok(())
}
