//! E2E tests for apartment reviews.

use rental_test_utils::{assert_error_response, validation_fields, TestRentalServer, ADA, TOSIN};
use reqwest::StatusCode;
use serde_json::{json, Value};

#[tokio::test]
async fn test_review_round_trip() -> Result<(), anyhow::Error> {
    let server = TestRentalServer::spawn().await?;
    let owner = server.register(TOSIN.name, TOSIN.email, TOSIN.password).await?;
    let guest = server.register(ADA.name, ADA.email, ADA.password).await?;
    let apartment_id = server
        .create_apartment(&owner.access_token, "duplex", "12 Marina Road", "Lagos")
        .await?;

    let response = server
        .client()
        .post(server.api(&format!("/apartments/{}/reviews", apartment_id)))
        .bearer_auth(&guest.access_token)
        .json(&json!({"body": "Bright rooms, steady power."}))
        .send()
        .await?;
    assert_eq!(response.status(), StatusCode::CREATED);
    let review: Value = response.json().await?;
    assert_eq!(review["user_id"].as_i64(), Some(guest.user_id));

    let reviews: Value = server
        .client()
        .get(server.api(&format!("/apartments/{}/reviews", apartment_id)))
        .bearer_auth(&owner.access_token)
        .send()
        .await?
        .json()
        .await?;
    assert_eq!(
        reviews,
        json!([{
            "user": {"id": guest.user_id, "name": "Ada"},
            "apartment": {
                "id": apartment_id,
                "type": "duplex",
                "address": "12 Marina Road",
                "state": "Lagos"
            },
            "review": {"id": review["id"], "body": "Bright rooms, steady power."}
        }])
    );
    Ok(())
}

#[tokio::test]
async fn test_review_for_missing_apartment_is_not_found() -> Result<(), anyhow::Error> {
    let server = TestRentalServer::spawn().await?;
    let guest = server.register(ADA.name, ADA.email, ADA.password).await?;

    let response = server
        .client()
        .post(server.api("/apartments/777/reviews"))
        .bearer_auth(&guest.access_token)
        .json(&json!({"body": "Never existed"}))
        .send()
        .await?;
    assert_error_response(response, 404, "NOT_FOUND").await;

    let response = server
        .client()
        .get(server.api("/apartments/777/reviews"))
        .bearer_auth(&guest.access_token)
        .send()
        .await?;
    assert_error_response(response, 404, "NOT_FOUND").await;
    Ok(())
}

#[tokio::test]
async fn test_blank_review_is_rejected() -> Result<(), anyhow::Error> {
    let server = TestRentalServer::spawn().await?;
    let owner = server.register(TOSIN.name, TOSIN.email, TOSIN.password).await?;
    let apartment_id = server
        .create_apartment(&owner.access_token, "duplex", "12 Marina Road", "Lagos")
        .await?;

    let response = server
        .client()
        .post(server.api(&format!("/apartments/{}/reviews", apartment_id)))
        .bearer_auth(&owner.access_token)
        .json(&json!({"body": "   "}))
        .send()
        .await?;

    let body = assert_error_response(response, 422, "VALIDATION_ERROR").await;
    assert_eq!(validation_fields(&body), vec!["body"]);
    Ok(())
}

#[tokio::test]
async fn test_delete_review_is_author_scoped() -> Result<(), anyhow::Error> {
    let server = TestRentalServer::spawn().await?;
    let owner = server.register(TOSIN.name, TOSIN.email, TOSIN.password).await?;
    let guest = server.register(ADA.name, ADA.email, ADA.password).await?;
    let apartment_id = server
        .create_apartment(&owner.access_token, "duplex", "12 Marina Road", "Lagos")
        .await?;

    let review: Value = server
        .client()
        .post(server.api(&format!("/apartments/{}/reviews", apartment_id)))
        .bearer_auth(&guest.access_token)
        .json(&json!({"body": "Noisy generator next door"}))
        .send()
        .await?
        .json()
        .await?;
    let review_id = review["id"].as_i64().unwrap_or_default();

    // The apartment owner is not the author.
    let response = server
        .client()
        .delete(server.api(&format!("/reviews/{}", review_id)))
        .bearer_auth(&owner.access_token)
        .send()
        .await?;
    assert_error_response(response, 404, "NOT_FOUND").await;

    let response = server
        .client()
        .delete(server.api(&format!("/reviews/{}", review_id)))
        .bearer_auth(&guest.access_token)
        .send()
        .await?;
    assert_eq!(response.status(), StatusCode::OK);
    Ok(())
}

#[tokio::test]
async fn test_deleting_apartment_removes_its_reviews() -> Result<(), anyhow::Error> {
    let server = TestRentalServer::spawn().await?;
    let owner = server.register(TOSIN.name, TOSIN.email, TOSIN.password).await?;
    let guest = server.register(ADA.name, ADA.email, ADA.password).await?;
    let apartment_id = server
        .create_apartment(&owner.access_token, "duplex", "12 Marina Road", "Lagos")
        .await?;

    let review: Value = server
        .client()
        .post(server.api(&format!("/apartments/{}/reviews", apartment_id)))
        .bearer_auth(&guest.access_token)
        .json(&json!({"body": "Lovely balcony"}))
        .send()
        .await?
        .json()
        .await?;
    let review_id = review["id"].as_i64().unwrap_or_default();

    server
        .client()
        .delete(server.api(&format!("/apartments/{}", apartment_id)))
        .bearer_auth(&owner.access_token)
        .send()
        .await?;

    let response = server
        .client()
        .delete(server.api(&format!("/reviews/{}", review_id)))
        .bearer_auth(&guest.access_token)
        .send()
        .await?;
    assert_error_response(response, 404, "NOT_FOUND").await;
    Ok(())
}
