//! Apartment listings. Writes are limited to the listing's owner.

use crate::errors::{FieldError, RentalError};
use crate::models::{
    Apartment, ApartmentChanges, ApartmentListing, CreateApartmentRequest, NewApartment,
    UpdateApartmentRequest,
};
use crate::repositories::ApartmentRepository;
use tracing::instrument;

/// All listings, or those in `state` (case-insensitive) when given.
#[instrument(skip_all)]
pub async fn list(
    apartments: &dyn ApartmentRepository,
    state: Option<&str>,
) -> Result<Vec<ApartmentListing>, RentalError> {
    match state.map(str::trim).filter(|s| !s.is_empty()) {
        Some(state) => apartments.list_by_state(state).await,
        None => apartments.list().await,
    }
}

#[instrument(skip_all, fields(owner_id = owner_id))]
pub async fn list_by_owner(
    apartments: &dyn ApartmentRepository,
    owner_id: i64,
) -> Result<Vec<Apartment>, RentalError> {
    apartments.list_by_owner(owner_id).await
}

#[instrument(skip_all, fields(apartment_id = id))]
pub async fn get(
    apartments: &dyn ApartmentRepository,
    id: i64,
) -> Result<ApartmentListing, RentalError> {
    apartments
        .find(id)
        .await?
        .ok_or_else(|| RentalError::NotFound("Apartment not found".to_string()))
}

#[instrument(skip_all, fields(owner_id = owner_id))]
pub async fn create(
    apartments: &dyn ApartmentRepository,
    owner_id: i64,
    request: CreateApartmentRequest,
) -> Result<Apartment, RentalError> {
    let apartment_type = request.apartment_type.trim().to_string();
    let address = request.address.trim().to_string();
    let state = request.state.trim().to_string();

    let errors: Vec<FieldError> = [
        ("type", &apartment_type),
        ("address", &address),
        ("state", &state),
    ]
    .into_iter()
    .filter(|(_, value)| value.is_empty())
    .map(|(field, _)| FieldError::new(field, format!("{} cannot be empty", field)))
    .collect();
    if !errors.is_empty() {
        return Err(RentalError::Validation(errors));
    }

    let apartment = apartments
        .insert(NewApartment {
            owner_id,
            apartment_type,
            address,
            state,
        })
        .await?;

    tracing::info!(target: "rental.apartments", apartment_id = apartment.id, owner_id = owner_id, "Apartment listed");
    Ok(apartment)
}

/// Update fields of an apartment the caller owns.
///
/// Someone else's apartment reads as `NotFound`.
#[instrument(skip_all, fields(owner_id = owner_id, apartment_id = id))]
pub async fn update(
    apartments: &dyn ApartmentRepository,
    owner_id: i64,
    id: i64,
    request: UpdateApartmentRequest,
) -> Result<Apartment, RentalError> {
    let changes = ApartmentChanges {
        apartment_type: request.apartment_type.map(|v| v.trim().to_string()),
        address: request.address.map(|v| v.trim().to_string()),
        state: request.state.map(|v| v.trim().to_string()),
    };

    let supplied = [
        ("type", &changes.apartment_type),
        ("address", &changes.address),
        ("state", &changes.state),
    ];
    if supplied.iter().all(|(_, value)| value.is_none()) {
        return Err(RentalError::invalid_field(
            "body",
            "At least one of type, address or state is required",
        ));
    }
    let errors: Vec<FieldError> = supplied
        .iter()
        .filter(|(_, value)| value.as_deref().is_some_and(str::is_empty))
        .map(|(field, _)| FieldError::new(field, format!("{} cannot be empty", field)))
        .collect();
    if !errors.is_empty() {
        return Err(RentalError::Validation(errors));
    }

    apartments
        .update(id, owner_id, changes)
        .await?
        .ok_or_else(|| RentalError::NotFound("Apartment not found".to_string()))
}

/// Delete an apartment the caller owns, along with its reviews.
#[instrument(skip_all, fields(owner_id = owner_id, apartment_id = id))]
pub async fn delete(
    apartments: &dyn ApartmentRepository,
    owner_id: i64,
    id: i64,
) -> Result<Apartment, RentalError> {
    let apartment = apartments
        .delete(id, owner_id)
        .await?
        .ok_or_else(|| RentalError::NotFound("Apartment not found".to_string()))?;

    tracing::info!(target: "rental.apartments", apartment_id = id, owner_id = owner_id, "Apartment deleted");
    Ok(apartment)
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::panic
)]
mod tests {
    use super::*;
    use crate::models::NewUser;
    use crate::repositories::{MemoryDatabase, UserRepository};

    async fn setup() -> (MemoryDatabase, i64, i64) {
        let db = MemoryDatabase::new();
        let mut ids = Vec::new();
        for email in ["owner@example.com", "other@example.com"] {
            let user = UserRepository::insert(
                &db,
                NewUser {
                    name: "Tosin".to_string(),
                    email: email.to_string(),
                    password_hash: "hash".to_string(),
                },
            )
            .await
            .unwrap();
            ids.push(user.id);
        }
        (db, ids[0], ids[1])
    }

    fn request(state: &str) -> CreateApartmentRequest {
        CreateApartmentRequest {
            apartment_type: " duplex ".to_string(),
            address: "12 Marina Road".to_string(),
            state: state.to_string(),
        }
    }

    #[tokio::test]
    async fn test_create_trims_and_lists() {
        let (db, owner, _) = setup().await;
        let apartment = create(&db, owner, request("Lagos")).await.unwrap();
        assert_eq!(apartment.apartment_type, "duplex");
        assert_eq!(apartment.owner_id, owner);

        let listing = get(&db, apartment.id).await.unwrap();
        assert_eq!(listing.owner, "Tosin");
        assert_eq!(list(&db, None).await.unwrap().len(), 1);
        assert_eq!(list_by_owner(&db, owner).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_create_rejects_blank_fields() {
        let (db, owner, _) = setup().await;
        let result = create(
            &db,
            owner,
            CreateApartmentRequest {
                apartment_type: " ".to_string(),
                address: String::new(),
                state: "Lagos".to_string(),
            },
        )
        .await;

        match result {
            Err(RentalError::Validation(fields)) => {
                let names: Vec<_> = fields.iter().map(|f| f.field.as_str()).collect();
                assert_eq!(names, vec!["type", "address"]);
            }
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_list_filters_by_state() {
        let (db, owner, _) = setup().await;
        create(&db, owner, request("Lagos")).await.unwrap();
        create(&db, owner, request("Abuja")).await.unwrap();

        let lagos = list(&db, Some("LAGOS")).await.unwrap();
        assert_eq!(lagos.len(), 1);
        assert_eq!(lagos[0].state, "Lagos");
        assert_eq!(list(&db, Some("  ")).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_update_and_delete_are_owner_scoped() {
        let (db, owner, other) = setup().await;
        let apartment = create(&db, owner, request("Lagos")).await.unwrap();
        let changes = UpdateApartmentRequest {
            address: Some("1 Broad Street".to_string()),
            ..Default::default()
        };

        assert!(matches!(
            update(&db, other, apartment.id, changes.clone()).await,
            Err(RentalError::NotFound(_))
        ));
        assert!(matches!(
            delete(&db, other, apartment.id).await,
            Err(RentalError::NotFound(_))
        ));

        let updated = update(&db, owner, apartment.id, changes).await.unwrap();
        assert_eq!(updated.address, "1 Broad Street");

        delete(&db, owner, apartment.id).await.unwrap();
        assert!(matches!(
            get(&db, apartment.id).await,
            Err(RentalError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_update_requires_non_blank_field() {
        let (db, owner, _) = setup().await;
        let apartment = create(&db, owner, request("Lagos")).await.unwrap();

        assert!(matches!(
            update(&db, owner, apartment.id, UpdateApartmentRequest::default()).await,
            Err(RentalError::Validation(_))
        ));
        assert!(matches!(
            update(
                &db,
                owner,
                apartment.id,
                UpdateApartmentRequest {
                    state: Some("".to_string()),
                    ..Default::default()
                }
            )
            .await,
            Err(RentalError::Validation(_))
        ));
    }
}
