//! In-memory implementation of every repository trait.
//!
//! One `MemoryDatabase` holds all three tables behind a single lock so joins
//! and cascades behave like the Postgres schema: unique emails, owner names
//! joined into listings, reviews removed with their apartment.

use super::{ApartmentRepository, ReviewRepository, UserRepository};
use crate::errors::RentalError;
use crate::models::{
    Apartment, ApartmentChanges, ApartmentListing, NewApartment, NewReview, NewUser, Review,
    ReviewRow, User, UserChanges,
};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

#[derive(Default)]
struct Tables {
    next_id: i64,
    users: BTreeMap<i64, User>,
    apartments: BTreeMap<i64, Apartment>,
    reviews: BTreeMap<i64, Review>,
}

impl Tables {
    fn allocate_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    fn listing(&self, apartment: &Apartment) -> Option<ApartmentListing> {
        let owner = self.users.get(&apartment.owner_id)?;
        Some(ApartmentListing {
            id: apartment.id,
            owner_id: apartment.owner_id,
            owner: owner.name.clone(),
            apartment_type: apartment.apartment_type.clone(),
            address: apartment.address.clone(),
            state: apartment.state.clone(),
            created_at: apartment.created_at,
        })
    }

    fn email_taken_by_other(&self, email: &str, id: Option<i64>) -> bool {
        self.users
            .values()
            .any(|user| user.email == email && Some(user.id) != id)
    }
}

#[derive(Clone, Default)]
pub struct MemoryDatabase {
    tables: Arc<Mutex<Tables>>,
    unavailable: Arc<AtomicBool>,
}

impl MemoryDatabase {
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulate the database going down (`true`) or coming back (`false`).
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Stored user by id, including the password hash.
    pub fn user(&self, id: i64) -> Option<User> {
        self.tables.lock().ok()?.users.get(&id).cloned()
    }

    fn lock(&self) -> Result<MutexGuard<'_, Tables>, RentalError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(RentalError::Database(
                "connection refused (simulated outage)".to_string(),
            ));
        }
        self.tables
            .lock()
            .map_err(|_| RentalError::Database("memory database lock poisoned".to_string()))
    }
}

#[async_trait]
impl UserRepository for MemoryDatabase {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RentalError> {
        let tables = self.lock()?;
        Ok(tables.users.values().find(|u| u.email == email).cloned())
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<User>, RentalError> {
        Ok(self.lock()?.users.get(&id).cloned())
    }

    async fn count_by_email(&self, email: &str) -> Result<i64, RentalError> {
        let tables = self.lock()?;
        let count = tables.users.values().filter(|u| u.email == email).count();
        Ok(i64::try_from(count).unwrap_or(i64::MAX))
    }

    async fn insert(&self, user: NewUser) -> Result<User, RentalError> {
        let mut tables = self.lock()?;
        if tables.email_taken_by_other(&user.email, None) {
            return Err(RentalError::Conflict("user already exists".to_string()));
        }

        let now = Utc::now();
        let id = tables.allocate_id();
        let stored = User {
            id,
            name: user.name,
            email: user.email,
            password_hash: user.password_hash,
            created_at: now,
            updated_at: now,
        };
        tables.users.insert(id, stored.clone());
        Ok(stored)
    }

    async fn update_by_id(
        &self,
        id: i64,
        changes: UserChanges,
    ) -> Result<Option<User>, RentalError> {
        let mut tables = self.lock()?;
        if let Some(email) = &changes.email {
            if tables.email_taken_by_other(email, Some(id)) {
                return Err(RentalError::Conflict("user already exists".to_string()));
            }
        }

        let Some(user) = tables.users.get_mut(&id) else {
            return Ok(None);
        };
        if let Some(name) = changes.name {
            user.name = name;
        }
        if let Some(email) = changes.email {
            user.email = email;
        }
        if let Some(password_hash) = changes.password_hash {
            user.password_hash = password_hash;
        }
        user.updated_at = Utc::now();
        Ok(Some(user.clone()))
    }

    async fn list(&self) -> Result<Vec<User>, RentalError> {
        Ok(self.lock()?.users.values().cloned().collect())
    }

    async fn ping(&self) -> Result<(), RentalError> {
        self.lock().map(|_| ())
    }
}

#[async_trait]
impl ApartmentRepository for MemoryDatabase {
    async fn list(&self) -> Result<Vec<ApartmentListing>, RentalError> {
        let tables = self.lock()?;
        Ok(tables
            .apartments
            .values()
            .filter_map(|a| tables.listing(a))
            .collect())
    }

    async fn list_by_state(&self, state: &str) -> Result<Vec<ApartmentListing>, RentalError> {
        let tables = self.lock()?;
        Ok(tables
            .apartments
            .values()
            .filter(|a| a.state.eq_ignore_ascii_case(state))
            .filter_map(|a| tables.listing(a))
            .collect())
    }

    async fn list_by_owner(&self, owner_id: i64) -> Result<Vec<Apartment>, RentalError> {
        let tables = self.lock()?;
        Ok(tables
            .apartments
            .values()
            .filter(|a| a.owner_id == owner_id)
            .cloned()
            .collect())
    }

    async fn find(&self, id: i64) -> Result<Option<ApartmentListing>, RentalError> {
        let tables = self.lock()?;
        Ok(tables.apartments.get(&id).and_then(|a| tables.listing(a)))
    }

    async fn insert(&self, apartment: NewApartment) -> Result<Apartment, RentalError> {
        let mut tables = self.lock()?;
        if !tables.users.contains_key(&apartment.owner_id) {
            return Err(RentalError::NotFound("Referenced owner not found".to_string()));
        }

        let id = tables.allocate_id();
        let stored = Apartment {
            id,
            owner_id: apartment.owner_id,
            apartment_type: apartment.apartment_type,
            address: apartment.address,
            state: apartment.state,
            created_at: Utc::now(),
        };
        tables.apartments.insert(id, stored.clone());
        Ok(stored)
    }

    async fn update(
        &self,
        id: i64,
        owner_id: i64,
        changes: ApartmentChanges,
    ) -> Result<Option<Apartment>, RentalError> {
        let mut tables = self.lock()?;
        let Some(apartment) = tables
            .apartments
            .get_mut(&id)
            .filter(|a| a.owner_id == owner_id)
        else {
            return Ok(None);
        };

        if let Some(apartment_type) = changes.apartment_type {
            apartment.apartment_type = apartment_type;
        }
        if let Some(address) = changes.address {
            apartment.address = address;
        }
        if let Some(state) = changes.state {
            apartment.state = state;
        }
        Ok(Some(apartment.clone()))
    }

    async fn delete(&self, id: i64, owner_id: i64) -> Result<Option<Apartment>, RentalError> {
        let mut tables = self.lock()?;
        let owned = tables
            .apartments
            .get(&id)
            .is_some_and(|a| a.owner_id == owner_id);
        if !owned {
            return Ok(None);
        }

        let removed = tables.apartments.remove(&id);
        tables.reviews.retain(|_, review| review.apartment_id != id);
        Ok(removed)
    }
}

#[async_trait]
impl ReviewRepository for MemoryDatabase {
    async fn list_for_apartment(&self, apartment_id: i64) -> Result<Vec<ReviewRow>, RentalError> {
        let tables = self.lock()?;
        let Some(apartment) = tables.apartments.get(&apartment_id) else {
            return Ok(Vec::new());
        };

        Ok(tables
            .reviews
            .values()
            .filter(|r| r.apartment_id == apartment_id)
            .filter_map(|r| {
                let author = tables.users.get(&r.user_id)?;
                Some(ReviewRow {
                    id: r.id,
                    body: r.body.clone(),
                    user_id: author.id,
                    user_name: author.name.clone(),
                    apartment_id: apartment.id,
                    apartment_type: apartment.apartment_type.clone(),
                    address: apartment.address.clone(),
                    state: apartment.state.clone(),
                })
            })
            .collect())
    }

    async fn insert(&self, review: NewReview) -> Result<Review, RentalError> {
        let mut tables = self.lock()?;
        if !tables.apartments.contains_key(&review.apartment_id)
            || !tables.users.contains_key(&review.user_id)
        {
            return Err(RentalError::NotFound(
                "Referenced apartment or author not found".to_string(),
            ));
        }

        let id = tables.allocate_id();
        let stored = Review {
            id,
            user_id: review.user_id,
            apartment_id: review.apartment_id,
            body: review.body,
            created_at: Utc::now(),
        };
        tables.reviews.insert(id, stored.clone());
        Ok(stored)
    }

    async fn delete(&self, id: i64, user_id: i64) -> Result<Option<Review>, RentalError> {
        let mut tables = self.lock()?;
        let authored = tables
            .reviews
            .get(&id)
            .is_some_and(|r| r.user_id == user_id);
        if !authored {
            return Ok(None);
        }
        Ok(tables.reviews.remove(&id))
    }
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

    fn new_user(email: &str) -> NewUser {
        NewUser {
            name: "Tosin".to_string(),
            email: email.to_string(),
            password_hash: "hash".to_string(),
        }
    }

    fn new_apartment(owner_id: i64, state: &str) -> NewApartment {
        NewApartment {
            owner_id,
            apartment_type: "duplex".to_string(),
            address: "12 Marina Road".to_string(),
            state: state.to_string(),
        }
    }

    #[tokio::test]
    async fn test_user_email_is_unique() {
        let db = MemoryDatabase::new();
        UserRepository::insert(&db, new_user("tosin@example.com"))
            .await
            .unwrap();

        let duplicate = UserRepository::insert(&db, new_user("tosin@example.com")).await;
        assert!(matches!(duplicate, Err(RentalError::Conflict(_))));
        assert_eq!(db.count_by_email("tosin@example.com").await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_update_user_rejects_taken_email() {
        let db = MemoryDatabase::new();
        let first = UserRepository::insert(&db, new_user("a@example.com"))
            .await
            .unwrap();
        UserRepository::insert(&db, new_user("b@example.com"))
            .await
            .unwrap();

        let result = db
            .update_by_id(
                first.id,
                UserChanges {
                    email: Some("b@example.com".to_string()),
                    ..Default::default()
                },
            )
            .await;
        assert!(matches!(result, Err(RentalError::Conflict(_))));

        // Re-saving one's own email is fine.
        let same = db
            .update_by_id(
                first.id,
                UserChanges {
                    email: Some("a@example.com".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert!(same.is_some());
        assert!(db.update_by_id(999, UserChanges::default()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_apartment_listing_joins_owner_and_filters_state() {
        let db = MemoryDatabase::new();
        let owner = UserRepository::insert(&db, new_user("a@example.com"))
            .await
            .unwrap();
        ApartmentRepository::insert(&db, new_apartment(owner.id, "Lagos"))
            .await
            .unwrap();
        ApartmentRepository::insert(&db, new_apartment(owner.id, "Abuja"))
            .await
            .unwrap();

        let all = ApartmentRepository::list(&db).await.unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].owner, "Tosin");

        let lagos = db.list_by_state("lagos").await.unwrap();
        assert_eq!(lagos.len(), 1);
        assert_eq!(lagos[0].state, "Lagos");
    }

    #[tokio::test]
    async fn test_apartment_writes_are_owner_scoped() {
        let db = MemoryDatabase::new();
        let owner = UserRepository::insert(&db, new_user("a@example.com"))
            .await
            .unwrap();
        let other = UserRepository::insert(&db, new_user("b@example.com"))
            .await
            .unwrap();
        let apartment = ApartmentRepository::insert(&db, new_apartment(owner.id, "Lagos"))
            .await
            .unwrap();

        let changes = ApartmentChanges {
            state: Some("Ogun".to_string()),
            ..Default::default()
        };
        assert!(ApartmentRepository::update(&db, apartment.id, other.id, changes.clone())
            .await
            .unwrap()
            .is_none());
        assert!(ApartmentRepository::delete(&db, apartment.id, other.id)
            .await
            .unwrap()
            .is_none());

        let updated = ApartmentRepository::update(&db, apartment.id, owner.id, changes)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.state, "Ogun");
        assert_eq!(updated.address, "12 Marina Road");
    }

    #[tokio::test]
    async fn test_deleting_apartment_cascades_reviews() {
        let db = MemoryDatabase::new();
        let owner = UserRepository::insert(&db, new_user("a@example.com"))
            .await
            .unwrap();
        let apartment = ApartmentRepository::insert(&db, new_apartment(owner.id, "Lagos"))
            .await
            .unwrap();
        ReviewRepository::insert(
            &db,
            NewReview {
                user_id: owner.id,
                apartment_id: apartment.id,
                body: "Bright rooms".to_string(),
            },
        )
        .await
        .unwrap();
        assert_eq!(db.list_for_apartment(apartment.id).await.unwrap().len(), 1);

        ApartmentRepository::delete(&db, apartment.id, owner.id)
            .await
            .unwrap();
        assert!(db.list_for_apartment(apartment.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_review_requires_existing_apartment() {
        let db = MemoryDatabase::new();
        let owner = UserRepository::insert(&db, new_user("a@example.com"))
            .await
            .unwrap();
        let result = ReviewRepository::insert(
            &db,
            NewReview {
                user_id: owner.id,
                apartment_id: 404,
                body: "Ghost house".to_string(),
            },
        )
        .await;
        assert!(matches!(result, Err(RentalError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_review_requires_existing_author() {
        let db = MemoryDatabase::new();
        let owner = UserRepository::insert(&db, new_user("a@example.com"))
            .await
            .unwrap();
        let apartment = ApartmentRepository::insert(&db, new_apartment(owner.id, "Lagos"))
            .await
            .unwrap();
        let result = ReviewRepository::insert(
            &db,
            NewReview {
                user_id: owner.id + 1000,
                apartment_id: apartment.id,
                body: "Written by nobody".to_string(),
            },
        )
        .await;
        match result {
            Err(RentalError::NotFound(message)) => {
                assert_eq!(message, "Referenced apartment or author not found");
            }
            other => panic!("expected NotFound, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_outage_fails_queries() {
        let db = MemoryDatabase::new();
        db.set_unavailable(true);
        assert!(matches!(
            UserRepository::ping(&db).await,
            Err(RentalError::Database(_))
        ));
        db.set_unavailable(false);
        assert!(UserRepository::ping(&db).await.is_ok());
    }
}
