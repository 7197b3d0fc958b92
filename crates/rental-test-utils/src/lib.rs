//! # Rental Test Utilities
//!
//! Shared test utilities for the rental service.
//!
//! This crate provides:
//! - A fixed signing secret and matching config
//! - Token builders for expired, forged and malformed tokens
//! - Server test harness (`TestRentalServer`) over in-memory stores
//! - Fixed test users
//! - Custom assertions (`TokenAssertions`, `assert_error_response`)
//!
//! ## Usage
//!
//! ```rust,ignore
//! use rental_test_utils::*;
//!
//! #[tokio::test]
//! async fn test_example() -> anyhow::Result<()> {
//!     let server = TestRentalServer::spawn().await?;
//!     let session = server.register(TOSIN.name, TOSIN.email, TOSIN.password).await?;
//!
//!     session.access_token
//!         .assert_valid_jwt()
//!         .assert_for_subject(session.user_id);
//!     Ok(())
//! }
//! ```

pub mod assertions;
pub mod crypto_fixtures;
pub mod server_harness;
pub mod test_ids;
pub mod token_builders;

// Re-export commonly used items
pub use assertions::*;
pub use crypto_fixtures::*;
pub use server_harness::*;
pub use test_ids::*;
pub use token_builders::*;
