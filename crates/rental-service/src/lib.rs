//! Apartment Rental Service Library
//!
//! REST backend for an apartment-rental listing service. Users register and
//! authenticate, manage apartment listings and post reviews.
//!
//! # Modules
//!
//! - `cache` - Expiring key-value store (Redis) backing token revocation
//! - `config` - Service configuration
//! - `crypto` - Token codec and password hashing
//! - `errors` - Error types
//! - `handlers` - HTTP request handlers
//! - `middleware` - Access guard and HTTP metrics
//! - `models` - Request/response models
//! - `repositories` - Database access layer
//! - `routes` - Router construction and application state
//! - `services` - Business logic layer

pub mod cache;
pub mod config;
pub mod crypto;
pub mod errors;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod observability;
pub mod repositories;
pub mod routes;
pub mod services;
