//! Expiring key-value storage.
//!
//! The revocation list only needs three things from its backing store: read a
//! key, write a key that deletes itself after a number of seconds, and answer
//! a health probe. [`ExpiringStore`] captures exactly that.
//!
//! - [`RedisStore`] - production implementation over a Redis `ConnectionManager`
//! - `MemoryStore` - in-process implementation for tests (`test-utils` feature)

#[cfg(any(test, feature = "test-utils"))]
pub mod memory;
pub mod redis;

#[cfg(any(test, feature = "test-utils"))]
pub use memory::MemoryStore;
pub use self::redis::RedisStore;

use crate::errors::RentalError;
use async_trait::async_trait;
use thiserror::Error;

/// Failure talking to the backing store.
///
/// Callers must not read a failed lookup as "key absent".
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CacheError {
    #[error("cache unavailable: {0}")]
    Unavailable(String),
}

impl From<CacheError> for RentalError {
    fn from(err: CacheError) -> Self {
        match err {
            CacheError::Unavailable(reason) => RentalError::Cache(reason),
        }
    }
}

/// Key-value store with per-key expiry.
#[async_trait]
pub trait ExpiringStore: Send + Sync {
    /// Read a key. Expired keys read as `None`.
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError>;

    /// Write a key that disappears after `ttl_seconds`. `ttl_seconds` must be
    /// at least 1.
    async fn set_with_expiry(&self, key: &str, value: &str, ttl_seconds: u64)
        -> Result<(), CacheError>;

    /// Round-trip health probe.
    async fn ping(&self) -> Result<(), CacheError>;
}
