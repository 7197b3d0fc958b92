//! Redis-backed [`ExpiringStore`].
//!
//! `ConnectionManager` is cheap to clone and reconnects on its own, so each
//! operation clones it instead of sharing a locked connection.

use super::{CacheError, ExpiringStore};
use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::{AsyncCommands, Client};
use tracing::{error, instrument, warn};

#[derive(Clone)]
pub struct RedisStore {
    connection: ConnectionManager,
}

impl RedisStore {
    /// Open a managed connection to `redis_url`.
    ///
    /// The URL is never logged since it may carry credentials.
    pub async fn connect(redis_url: &str) -> Result<Self, CacheError> {
        let client = Client::open(redis_url).map_err(|e| {
            error!(target: "rental.cache.redis", error = %e, "Failed to open Redis client");
            CacheError::Unavailable(format!("Failed to open Redis client: {e}"))
        })?;

        let connection = ConnectionManager::new(client).await.map_err(|e| {
            error!(target: "rental.cache.redis", error = %e, "Failed to connect to Redis");
            CacheError::Unavailable(format!("Failed to connect to Redis: {e}"))
        })?;

        Ok(Self { connection })
    }
}

#[async_trait]
impl ExpiringStore for RedisStore {
    #[instrument(skip_all)]
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        let mut conn = self.connection.clone();

        conn.get(key).await.map_err(|e| {
            warn!(target: "rental.cache.redis", error = %e, "GET failed");
            CacheError::Unavailable(format!("GET failed: {e}"))
        })
    }

    #[instrument(skip_all, fields(ttl_seconds = ttl_seconds))]
    async fn set_with_expiry(
        &self,
        key: &str,
        value: &str,
        ttl_seconds: u64,
    ) -> Result<(), CacheError> {
        let mut conn = self.connection.clone();

        // SET key value EX ttl: write and expiry in a single command.
        let _: () = redis::cmd("SET")
            .arg(key)
            .arg(value)
            .arg("EX")
            .arg(ttl_seconds)
            .query_async(&mut conn)
            .await
            .map_err(|e| {
                warn!(target: "rental.cache.redis", error = %e, "SET EX failed");
                CacheError::Unavailable(format!("SET failed: {e}"))
            })?;

        Ok(())
    }

    #[instrument(skip_all)]
    async fn ping(&self) -> Result<(), CacheError> {
        let mut conn = self.connection.clone();

        let _: String = redis::cmd("PING")
            .query_async(&mut conn)
            .await
            .map_err(|e| {
                warn!(target: "rental.cache.redis", error = %e, "PING failed");
                CacheError::Unavailable(format!("PING failed: {e}"))
            })?;

        Ok(())
    }
}
