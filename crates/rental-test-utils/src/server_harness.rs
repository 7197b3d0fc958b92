//! Test server harness for E2E testing.
//!
//! Provides `TestRentalServer`, a real rental-service router on a random
//! port, backed by `MemoryDatabase` and `MemoryStore` so tests need neither
//! Postgres nor Redis.

use crate::crypto_fixtures::test_config;
use rental_service::cache::MemoryStore;
use rental_service::config::Config;
use rental_service::crypto::TokenCodec;
use rental_service::observability::metrics::init_metrics_recorder;
use rental_service::repositories::MemoryDatabase;
use rental_service::routes::{self, AppState};
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::task::JoinHandle;

/// A registered user as the server reported it.
#[derive(Debug, Clone)]
pub struct TestSession {
    pub user_id: i64,
    pub access_token: String,
}

/// Test harness for spawning the rental service in E2E tests.
///
/// # Example
/// ```rust,ignore
/// #[tokio::test]
/// async fn test_login_flow() -> anyhow::Result<()> {
///     let server = TestRentalServer::spawn().await?;
///     let response = reqwest::Client::new()
///         .get(format!("{}/health", server.url()))
///         .send()
///         .await?;
///     assert_eq!(response.status(), 200);
///     Ok(())
/// }
/// ```
pub struct TestRentalServer {
    addr: SocketAddr,
    db: MemoryDatabase,
    store: MemoryStore,
    config: Config,
    codec: Arc<TokenCodec>,
    client: reqwest::Client,
    _handle: JoinHandle<()>,
}

impl TestRentalServer {
    /// Spawn with [`test_config`].
    pub async fn spawn() -> Result<Self, anyhow::Error> {
        Self::spawn_with_config(test_config()).await
    }

    /// Spawn with a custom configuration.
    ///
    /// The server binds 127.0.0.1:0 and runs until dropped.
    pub async fn spawn_with_config(config: Config) -> Result<Self, anyhow::Error> {
        let db = MemoryDatabase::new();
        let store = MemoryStore::new();

        let state = AppState::new(
            config.clone(),
            Arc::new(db.clone()),
            Arc::new(db.clone()),
            Arc::new(db.clone()),
            Arc::new(store.clone()),
        )
        .map_err(|e| anyhow::anyhow!("Failed to build application state: {}", e))?;
        let codec = Arc::clone(&state.codec);

        // Only the first server in a test process can install the global
        // recorder. The rest get a standalone one.
        let metrics_handle = match init_metrics_recorder() {
            Ok(handle) => handle,
            Err(_) => {
                use metrics_exporter_prometheus::PrometheusBuilder;
                PrometheusBuilder::new().build_recorder().handle()
            }
        };

        let app = routes::build_routes(Arc::new(state), metrics_handle);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .map_err(|e| anyhow::anyhow!("Failed to bind test server: {}", e))?;

        let addr = listener
            .local_addr()
            .map_err(|e| anyhow::anyhow!("Failed to get local address: {}", e))?;

        let handle = tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app).await {
                eprintln!("Test server error: {}", e);
            }
        });

        Ok(Self {
            addr,
            db,
            store,
            config,
            codec,
            client: reqwest::Client::new(),
            _handle: handle,
        })
    }

    /// Get the base URL of the test server
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Full URL for an `/api/v1` path.
    pub fn api(&self, path: &str) -> String {
        format!("http://{}/api/v1{}", self.addr, path)
    }

    /// Handle onto the server's database, e.g. to simulate an outage.
    pub fn db(&self) -> &MemoryDatabase {
        &self.db
    }

    /// Handle onto the server's revocation store.
    pub fn store(&self) -> &MemoryStore {
        &self.store
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// The server's own token codec, for minting tokens directly.
    pub fn codec(&self) -> &TokenCodec {
        &self.codec
    }

    pub fn client(&self) -> &reqwest::Client {
        &self.client
    }

    /// Register through the API and return the new session.
    pub async fn register(
        &self,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<TestSession, anyhow::Error> {
        let response = self
            .client
            .post(self.api("/auth/register"))
            .json(&json!({"name": name, "email": email, "password": password}))
            .send()
            .await?;

        let status = response.status();
        let body: Value = response.json().await?;
        if status != reqwest::StatusCode::CREATED {
            anyhow::bail!("Registration failed with {}: {}", status, body);
        }
        session_from(&body)
    }

    /// Log in through the API and return the new session.
    pub async fn login(&self, email: &str, password: &str) -> Result<TestSession, anyhow::Error> {
        let response = self
            .client
            .post(self.api("/auth/login"))
            .json(&json!({"email": email, "password": password}))
            .send()
            .await?;

        let status = response.status();
        let body: Value = response.json().await?;
        if status != reqwest::StatusCode::OK {
            anyhow::bail!("Login failed with {}: {}", status, body);
        }
        session_from(&body)
    }

    /// Create an apartment as `token`'s owner and return its id.
    pub async fn create_apartment(
        &self,
        token: &str,
        apartment_type: &str,
        address: &str,
        state: &str,
    ) -> Result<i64, anyhow::Error> {
        let response = self
            .client
            .post(self.api("/apartments"))
            .bearer_auth(token)
            .json(&json!({"type": apartment_type, "address": address, "state": state}))
            .send()
            .await?;

        let status = response.status();
        let body: Value = response.json().await?;
        if status != reqwest::StatusCode::CREATED {
            anyhow::bail!("Apartment creation failed with {}: {}", status, body);
        }
        body["id"]
            .as_i64()
            .ok_or_else(|| anyhow::anyhow!("Apartment response has no id: {}", body))
    }
}

fn session_from(body: &Value) -> Result<TestSession, anyhow::Error> {
    let user_id = body["user"]["id"]
        .as_i64()
        .ok_or_else(|| anyhow::anyhow!("Auth response has no user id: {}", body))?;
    let access_token = body["access_token"]
        .as_str()
        .ok_or_else(|| anyhow::anyhow!("Auth response has no access token: {}", body))?
        .to_string();
    Ok(TestSession {
        user_id,
        access_token,
    })
}

impl Drop for TestRentalServer {
    fn drop(&mut self) {
        self._handle.abort();
    }
}
