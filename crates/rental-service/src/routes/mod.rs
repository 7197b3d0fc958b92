//! HTTP routes for the rental service.
//!
//! Defines the Axum router and application state.

use crate::cache::ExpiringStore;
use crate::config::Config;
use crate::crypto::TokenCodec;
use crate::errors::RentalError;
use crate::handlers;
use crate::middleware::{http_metrics_middleware, require_auth, require_signed_token, AuthState};
use crate::repositories::{ApartmentRepository, ReviewRepository, UserRepository};
use crate::services::revocation_service::RevocationCache;
use crate::services::user_service::Authenticator;
use axum::{
    http::{header, HeaderValue, Method},
    middleware,
    routing::{delete, get, post},
    Router,
};
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{cors::CorsLayer, timeout::TimeoutLayer, trace::TraceLayer};

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Service configuration.
    pub config: Config,

    pub users: Arc<dyn UserRepository>,
    pub apartments: Arc<dyn ApartmentRepository>,
    pub reviews: Arc<dyn ReviewRepository>,

    /// Signs and verifies bearer tokens.
    pub codec: Arc<TokenCodec>,

    /// Revoked tokens, checked on every guarded request.
    pub revocations: RevocationCache,

    pub authenticator: Arc<Authenticator>,
}

impl AppState {
    /// Wire the token codec, revocation cache and authenticator around the
    /// given stores.
    ///
    /// # Errors
    ///
    /// `Crypto` if the startup dummy hash cannot be computed.
    pub fn new(
        config: Config,
        users: Arc<dyn UserRepository>,
        apartments: Arc<dyn ApartmentRepository>,
        reviews: Arc<dyn ReviewRepository>,
        store: Arc<dyn ExpiringStore>,
    ) -> Result<Self, RentalError> {
        let codec = Arc::new(TokenCodec::from_config(&config));
        let authenticator = Arc::new(Authenticator::new(
            &config,
            Arc::clone(&users),
            Arc::clone(&codec),
        )?);

        Ok(Self {
            config,
            users,
            apartments,
            reviews,
            codec,
            revocations: RevocationCache::new(store),
            authenticator,
        })
    }
}

/// Build the application routes.
///
/// Creates an Axum router with:
/// - `/health`, `/ready`, `/metrics` - public, unversioned
/// - `/api/v1/auth/register`, `/api/v1/auth/login` - public
/// - `/api/v1/auth/logout` - signed token required (expiry and revocation
///   are not checked)
/// - everything else under `/api/v1` - full access guard
/// - TraceLayer for request logging
/// - 30 second request timeout
/// - CORS for `CORS_ALLOWED_ORIGIN`, when set
/// - HTTP metrics middleware
pub fn build_routes(state: Arc<AppState>, metrics_handle: PrometheusHandle) -> Router {
    let auth_state = Arc::new(AuthState {
        codec: Arc::clone(&state.codec),
        revocations: state.revocations.clone(),
    });

    let public_routes = Router::new()
        .route("/health", get(handlers::health_check))
        .route("/ready", get(handlers::readiness_check))
        .route("/api/v1/auth/register", post(handlers::register))
        .route("/api/v1/auth/login", post(handlers::login))
        .with_state(state.clone());

    let metrics_routes = Router::new()
        .route("/metrics", get(handlers::metrics_handler))
        .with_state(metrics_handle);

    let logout_routes = Router::new()
        .route("/api/v1/auth/logout", post(handlers::logout))
        .route_layer(middleware::from_fn_with_state(
            auth_state.clone(),
            require_signed_token,
        ))
        .with_state(state.clone());

    let cors = cors_layer(&state.config);

    let protected_routes = Router::new()
        .route("/api/v1/me", get(handlers::get_me).patch(handlers::update_me))
        .route("/api/v1/me/apartments", get(handlers::list_my_apartments))
        .route("/api/v1/users", get(handlers::list_users))
        .route(
            "/api/v1/users/:id/apartments",
            get(handlers::list_user_apartments),
        )
        .route(
            "/api/v1/apartments",
            get(handlers::list_apartments).post(handlers::create_apartment),
        )
        .route(
            "/api/v1/apartments/:id",
            get(handlers::get_apartment)
                .patch(handlers::update_apartment)
                .delete(handlers::delete_apartment),
        )
        .route(
            "/api/v1/apartments/:id/reviews",
            get(handlers::list_reviews).post(handlers::create_review),
        )
        .route("/api/v1/reviews/:id", delete(handlers::delete_review))
        .route_layer(middleware::from_fn_with_state(auth_state, require_auth))
        .with_state(state);

    // Layer order (bottom-to-top execution):
    // 1. TimeoutLayer (innermost)
    // 2. TraceLayer
    // 3. CorsLayer, answering preflights before the guards see them
    // 4. http_metrics_middleware (outermost), so framework rejections
    //    like 404, 405 and 415 are counted too
    let app = public_routes
        .merge(metrics_routes)
        .merge(logout_routes)
        .merge(protected_routes)
        .fallback(handlers::route_not_found)
        .layer(TimeoutLayer::new(Duration::from_secs(30)))
        .layer(TraceLayer::new_for_http());

    let app = match cors {
        Some(cors) => app.layer(cors),
        None => app,
    };

    app.layer(middleware::from_fn(http_metrics_middleware))
}

/// CORS for the single configured browser origin. `None` when unset or
/// unparseable.
fn cors_layer(config: &Config) -> Option<CorsLayer> {
    let origin = config.cors_allowed_origin.as_deref()?;
    match origin.parse::<HeaderValue>() {
        Ok(origin) => Some(
            CorsLayer::new()
                .allow_origin(origin)
                .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::DELETE])
                .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE]),
        ),
        Err(e) => {
            tracing::warn!("Ignoring CORS_ALLOWED_ORIGIN: {}", e);
            None
        }
    }
}
