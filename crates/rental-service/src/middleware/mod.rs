//! HTTP middleware.
//!
//! - `auth` - Access guard for protected routes
//! - `http_metrics` - HTTP request metrics

pub mod auth;
pub mod http_metrics;

pub use auth::{require_auth, require_signed_token, AuthState, AuthenticatedUser};
pub use http_metrics::http_metrics_middleware;
