//! Metrics definitions for the rental service.
//!
//! All metrics follow Prometheus naming conventions:
//! - `rental_` prefix
//! - `_total` suffix for counters
//! - `_seconds` suffix for duration histograms
//!
//! # Cardinality
//!
//! Labels are bounded:
//! - `kind`: registration, login
//! - `status`: success, error
//! - `error_category`: a handful of fixed reasons
//! - `operation`: bounded by code (get, set, ping, hash, verify)
//! - `path`: numeric ids collapsed to `{id}`

use metrics::{counter, histogram};
use metrics_exporter_prometheus::{Matcher, PrometheusBuilder, PrometheusHandle};
use std::time::Duration;

/// Install the Prometheus recorder and return the handle `/metrics`
/// renders from.
///
/// Must run before anything is recorded. Buckets:
/// - HTTP requests: 5ms to 2s
/// - bcrypt: 10ms to 2.5s, it dominates register and login latency
/// - cache round trips: 0.5ms to 250ms
///
/// # Errors
///
/// Returns error if the recorder cannot be installed (e.g. one already is).
pub fn init_metrics_recorder() -> Result<PrometheusHandle, String> {
    PrometheusBuilder::new()
        .set_buckets_for_metric(
            Matcher::Prefix("rental_http_request".to_string()),
            &[
                0.005, 0.010, 0.025, 0.050, 0.100, 0.200, 0.300, 0.500, 1.000, 2.000,
            ],
        )
        .map_err(|e| format!("Failed to set HTTP request buckets: {e}"))?
        .set_buckets_for_metric(
            Matcher::Full("rental_bcrypt_duration_seconds".to_string()),
            &[0.010, 0.050, 0.100, 0.200, 0.300, 0.500, 1.000, 2.500],
        )
        .map_err(|e| format!("Failed to set bcrypt buckets: {e}"))?
        .set_buckets_for_metric(
            Matcher::Prefix("rental_cache_operation".to_string()),
            &[0.0005, 0.001, 0.002, 0.005, 0.010, 0.025, 0.050, 0.100, 0.250],
        )
        .map_err(|e| format!("Failed to set cache buckets: {e}"))?
        .install_recorder()
        .map_err(|e| format!("Failed to install Prometheus recorder: {e}"))
}

// ============================================================================
// Token Metrics
// ============================================================================

/// Record token issuance duration and outcome.
///
/// Metric: `rental_token_issuance_total`, `rental_token_issuance_duration_seconds`
/// Labels: `kind`, `status`
pub fn record_token_issuance(kind: &str, status: &str, duration: Duration) {
    histogram!("rental_token_issuance_duration_seconds", "kind" => kind.to_string(), "status" => status.to_string())
        .record(duration.as_secs_f64());

    counter!("rental_token_issuance_total", "kind" => kind.to_string(), "status" => status.to_string())
        .increment(1);
}

/// Record token validation result.
///
/// Metric: `rental_token_validations_total`
/// Labels: `status`, `error_category`
pub fn record_token_validation(status: &str, error_category: Option<&str>) {
    let category = error_category.unwrap_or("none");
    counter!("rental_token_validations_total", "status" => status.to_string(), "error_category" => category.to_string())
        .increment(1);
}

/// Record a logout outcome.
///
/// Metric: `rental_revocations_total`
/// Labels: `outcome` (revoked, already_expired, error)
pub fn record_revocation(outcome: &str) {
    counter!("rental_revocations_total", "outcome" => outcome.to_string()).increment(1);
}

// ============================================================================
// Cache Metrics
// ============================================================================

/// Record a revocation cache round trip.
///
/// Metric: `rental_cache_operations_total`, `rental_cache_operation_duration_seconds`
/// Labels: `operation`, `status`
pub fn record_cache_operation(operation: &str, status: &str, duration: Duration) {
    histogram!("rental_cache_operation_duration_seconds", "operation" => operation.to_string())
        .record(duration.as_secs_f64());

    counter!("rental_cache_operations_total", "operation" => operation.to_string(), "status" => status.to_string())
        .increment(1);
}

// ============================================================================
// Crypto Metrics
// ============================================================================

/// Record bcrypt operation duration.
///
/// Metric: `rental_bcrypt_duration_seconds`
/// Labels: `operation` (hash, verify)
pub fn record_bcrypt_duration(operation: &str, duration: Duration) {
    histogram!("rental_bcrypt_duration_seconds", "operation" => operation.to_string())
        .record(duration.as_secs_f64());
}

// ============================================================================
// Error Metrics
// ============================================================================

/// Record error by category.
///
/// Metric: `rental_errors_total`
/// Labels: `operation`, `error_category`, `status_code`
pub fn record_error(operation: &str, error_category: &str, status_code: u16) {
    counter!("rental_errors_total",
        "operation" => operation.to_string(),
        "error_category" => error_category.to_string(),
        "status_code" => status_code.to_string()
    )
    .increment(1);
}

// ============================================================================
// HTTP Request Metrics
// ============================================================================

/// Record HTTP request completion.
///
/// Metric: `rental_http_requests_total`, `rental_http_request_duration_seconds`
/// Labels: `method`, `path`, `status_code`
///
/// Captures framework-level rejections too (415, 400 JSON errors, 404, 405).
pub fn record_http_request(method: &str, path: &str, status_code: u16, duration: Duration) {
    let normalized_path = normalize_path(path);

    histogram!("rental_http_request_duration_seconds",
        "method" => method.to_string(),
        "path" => normalized_path.clone(),
        "status_code" => status_code.to_string()
    )
    .record(duration.as_secs_f64());

    counter!("rental_http_requests_total",
        "method" => method.to_string(),
        "path" => normalized_path,
        "status_code" => status_code.to_string()
    )
    .increment(1);
}

/// Top-level path prefixes that are ours. Anything else is `/other`.
const KNOWN_ROOTS: &[&str] = &["/health", "/ready", "/metrics", "/api/v1/"];

/// Collapse numeric path segments into `{id}` to bound label cardinality.
///
/// - `/api/v1/apartments/17` → `/api/v1/apartments/{id}`
/// - `/api/v1/users/3/apartments` → `/api/v1/users/{id}/apartments`
/// - `/wp-login.php` → `/other`
pub(crate) fn normalize_path(path: &str) -> String {
    if !KNOWN_ROOTS
        .iter()
        .any(|root| path == *root || (root.ends_with('/') && path.starts_with(root)))
    {
        return "/other".to_string();
    }

    path.split('/')
        .map(|segment| {
            if !segment.is_empty() && segment.bytes().all(|b| b.is_ascii_digit()) {
                "{id}"
            } else {
                segment
            }
        })
        .collect::<Vec<_>>()
        .join("/")
}
