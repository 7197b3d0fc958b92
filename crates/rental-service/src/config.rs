//! Rental service configuration.
//!
//! Configuration is loaded from environment variables once at startup.
//! There is no hot-reload. Sensitive fields are redacted in Debug output.

use secrecy::{ExposeSecret, SecretString};
use std::collections::HashMap;
use std::env;
use std::fmt;
use thiserror::Error;

/// Default server bind address.
pub const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0:8080";

/// Default lifetime of the token issued on registration (7 days).
pub const DEFAULT_REGISTRATION_TOKEN_LIFETIME_SECONDS: i64 = 7 * 24 * 60 * 60;

/// Default lifetime of the token issued on login (24 hours).
pub const DEFAULT_LOGIN_TOKEN_LIFETIME_SECONDS: i64 = 24 * 60 * 60;

/// Upper bound for either token lifetime (30 days).
pub const MAX_TOKEN_LIFETIME_SECONDS: i64 = 30 * 24 * 60 * 60;

/// Default clock skew tolerance for the `iat` claim.
pub const DEFAULT_JWT_CLOCK_SKEW_SECONDS: i64 = 300;

/// Upper bound for the clock skew tolerance.
pub const MAX_JWT_CLOCK_SKEW_SECONDS: i64 = 600;

/// Default bcrypt cost factor.
pub const DEFAULT_BCRYPT_COST: u32 = 12;

/// Lowest accepted bcrypt cost factor.
pub const MIN_BCRYPT_COST: u32 = 10;

/// Highest accepted bcrypt cost factor.
pub const MAX_BCRYPT_COST: u32 = 14;

/// Minimum length of the HS256 signing secret in bytes.
pub const MIN_JWT_SECRET_BYTES: usize = 32;

/// Top-level email domains accepted at registration when
/// `ALLOWED_EMAIL_TLDS` is not set.
pub const DEFAULT_ALLOWED_EMAIL_TLDS: &[&str] =
    &["com", "net", "org", "io", "ng", "dev", "co", "edu"];

#[derive(Clone)]
pub struct Config {
    /// PostgreSQL connection URL.
    pub database_url: String,

    /// Redis connection URL for the revocation cache.
    pub redis_url: String,

    /// Server bind address (default: "0.0.0.0:8080").
    pub bind_address: String,

    /// HS256 signing secret for bearer tokens.
    pub jwt_secret: SecretString,

    /// Lifetime of tokens issued on registration.
    pub registration_token_lifetime_seconds: i64,

    /// Lifetime of tokens issued on login.
    pub login_token_lifetime_seconds: i64,

    /// Tolerance for tokens whose `iat` lies in the future.
    pub jwt_clock_skew_seconds: i64,

    /// bcrypt cost factor for password hashing.
    pub bcrypt_cost: u32,

    /// Lower-cased top-level domains accepted for registration emails.
    pub allowed_email_tlds: Vec<String>,

    /// Origin allowed by the CORS layer, if any.
    pub cors_allowed_origin: Option<String>,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("database_url", &"[REDACTED]")
            .field("redis_url", &"[REDACTED]")
            .field("bind_address", &self.bind_address)
            .field("jwt_secret", &"[REDACTED]")
            .field(
                "registration_token_lifetime_seconds",
                &self.registration_token_lifetime_seconds,
            )
            .field(
                "login_token_lifetime_seconds",
                &self.login_token_lifetime_seconds,
            )
            .field("jwt_clock_skew_seconds", &self.jwt_clock_skew_seconds)
            .field("bcrypt_cost", &self.bcrypt_cost)
            .field("allowed_email_tlds", &self.allowed_email_tlds)
            .field("cors_allowed_origin", &self.cors_allowed_origin)
            .finish()
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid JWT secret: {0}")]
    InvalidJwtSecret(String),

    #[error("Invalid token lifetime for {name}: {reason}")]
    InvalidTokenLifetime { name: String, reason: String },

    #[error("Invalid JWT clock skew configuration: {0}")]
    InvalidJwtClockSkew(String),

    #[error("Invalid bcrypt cost: {0}")]
    InvalidBcryptCost(String),

    #[error("Invalid allowed email TLDs: {0}")]
    InvalidAllowedEmailTlds(String),
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(&env::vars().collect())
    }

    /// Load configuration from a HashMap (for testing).
    pub fn from_vars(vars: &HashMap<String, String>) -> Result<Self, ConfigError> {
        let database_url = required(vars, "DATABASE_URL")?;
        let redis_url = required(vars, "REDIS_URL")?;

        let bind_address = vars
            .get("BIND_ADDRESS")
            .cloned()
            .unwrap_or_else(|| DEFAULT_BIND_ADDRESS.to_string());

        let jwt_secret = required(vars, "JWT_SECRET")?;
        if jwt_secret.len() < MIN_JWT_SECRET_BYTES {
            return Err(ConfigError::InvalidJwtSecret(format!(
                "Expected at least {} bytes, got {}",
                MIN_JWT_SECRET_BYTES,
                jwt_secret.len()
            )));
        }

        let registration_token_lifetime_seconds = parse_lifetime(
            vars,
            "REGISTRATION_TOKEN_LIFETIME_SECONDS",
            DEFAULT_REGISTRATION_TOKEN_LIFETIME_SECONDS,
        )?;
        let login_token_lifetime_seconds = parse_lifetime(
            vars,
            "LOGIN_TOKEN_LIFETIME_SECONDS",
            DEFAULT_LOGIN_TOKEN_LIFETIME_SECONDS,
        )?;

        let jwt_clock_skew_seconds = match vars.get("JWT_CLOCK_SKEW_SECONDS") {
            Some(value) => {
                let skew: i64 = value.parse().map_err(|e| {
                    ConfigError::InvalidJwtClockSkew(format!(
                        "JWT_CLOCK_SKEW_SECONDS must be a valid integer, got '{}': {}",
                        value, e
                    ))
                })?;
                if !(0..=MAX_JWT_CLOCK_SKEW_SECONDS).contains(&skew) {
                    return Err(ConfigError::InvalidJwtClockSkew(format!(
                        "JWT_CLOCK_SKEW_SECONDS must be between 0 and {}, got {}",
                        MAX_JWT_CLOCK_SKEW_SECONDS, skew
                    )));
                }
                skew
            }
            None => DEFAULT_JWT_CLOCK_SKEW_SECONDS,
        };

        let bcrypt_cost = match vars.get("BCRYPT_COST") {
            Some(value) => {
                let cost: u32 = value.parse().map_err(|e| {
                    ConfigError::InvalidBcryptCost(format!(
                        "BCRYPT_COST must be a valid integer, got '{}': {}",
                        value, e
                    ))
                })?;
                if !(MIN_BCRYPT_COST..=MAX_BCRYPT_COST).contains(&cost) {
                    return Err(ConfigError::InvalidBcryptCost(format!(
                        "BCRYPT_COST must be between {} and {}, got {}",
                        MIN_BCRYPT_COST, MAX_BCRYPT_COST, cost
                    )));
                }
                cost
            }
            None => DEFAULT_BCRYPT_COST,
        };

        let allowed_email_tlds = match vars.get("ALLOWED_EMAIL_TLDS") {
            Some(value) => parse_tld_list(value)?,
            None => DEFAULT_ALLOWED_EMAIL_TLDS
                .iter()
                .map(|tld| tld.to_string())
                .collect(),
        };

        let cors_allowed_origin = vars
            .get("CORS_ALLOWED_ORIGIN")
            .filter(|origin| !origin.trim().is_empty())
            .cloned();

        Ok(Config {
            database_url,
            redis_url,
            bind_address,
            jwt_secret: SecretString::from(jwt_secret),
            registration_token_lifetime_seconds,
            login_token_lifetime_seconds,
            jwt_clock_skew_seconds,
            bcrypt_cost,
            allowed_email_tlds,
            cors_allowed_origin,
        })
    }

    /// Signing secret bytes for the token codec.
    pub fn jwt_secret_bytes(&self) -> &[u8] {
        self.jwt_secret.expose_secret().as_bytes()
    }
}

#[cfg(any(test, feature = "test-utils"))]
impl Config {
    /// Configuration for in-process tests. Backend URLs are placeholders and
    /// bcrypt runs at the lowest accepted cost.
    pub fn for_tests(jwt_secret: &str) -> Self {
        Config {
            database_url: "postgresql://localhost/rental_test".to_string(),
            redis_url: "redis://localhost:6379".to_string(),
            bind_address: "127.0.0.1:0".to_string(),
            jwt_secret: SecretString::from(jwt_secret.to_string()),
            registration_token_lifetime_seconds: DEFAULT_REGISTRATION_TOKEN_LIFETIME_SECONDS,
            login_token_lifetime_seconds: DEFAULT_LOGIN_TOKEN_LIFETIME_SECONDS,
            jwt_clock_skew_seconds: DEFAULT_JWT_CLOCK_SKEW_SECONDS,
            bcrypt_cost: MIN_BCRYPT_COST,
            allowed_email_tlds: DEFAULT_ALLOWED_EMAIL_TLDS
                .iter()
                .map(|tld| tld.to_string())
                .collect(),
            cors_allowed_origin: None,
        }
    }
}

fn required(vars: &HashMap<String, String>, name: &str) -> Result<String, ConfigError> {
    vars.get(name)
        .cloned()
        .ok_or_else(|| ConfigError::MissingEnvVar(name.to_string()))
}

fn parse_lifetime(
    vars: &HashMap<String, String>,
    name: &str,
    default: i64,
) -> Result<i64, ConfigError> {
    let Some(value) = vars.get(name) else {
        return Ok(default);
    };

    let seconds: i64 = value
        .parse()
        .map_err(|e| ConfigError::InvalidTokenLifetime {
            name: name.to_string(),
            reason: format!("must be a valid integer, got '{}': {}", value, e),
        })?;

    if !(1..=MAX_TOKEN_LIFETIME_SECONDS).contains(&seconds) {
        return Err(ConfigError::InvalidTokenLifetime {
            name: name.to_string(),
            reason: format!(
                "must be between 1 and {} seconds, got {}",
                MAX_TOKEN_LIFETIME_SECONDS, seconds
            ),
        });
    }

    Ok(seconds)
}

fn parse_tld_list(value: &str) -> Result<Vec<String>, ConfigError> {
    let tlds: Vec<String> = value
        .split(',')
        .map(|tld| tld.trim().trim_start_matches('.').to_ascii_lowercase())
        .filter(|tld| !tld.is_empty())
        .collect();

    if tlds.is_empty() {
        return Err(ConfigError::InvalidAllowedEmailTlds(
            "ALLOWED_EMAIL_TLDS must list at least one domain".to_string(),
        ));
    }

    if let Some(bad) = tlds
        .iter()
        .find(|tld| !tld.chars().all(|c| c.is_ascii_alphanumeric() || c == '-'))
    {
        return Err(ConfigError::InvalidAllowedEmailTlds(format!(
            "'{}' is not a valid top-level domain",
            bad
        )));
    }

    Ok(tlds)
}
