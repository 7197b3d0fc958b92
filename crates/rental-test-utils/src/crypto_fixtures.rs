//! Fixed signing material for tests.
//!
//! Every harness and builder signs with [`TEST_JWT_SECRET`] unless told
//! otherwise, so tokens minted in a test verify against the test server.

use rental_service::config::Config;
use rental_service::crypto::TokenCodec;

/// HS256 secret shared by the test server and the token builders.
pub const TEST_JWT_SECRET: &str = "rental-test-secret-do-not-use-in-production";

/// A different secret, for tokens the server must reject.
pub const FOREIGN_JWT_SECRET: &str = "someone-elses-secret-that-is-long-enough!";

/// Service configuration for tests: cheapest allowed bcrypt cost and the
/// test secret.
pub fn test_config() -> Config {
    Config::for_tests(TEST_JWT_SECRET)
}

/// Codec matching [`test_config`].
pub fn test_codec() -> TokenCodec {
    TokenCodec::from_config(&test_config())
}
