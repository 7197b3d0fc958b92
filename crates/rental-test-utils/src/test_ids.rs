//! Fixed test users for deterministic tests.

/// Registration details for a test user.
#[derive(Debug, Clone, Copy)]
pub struct TestUser {
    pub name: &'static str,
    pub email: &'static str,
    pub password: &'static str,
}

pub const TOSIN: TestUser = TestUser {
    name: "Tosin",
    email: "tosin@example.com",
    password: "MyPass777!",
};

pub const ADA: TestUser = TestUser {
    name: "Ada",
    email: "ada@example.ng",
    password: "AdaPass2024",
};

pub const EMEKA: TestUser = TestUser {
    name: "Emeka",
    email: "emeka@example.org",
    password: "EmekaSecure9",
};

/// Well-formed, but `.zen` is not an allowed top-level domain.
pub const DISALLOWED_TLD_EMAIL: &str = "jale@example.zen";

/// Subject id no registered user will have.
pub const UNKNOWN_USER_ID: i64 = 999_999;

pub const TEST_APARTMENT_TYPE: &str = "duplex";
pub const TEST_APARTMENT_ADDRESS: &str = "12 Marina Road";
pub const TEST_APARTMENT_STATE: &str = "Lagos";
