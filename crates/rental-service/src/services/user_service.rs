//! Authenticator: registration, login and profile management.
//!
//! Credentials are checked against the user repository and successful calls
//! are answered with a bearer token from the [`TokenCodec`]. Passwords are
//! only ever stored as bcrypt hashes, computed on the blocking pool.

use crate::config::Config;
use crate::crypto::{self, TokenCodec};
use crate::errors::{CredentialFailure, FieldError, RentalError};
use crate::models::{
    AuthResponse, LoginRequest, NewUser, RegisterRequest, UpdateProfileRequest, User, UserChanges,
    UserProfile,
};
use crate::observability::hash_for_correlation;
use crate::observability::metrics::{record_bcrypt_duration, record_token_issuance};
use crate::repositories::UserRepository;
use std::sync::Arc;
use std::time::Instant;
use tracing::instrument;

pub const MIN_PASSWORD_LENGTH: usize = 8;

const TOKEN_TYPE: &str = "Bearer";

/// Which token lifetime to apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum IssueKind {
    Registration,
    Login,
}

impl IssueKind {
    fn as_str(self) -> &'static str {
        match self {
            IssueKind::Registration => "registration",
            IssueKind::Login => "login",
        }
    }
}

pub struct Authenticator {
    users: Arc<dyn UserRepository>,
    codec: Arc<TokenCodec>,
    bcrypt_cost: u32,
    registration_token_lifetime_seconds: i64,
    login_token_lifetime_seconds: i64,
    allowed_email_tlds: Vec<String>,
    dummy_password_hash: String,
}

impl Authenticator {
    /// Build the authenticator. Hashes a dummy password once at the
    /// configured cost for the unknown-email login path.
    pub fn new(
        config: &Config,
        users: Arc<dyn UserRepository>,
        codec: Arc<TokenCodec>,
    ) -> Result<Self, RentalError> {
        Ok(Self {
            users,
            codec,
            bcrypt_cost: config.bcrypt_cost,
            registration_token_lifetime_seconds: config.registration_token_lifetime_seconds,
            login_token_lifetime_seconds: config.login_token_lifetime_seconds,
            allowed_email_tlds: config.allowed_email_tlds.clone(),
            dummy_password_hash: crypto::dummy_password_hash(config.bcrypt_cost)?,
        })
    }

    /// Register a new user and log them in.
    ///
    /// # Errors
    ///
    /// - `Validation` for an empty name, a malformed email or one whose
    ///   top-level domain is not allowed, or a short password
    /// - `Conflict` if the email is already registered
    #[instrument(skip_all)]
    pub async fn register(&self, request: RegisterRequest) -> Result<AuthResponse, RentalError> {
        let name = request.name.trim().to_string();
        let email = normalize_email(&request.email);

        let mut errors = Vec::new();
        if let Some(error) = check_name(&name) {
            errors.push(error);
        }
        if let Some(error) = self.check_email(&email) {
            errors.push(error);
        }
        if let Some(error) = check_password(&request.password) {
            errors.push(error);
        }
        if !errors.is_empty() {
            return Err(RentalError::Validation(errors));
        }

        if self.users.count_by_email(&email).await? > 0 {
            tracing::debug!(
                target: "rental.auth",
                email_hash = %hash_for_correlation(&email),
                "Registration rejected: email already registered"
            );
            return Err(RentalError::Conflict(
                "An account with this email already exists".to_string(),
            ));
        }

        let password_hash = self.hash_password(request.password).await?;
        let user = self
            .users
            .insert(NewUser {
                name,
                email,
                password_hash,
            })
            .await?;

        tracing::info!(target: "rental.auth", user_id = user.id, "User registered");
        self.respond_with_token(&user, IssueKind::Registration)
    }

    /// Exchange email and password for a token.
    ///
    /// Unknown emails and wrong passwords fail the same way and take the
    /// same time: an unknown email is still checked against a dummy hash.
    #[instrument(skip_all)]
    pub async fn login(&self, request: LoginRequest) -> Result<AuthResponse, RentalError> {
        let email = normalize_email(&request.email);
        let user = self.users.find_by_email(&email).await?;

        let (hash, user) = match user {
            Some(user) => (user.password_hash.clone(), Some(user)),
            None => (self.dummy_password_hash.clone(), None),
        };
        let password_matches = self.verify_password(request.password, hash).await?;

        let Some(user) = user else {
            tracing::debug!(
                target: "rental.auth",
                email_hash = %hash_for_correlation(&email),
                "Login rejected: unknown email"
            );
            return Err(RentalError::AuthenticationFailed(
                CredentialFailure::UnknownEmail,
            ));
        };

        if !password_matches {
            tracing::debug!(target: "rental.auth", user_id = user.id, "Login rejected: wrong password");
            return Err(RentalError::AuthenticationFailed(
                CredentialFailure::WrongPassword,
            ));
        }

        tracing::info!(target: "rental.auth", user_id = user.id, "User logged in");
        self.respond_with_token(&user, IssueKind::Login)
    }

    /// Update the caller's own profile.
    ///
    /// At least one field must be given. A new email must not belong to
    /// another user and a new password is re-hashed.
    #[instrument(skip_all, fields(subject_id = subject_id))]
    pub async fn update_profile(
        &self,
        subject_id: i64,
        request: UpdateProfileRequest,
    ) -> Result<UserProfile, RentalError> {
        if request.name.is_none() && request.email.is_none() && request.password.is_none() {
            return Err(RentalError::invalid_field(
                "body",
                "At least one of name, email or password is required",
            ));
        }

        let name = request.name.as_deref().map(|n| n.trim().to_string());
        let email = request.email.as_deref().map(normalize_email);

        let mut errors = Vec::new();
        if let Some(error) = name.as_deref().and_then(check_name) {
            errors.push(error);
        }
        if let Some(error) = email.as_deref().and_then(|e| self.check_email(e)) {
            errors.push(error);
        }
        if let Some(error) = request.password.as_deref().and_then(check_password) {
            errors.push(error);
        }
        if !errors.is_empty() {
            return Err(RentalError::Validation(errors));
        }

        if let Some(email) = email.as_deref() {
            let taken = self
                .users
                .find_by_email(email)
                .await?
                .is_some_and(|owner| owner.id != subject_id);
            if taken {
                return Err(RentalError::Conflict(
                    "An account with this email already exists".to_string(),
                ));
            }
        }

        let password_hash = match request.password {
            Some(password) => Some(self.hash_password(password).await?),
            None => None,
        };

        let user = self
            .users
            .update_by_id(
                subject_id,
                UserChanges {
                    name,
                    email,
                    password_hash,
                },
            )
            .await?
            .ok_or_else(|| RentalError::NotFound("User not found".to_string()))?;

        tracing::info!(target: "rental.auth", user_id = user.id, "Profile updated");
        Ok(UserProfile::from(&user))
    }

    #[instrument(skip_all, fields(subject_id = subject_id))]
    pub async fn get_profile(&self, subject_id: i64) -> Result<UserProfile, RentalError> {
        self.users
            .find_by_id(subject_id)
            .await?
            .map(|user| UserProfile::from(&user))
            .ok_or_else(|| RentalError::NotFound("User not found".to_string()))
    }

    #[instrument(skip_all)]
    pub async fn list_users(&self) -> Result<Vec<UserProfile>, RentalError> {
        Ok(self
            .users
            .list()
            .await?
            .iter()
            .map(UserProfile::from)
            .collect())
    }

    /// Shape check plus the top-level domain allow-list.
    ///
    /// Expects an already lower-cased email.
    pub fn is_valid_email(&self, email: &str) -> bool {
        if !is_well_formed_email(email) {
            return false;
        }
        email
            .rsplit('.')
            .next()
            .is_some_and(|tld| self.allowed_email_tlds.iter().any(|allowed| allowed == tld))
    }

    fn check_email(&self, email: &str) -> Option<FieldError> {
        if !is_well_formed_email(email) {
            return Some(FieldError::new("email", "Invalid email format"));
        }
        if !self.is_valid_email(email) {
            return Some(FieldError::new("email", "Email domain is not allowed"));
        }
        None
    }

    fn respond_with_token(&self, user: &User, kind: IssueKind) -> Result<AuthResponse, RentalError> {
        let lifetime = match kind {
            IssueKind::Registration => self.registration_token_lifetime_seconds,
            IssueKind::Login => self.login_token_lifetime_seconds,
        };

        let start = Instant::now();
        let issued = self.codec.issue(user.id, lifetime);
        let status = if issued.is_ok() { "success" } else { "error" };
        record_token_issuance(kind.as_str(), status, start.elapsed());
        let issued = issued?;

        Ok(AuthResponse {
            user: UserProfile::from(user),
            expires_in: issued.expires_in(),
            access_token: issued.token,
            token_type: TOKEN_TYPE.to_string(),
        })
    }

    async fn hash_password(&self, password: String) -> Result<String, RentalError> {
        let cost = self.bcrypt_cost;
        let start = Instant::now();
        let result = tokio::task::spawn_blocking(move || crypto::hash_password(&password, cost))
            .await
            .map_err(|e| {
                tracing::error!(target: "rental.auth", error = %e, "Password hashing task failed");
                RentalError::Internal
            })?;
        record_bcrypt_duration("hash", start.elapsed());
        result
    }

    async fn verify_password(&self, password: String, hash: String) -> Result<bool, RentalError> {
        let start = Instant::now();
        let result = tokio::task::spawn_blocking(move || crypto::verify_password(&password, &hash))
            .await
            .map_err(|e| {
                tracing::error!(target: "rental.auth", error = %e, "Password verification task failed");
                RentalError::Internal
            })?;
        record_bcrypt_duration("verify", start.elapsed());
        result
    }
}

fn check_name(name: &str) -> Option<FieldError> {
    name.is_empty()
        .then(|| FieldError::new("name", "Name cannot be empty"))
}

fn normalize_email(email: &str) -> String {
    email.trim().to_ascii_lowercase()
}

fn check_password(password: &str) -> Option<FieldError> {
    (password.chars().count() < MIN_PASSWORD_LENGTH).then(|| {
        FieldError::new(
            "password",
            format!("Password must be at least {} characters", MIN_PASSWORD_LENGTH),
        )
    })
}

/// `local@domain.tld`: exactly one `@`, a non-empty local part, a dotted
/// domain with no empty labels and no whitespace anywhere.
fn is_well_formed_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }

    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }

    let labels: Vec<&str> = domain.split('.').collect();
    labels.len() >= 2 && labels.iter().all(|label| !label.is_empty())
}
