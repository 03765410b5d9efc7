//! Authentication service.
//!
//! Handles registration, login, password hashing, and bearer tokens.
//!
//! Passwords are stored as salted argon2id hashes and verified in constant
//! time; the raw secret never reaches the repository layer.

mod error;
mod token;

pub use error::AuthError;
pub use token::{Claims, TokenManager};

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use sqlx::PgPool;
use tracing::instrument;

use knavetone_core::Email;

use crate::db::{RepositoryError, users};
use crate::models::User;

/// Minimum password length.
const MIN_PASSWORD_LENGTH: usize = 8;

/// Registration input.
#[derive(Debug)]
pub struct Registration<'a> {
    pub first_name: &'a str,
    pub last_name: &'a str,
    pub middle_name: Option<&'a str>,
    pub email: &'a str,
    pub password: &'a str,
}

/// Authentication service.
pub struct AuthService<'a> {
    pool: &'a PgPool,
    tokens: &'a TokenManager,
}

impl<'a> AuthService<'a> {
    /// Create a new authentication service.
    #[must_use]
    pub const fn new(pool: &'a PgPool, tokens: &'a TokenManager) -> Self {
        Self { pool, tokens }
    }

    /// Register a new user.
    ///
    /// The first account ever registered becomes an admin (see
    /// [`users::create`]).
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidEmail` if the email format is invalid.
    /// Returns `AuthError::WeakPassword` if the password doesn't meet requirements.
    /// Returns `AuthError::UserAlreadyExists` if the email is already registered.
    #[instrument(skip(self, registration), fields(email = registration.email))]
    pub async fn register(&self, registration: Registration<'_>) -> Result<User, AuthError> {
        let email = Email::parse(registration.email)?;
        validate_password(registration.password)?;

        let password_hash = hash_password(registration.password)?;

        let user = users::create(
            self.pool,
            users::NewUser {
                first_name: registration.first_name,
                last_name: registration.last_name,
                middle_name: registration.middle_name,
                email: &email,
                password_hash: &password_hash,
            },
        )
        .await
        .map_err(|e| match e {
            RepositoryError::Conflict(_) => AuthError::UserAlreadyExists,
            other => AuthError::Repository(other),
        })?;

        tracing::info!(user_id = %user.id, is_admin = user.is_admin, "User registered");
        Ok(user)
    }

    /// Login with email and password, returning the user and a fresh token.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` if the email/password is wrong.
    /// An unknown address takes the same path as a wrong password, so the
    /// response does not reveal which one failed.
    #[instrument(skip(self, password))]
    pub async fn login(&self, email: &str, password: &str) -> Result<(User, String), AuthError> {
        let email = Email::parse(email)?;

        let (user, password_hash) = users::get_by_email_with_hash(self.pool, &email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        verify_password(password, &password_hash)?;

        let token = self.tokens.generate(user.id, user.is_admin)?;

        Ok((user, token))
    }
}

/// Validate a candidate password against the minimum requirements.
///
/// # Errors
///
/// Returns `AuthError::WeakPassword` naming the failed requirement.
pub fn validate_password(password: &str) -> Result<(), AuthError> {
    if password.len() < MIN_PASSWORD_LENGTH {
        return Err(AuthError::WeakPassword(format!(
            "Password must be at least {MIN_PASSWORD_LENGTH} characters."
        )));
    }
    Ok(())
}

/// Hash a password with argon2id and a fresh random salt.
///
/// # Errors
///
/// Returns `AuthError::PasswordHash` if hashing fails.
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);

    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AuthError::PasswordHash)
}

/// Verify a presented password against a stored hash.
///
/// # Errors
///
/// Returns `AuthError::InvalidCredentials` on mismatch.
pub fn verify_password(password: &str, stored_hash: &str) -> Result<(), AuthError> {
    let parsed = PasswordHash::new(stored_hash).map_err(|_| AuthError::PasswordHash)?;

    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .map_err(|_| AuthError::InvalidCredentials)
}
