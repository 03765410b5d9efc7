//! Bearer token generation and validation.
//!
//! Tokens are HS256 JWTs carrying the user id and admin flag. They expire
//! after a configurable interval (24 hours by default) and are presented as
//! `Authorization: Bearer <token>`.

use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use knavetone_core::UserId;

use super::AuthError;

const ISSUER: &str = "knavetone";

/// Claims carried by a store bearer token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user ID).
    pub sub: String,
    /// Whether the user held the admin role when the token was issued.
    ///
    /// Used only as a hint; role-gated handlers re-check the user record so
    /// a demotion takes effect before the token expires.
    pub admin: bool,
    /// Issued at timestamp.
    pub iat: i64,
    /// Expiration timestamp.
    pub exp: i64,
    /// Issuer.
    pub iss: String,
}

impl Claims {
    /// Creates new claims for a user.
    #[must_use]
    pub fn new(user_id: UserId, admin: bool, ttl_hours: u64) -> Self {
        let now = Utc::now();
        let exp = now + Duration::hours(i64::try_from(ttl_hours).unwrap_or(24));

        Self {
            sub: user_id.to_string(),
            admin,
            iat: now.timestamp(),
            exp: exp.timestamp(),
            iss: ISSUER.to_string(),
        }
    }

    /// Returns the user ID.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidToken` if the subject is not a valid id.
    pub fn user_id(&self) -> Result<UserId, AuthError> {
        self.sub
            .parse::<i32>()
            .map(UserId::new)
            .map_err(|_| AuthError::InvalidToken)
    }
}

/// Signs and validates bearer tokens.
#[derive(Clone)]
pub struct TokenManager {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    ttl_hours: u64,
}

impl std::fmt::Debug for TokenManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenManager")
            .field("ttl_hours", &self.ttl_hours)
            .finish_non_exhaustive()
    }
}

impl TokenManager {
    /// Creates a new token manager from the signing secret.
    #[must_use]
    pub fn new(secret: &SecretString, ttl_hours: u64) -> Self {
        let bytes = secret.expose_secret().as_bytes();
        Self {
            encoding_key: EncodingKey::from_secret(bytes),
            decoding_key: DecodingKey::from_secret(bytes),
            ttl_hours,
        }
    }

    /// Generates a token for a user.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::TokenCreation` if signing fails.
    pub fn generate(&self, user_id: UserId, admin: bool) -> Result<String, AuthError> {
        let claims = Claims::new(user_id, admin, self.ttl_hours);

        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|_| AuthError::TokenCreation)
    }

    /// Validates and decodes a token.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidToken` if the token is malformed, has a bad
    /// signature, a wrong issuer, or is expired.
    pub fn validate(&self, token: &str) -> Result<Claims, AuthError> {
        let mut validation = Validation::default();
        validation.set_issuer(&[ISSUER]);

        decode::<Claims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|_| AuthError::InvalidToken)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn manager() -> TokenManager {
        TokenManager::new(&SecretString::from("k9$vQz2#mW8&nR4!pL6*tX0@bH5^dF3j"), 24)
    }

    #[test]
    fn test_generate_validate_roundtrip() {
        let manager = manager();
        let token = manager.generate(UserId::new(42), true).unwrap();

        let claims = manager.validate(&token).unwrap();
        assert_eq!(claims.user_id().unwrap(), UserId::new(42));
        assert!(claims.admin);
        assert_eq!(claims.iss, ISSUER);
    }

    #[test]
    fn test_validate_rejects_garbage() {
        let manager = manager();
        assert!(matches!(
            manager.validate("not-a-token"),
            Err(AuthError::InvalidToken)
        ));
    }

    #[test]
    fn test_validate_rejects_wrong_secret() {
        let token = manager().generate(UserId::new(1), false).unwrap();

        let other = TokenManager::new(&SecretString::from("z3!xC7$vB1#nM9&kL5*qW2@eR8^tY4u"), 24);
        assert!(matches!(
            other.validate(&token),
            Err(AuthError::InvalidToken)
        ));
    }

    #[test]
    fn test_expired_token_rejected() {
        let manager = manager();
        // Zero-hour TTL: expired at issue time (validation leeway defaults
        // to 60s, so back-date further via claims directly)
        let mut claims = Claims::new(UserId::new(1), false, 0);
        claims.iat -= 3600;
        claims.exp -= 3600;

        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret("k9$vQz2#mW8&nR4!pL6*tX0@bH5^dF3j".as_bytes()),
        )
        .unwrap();

        assert!(matches!(
            manager.validate(&token),
            Err(AuthError::InvalidToken)
        ));
    }

    #[test]
    fn test_claims_expiry_interval() {
        let claims = Claims::new(UserId::new(1), false, 24);
        assert_eq!(claims.exp - claims.iat, 24 * 3600);
    }
}
