//! Integration tests for the bearer token lifecycle.

#![allow(clippy::unwrap_used)]

use knavetone_api::services::auth::{
    TokenManager, hash_password, validate_password, verify_password,
};
use knavetone_core::UserId;
use secrecy::SecretString;

fn manager() -> TokenManager {
    TokenManager::new(&SecretString::from("fP4!wN8#kD2$sV6&hJ0*mB3@xZ7^cQ5r"), 24)
}

#[test]
fn test_token_roundtrip_preserves_identity() {
    let manager = manager();

    let token = manager.generate(UserId::new(7), false).unwrap();
    let claims = manager.validate(&token).unwrap();

    assert_eq!(claims.user_id().unwrap(), UserId::new(7));
    assert!(!claims.admin);
}

#[test]
fn test_admin_flag_carried_in_claims() {
    let manager = manager();

    let token = manager.generate(UserId::new(1), true).unwrap();
    assert!(manager.validate(&token).unwrap().admin);
}

#[test]
fn test_tampered_token_rejected() {
    let manager = manager();
    let token = manager.generate(UserId::new(7), false).unwrap();

    // Flip a character in the signature segment.
    let mut tampered = token.clone();
    let last = tampered.pop().unwrap();
    tampered.push(if last == 'a' { 'b' } else { 'a' });

    assert!(manager.validate(&tampered).is_err());
}

#[test]
fn test_token_from_other_deployment_rejected() {
    let ours = manager();
    let theirs = TokenManager::new(&SecretString::from("tG9$eU1!oI5#aS3&dF7*gH2@jK8^lZ4x"), 24);

    let token = theirs.generate(UserId::new(7), true).unwrap();
    assert!(ours.validate(&token).is_err());
}

// =============================================================================
// Password Handling
// =============================================================================

#[test]
fn test_register_login_password_flow() {
    // The same steps registration and login take, minus the database.
    let password = "a perfectly fine passphrase";
    validate_password(password).unwrap();

    let stored = hash_password(password).unwrap();
    verify_password(password, &stored).unwrap();
    assert!(verify_password("wrong guess", &stored).is_err());
}

#[test]
fn test_short_password_rejected_before_hashing() {
    assert!(validate_password("seven77").is_err());
    assert!(validate_password("eight888").is_ok());
}
