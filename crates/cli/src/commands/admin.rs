//! Admin role management commands.
//!
//! # Usage
//!
//! ```bash
//! # Grant the admin role to an existing user
//! knavetone-cli admin grant -e owner@example.com
//!
//! # Revoke it again
//! knavetone-cli admin revoke -e former@example.com
//! ```
//!
//! Unlike the HTTP endpoint, these commands have no self-protection rule;
//! they exist precisely to recover a deployment that locked out its last
//! admin.

use knavetone_core::Email;

use super::CliError;

/// Set a user's admin flag by email.
///
/// # Errors
///
/// Returns `CliError::UserNotFound` if no account exists for the address.
pub async fn set_role(email: &str, is_admin: bool) -> Result<(), CliError> {
    // Normalize the same way registration does, so lookups match.
    let email =
        Email::parse(email).map_err(|_| CliError::UserNotFound(email.to_owned()))?;

    let pool = super::connect().await?;

    let result = sqlx::query("UPDATE users SET is_admin = $2, updated_at = NOW() WHERE email = $1")
        .bind(&email)
        .bind(is_admin)
        .execute(&pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(CliError::UserNotFound(email.as_str().to_owned()));
    }

    tracing::info!(email = %email, is_admin, "Admin role updated");
    Ok(())
}
