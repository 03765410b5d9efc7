//! Database migration command.
//!
//! # Usage
//!
//! ```bash
//! knavetone-cli migrate
//! ```
//!
//! Migration files live in `crates/api/migrations/` and are embedded into the
//! binary at compile time, so the command works from any directory.

use super::CliError;

/// Run the store database migrations.
///
/// # Errors
///
/// Returns an error if the database is unreachable or a migration fails.
pub async fn run() -> Result<(), CliError> {
    let pool = super::connect().await?;

    tracing::info!("Running migrations...");
    sqlx::migrate!("../api/migrations").run(&pool).await?;

    tracing::info!("Migrations complete!");
    Ok(())
}
