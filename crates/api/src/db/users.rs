//! User account database operations.

use sqlx::PgPool;

use knavetone_core::{Email, UserId};

use super::{RepositoryError, map_unique_violation};
use crate::models::User;

const USER_COLUMNS: &str = "id, first_name, last_name, middle_name, email, is_admin, \
     phone, age, address, picture, created_at, updated_at";

/// Parameters for creating a new user.
#[derive(Debug)]
pub struct NewUser<'a> {
    pub first_name: &'a str,
    pub last_name: &'a str,
    pub middle_name: Option<&'a str>,
    pub email: &'a Email,
    /// argon2 hash, never the raw secret.
    pub password_hash: &'a str,
}

/// Profile fields a user may update about themselves.
#[derive(Debug, Default)]
pub struct ProfileUpdate {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub middle_name: Option<String>,
    pub phone: Option<String>,
    pub age: Option<i32>,
    pub address: Option<String>,
}

/// Create a new user.
///
/// The very first registered account is made an admin so a fresh deployment
/// always has one; everyone after that starts as a regular user. The
/// emptiness check runs inside the INSERT and is atomic with respect to
/// committed rows only; two registrations racing on an empty table can
/// still both see zero and both come out admin. `knavetone-cli admin
/// revoke` covers that corner.
///
/// # Errors
///
/// Returns `RepositoryError::Conflict` if the email already exists.
pub async fn create(pool: &PgPool, new_user: NewUser<'_>) -> Result<User, RepositoryError> {
    let query = format!(
        r"
        INSERT INTO users (first_name, last_name, middle_name, email, password_hash, is_admin)
        VALUES ($1, $2, $3, $4, $5, (SELECT COUNT(*) FROM users) = 0)
        RETURNING {USER_COLUMNS}
        "
    );

    sqlx::query_as::<_, User>(&query)
        .bind(new_user.first_name)
        .bind(new_user.last_name)
        .bind(new_user.middle_name)
        .bind(new_user.email)
        .bind(new_user.password_hash)
        .fetch_one(pool)
        .await
        .map_err(|e| map_unique_violation(e, "email already exists"))
}

/// Get a user by their ID.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the query fails.
pub async fn get_by_id(pool: &PgPool, id: UserId) -> Result<Option<User>, RepositoryError> {
    let query = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");

    let user = sqlx::query_as::<_, User>(&query)
        .bind(id)
        .fetch_optional(pool)
        .await?;

    Ok(user)
}

/// Get a user and their password hash by email.
///
/// Returns `None` if no account exists for the address.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the query fails.
pub async fn get_by_email_with_hash(
    pool: &PgPool,
    email: &Email,
) -> Result<Option<(User, String)>, RepositoryError> {
    #[derive(sqlx::FromRow)]
    struct UserWithHash {
        #[sqlx(flatten)]
        user: User,
        password_hash: String,
    }

    let query = format!("SELECT {USER_COLUMNS}, password_hash FROM users WHERE email = $1");

    let row = sqlx::query_as::<_, UserWithHash>(&query)
        .bind(email)
        .fetch_optional(pool)
        .await?;

    Ok(row.map(|r| (r.user, r.password_hash)))
}

/// List all users, oldest first.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the query fails.
pub async fn list(pool: &PgPool) -> Result<Vec<User>, RepositoryError> {
    let query = format!("SELECT {USER_COLUMNS} FROM users ORDER BY created_at ASC");

    let users = sqlx::query_as::<_, User>(&query).fetch_all(pool).await?;

    Ok(users)
}

/// Update a user's profile fields.
///
/// Only the fields present in `update` change; COALESCE keeps the rest.
///
/// # Errors
///
/// Returns `RepositoryError::NotFound` if the user doesn't exist.
pub async fn update_profile(
    pool: &PgPool,
    id: UserId,
    update: &ProfileUpdate,
) -> Result<User, RepositoryError> {
    let query = format!(
        r"
        UPDATE users
        SET first_name = COALESCE($2, first_name),
            last_name = COALESCE($3, last_name),
            middle_name = COALESCE($4, middle_name),
            phone = COALESCE($5, phone),
            age = COALESCE($6, age),
            address = COALESCE($7, address),
            updated_at = NOW()
        WHERE id = $1
        RETURNING {USER_COLUMNS}
        "
    );

    sqlx::query_as::<_, User>(&query)
        .bind(id)
        .bind(update.first_name.as_deref())
        .bind(update.last_name.as_deref())
        .bind(update.middle_name.as_deref())
        .bind(update.phone.as_deref())
        .bind(update.age)
        .bind(update.address.as_deref())
        .fetch_optional(pool)
        .await?
        .ok_or(RepositoryError::NotFound)
}

/// Record the relative path of a freshly uploaded profile picture.
///
/// # Errors
///
/// Returns `RepositoryError::NotFound` if the user doesn't exist.
pub async fn set_picture(pool: &PgPool, id: UserId, path: &str) -> Result<User, RepositoryError> {
    let query = format!(
        r"
        UPDATE users
        SET picture = $2, updated_at = NOW()
        WHERE id = $1
        RETURNING {USER_COLUMNS}
        "
    );

    sqlx::query_as::<_, User>(&query)
        .bind(id)
        .bind(path)
        .fetch_optional(pool)
        .await?
        .ok_or(RepositoryError::NotFound)
}

/// Set or clear a user's admin flag.
///
/// # Errors
///
/// Returns `RepositoryError::NotFound` if the user doesn't exist.
pub async fn set_admin(pool: &PgPool, id: UserId, is_admin: bool) -> Result<User, RepositoryError> {
    let query = format!(
        r"
        UPDATE users
        SET is_admin = $2, updated_at = NOW()
        WHERE id = $1
        RETURNING {USER_COLUMNS}
        "
    );

    sqlx::query_as::<_, User>(&query)
        .bind(id)
        .bind(is_admin)
        .fetch_optional(pool)
        .await?
        .ok_or(RepositoryError::NotFound)
}

/// Delete a user and, via cascade, their cart lines.
///
/// Returns `true` if a row was deleted.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the query fails.
pub async fn delete(pool: &PgPool, id: UserId) -> Result<bool, RepositoryError> {
    let result = sqlx::query("DELETE FROM users WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}
