//! User account route handlers: registration, login, profiles, and the
//! admin-only management endpoints.

use axum::{
    Json,
    extract::{Multipart, Path, State},
    http::StatusCode,
};
use serde::Deserialize;
use serde_json::{Value, json};

use knavetone_core::UserId;

use crate::db::users;
use crate::error::{AppError, Result};
use crate::middleware::{RequireAdmin, RequireUser};
use crate::models::User;
use crate::services::auth::{AuthService, Registration};
use crate::state::AppState;

/// Largest accepted profile picture, in bytes.
const MAX_PICTURE_BYTES: usize = 5 * 1024 * 1024;

/// Accepted picture content types and the extension each is stored under.
const PICTURE_TYPES: &[(&str, &str)] = &[
    ("image/jpeg", "jpg"),
    ("image/png", "png"),
    ("image/webp", "webp"),
];

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub first_name: String,
    pub last_name: String,
    pub middle_name: Option<String>,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdateRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub middle_name: Option<String>,
    pub phone: Option<String>,
    pub age: Option<i32>,
    pub address: Option<String>,
}

/// `POST /api/users` - Register a new account.
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<User>)> {
    let auth = AuthService::new(state.pool(), state.tokens());

    let user = auth
        .register(Registration {
            first_name: payload.first_name.trim(),
            last_name: payload.last_name.trim(),
            middle_name: payload.middle_name.as_deref().map(str::trim),
            email: payload.email.trim(),
            password: &payload.password,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(user)))
}

/// `POST /api/users/login` - Exchange credentials for a bearer token.
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<Value>> {
    let auth = AuthService::new(state.pool(), state.tokens());

    let (user, token) = auth.login(payload.email.trim(), &payload.password).await?;

    Ok(Json(json!({ "token": token, "user": user })))
}

/// `GET /api/users` - List every account (admin).
pub async fn list(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
) -> Result<Json<Vec<User>>> {
    let users = users::list(state.pool()).await?;
    Ok(Json(users))
}

/// `GET /api/users/profile` - The authenticated user's own record.
pub async fn profile(RequireUser(user): RequireUser) -> Json<User> {
    Json(user)
}

/// `PUT /api/users/profile` - Update own profile fields.
///
/// Absent fields keep their stored values; email and role never change here.
pub async fn update_profile(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Json(payload): Json<ProfileUpdateRequest>,
) -> Result<Json<User>> {
    if let Some(age) = payload.age
        && !(0..=150).contains(&age)
    {
        return Err(AppError::BadRequest("Invalid age.".to_string()));
    }

    let update = users::ProfileUpdate {
        first_name: payload.first_name,
        last_name: payload.last_name,
        middle_name: payload.middle_name,
        phone: payload.phone,
        age: payload.age,
        address: payload.address,
    };

    let user = users::update_profile(state.pool(), user.id, &update).await?;
    Ok(Json(user))
}

/// `PUT /api/users/profile/picture` - Upload a profile picture (multipart).
///
/// Expects a single `picture` field. The file is written under the configured
/// upload directory and its relative path stored on the user record, so the
/// static file layer can serve it back at `/uploads/<name>`.
pub async fn upload_picture(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    mut multipart: Multipart,
) -> Result<Json<User>> {
    let mut picture: Option<(String, Vec<u8>)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("Malformed multipart body: {e}")))?
    {
        if field.name() != Some("picture") {
            continue;
        }

        let extension = field
            .content_type()
            .and_then(|ct| {
                PICTURE_TYPES
                    .iter()
                    .find(|(mime, _)| *mime == ct)
                    .map(|(_, ext)| (*ext).to_string())
            })
            .ok_or_else(|| {
                AppError::BadRequest("Picture must be a JPEG, PNG, or WebP image.".to_string())
            })?;

        let data = field
            .bytes()
            .await
            .map_err(|e| AppError::BadRequest(format!("Failed to read upload: {e}")))?;

        if data.len() > MAX_PICTURE_BYTES {
            return Err(AppError::BadRequest(
                "Picture exceeds the 5 MB limit.".to_string(),
            ));
        }

        picture = Some((extension, data.to_vec()));
        break;
    }

    let Some((extension, data)) = picture else {
        return Err(AppError::BadRequest(
            "Missing 'picture' field in upload.".to_string(),
        ));
    };

    // Timestamped name so a re-upload never serves a stale cached file.
    let filename = format!(
        "user-{}-{}.{extension}",
        user.id,
        chrono::Utc::now().timestamp_millis()
    );

    tokio::fs::create_dir_all(&state.config().upload_dir)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Failed to create upload directory");
            AppError::Internal(format!("create upload directory: {e}"))
        })?;

    let path = state.config().upload_dir.join(&filename);
    tokio::fs::write(&path, &data).await.map_err(|e| {
        tracing::error!(error = %e, path = %path.display(), "Failed to store picture");
        AppError::Internal(format!("store picture: {e}"))
    })?;

    let user = users::set_picture(state.pool(), user.id, &format!("/uploads/{filename}")).await?;

    tracing::info!(user_id = %user.id, %filename, "Profile picture updated");
    Ok(Json(user))
}

/// `PUT /api/users/{id}/admin` - Toggle another user's admin role (admin).
///
/// Admins cannot change their own role, so the deployment always keeps at
/// least one administrator.
pub async fn toggle_admin(
    State(state): State<AppState>,
    RequireAdmin(acting): RequireAdmin,
    Path(id): Path<UserId>,
) -> Result<Json<User>> {
    if acting.id == id {
        return Err(AppError::Forbidden(
            "You cannot change your own admin role.".to_string(),
        ));
    }

    let target = users::get_by_id(state.pool(), id)
        .await?
        .ok_or(AppError::NotFound("User not found.".to_string()))?;

    let user = users::set_admin(state.pool(), id, !target.is_admin).await?;

    tracing::info!(
        admin_id = %acting.id,
        user_id = %user.id,
        is_admin = user.is_admin,
        "Admin role toggled"
    );
    Ok(Json(user))
}

/// `DELETE /api/users/{id}` - Delete an account (admin, not self).
///
/// Cart lines go with the account via cascade; their reserved stock is not
/// restored, matching how abandoned carts age out.
pub async fn remove(
    State(state): State<AppState>,
    RequireAdmin(acting): RequireAdmin,
    Path(id): Path<UserId>,
) -> Result<Json<Value>> {
    if acting.id == id {
        return Err(AppError::Forbidden(
            "You cannot delete your own account.".to_string(),
        ));
    }

    if !users::delete(state.pool(), id).await? {
        return Err(AppError::NotFound("User not found.".to_string()));
    }

    tracing::info!(admin_id = %acting.id, user_id = %id, "User deleted");
    Ok(Json(json!({ "message": "User deleted successfully." })))
}
