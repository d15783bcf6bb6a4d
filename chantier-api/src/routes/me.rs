//! Own-profile endpoints.
//!
//! # Endpoints
//!
//! - `GET /v1/me` - Current profile
//! - `PUT /v1/me` - Update profile fields
//! - `PUT /v1/me/password` - Change password (current password required)

use crate::{
    app::AppState,
    error::{validation_details, ApiError, ApiResult, ValidationErrorDetail},
};
use axum::{extract::State, Extension, Json};
use chantier_shared::{
    auth::{middleware::AuthContext, password},
    models::user::{UpdateProfile, User},
};
use serde::Deserialize;
use validator::Validate;

/// Profile update request
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateProfileRequest {
    #[validate(length(max = 100, message = "Name must be at most 100 characters"))]
    pub name: Option<String>,

    #[validate(length(max = 100, message = "Company must be at most 100 characters"))]
    pub company: Option<String>,

    #[validate(length(max = 32, message = "Phone must be at most 32 characters"))]
    pub phone: Option<String>,

    #[validate(length(max = 512, message = "Avatar URL must be at most 512 characters"))]
    pub avatar_url: Option<String>,
}

/// Password change request
#[derive(Debug, Deserialize)]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
}

/// Returns the authenticated user's profile
pub async fn get_profile(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<User>> {
    let user = User::find_by_id(&state.db, auth.user_id)
        .await?
        .ok_or_else(ApiError::not_visible)?;

    Ok(Json(user))
}

/// Updates profile fields
pub async fn update_profile(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(req): Json<UpdateProfileRequest>,
) -> ApiResult<Json<User>> {
    req.validate().map_err(validation_details)?;

    let user = User::update_profile(
        &state.db,
        auth.user_id,
        UpdateProfile {
            name: req.name,
            company: req.company,
            phone: req.phone,
            avatar_url: req.avatar_url,
        },
    )
    .await?
    .ok_or_else(ApiError::not_visible)?;

    Ok(Json(user))
}

/// Changes the password after verifying the current one
///
/// # Errors
///
/// - `401`: wrong current password, or an account without a password
/// - `422`: new password too weak
pub async fn change_password(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(req): Json<ChangePasswordRequest>,
) -> ApiResult<Json<serde_json::Value>> {
    let user = User::find_by_id(&state.db, auth.user_id)
        .await?
        .ok_or_else(ApiError::not_visible)?;

    let Some(current_hash) = user.password_hash.as_deref() else {
        return Err(ApiError::Unauthorized(
            "Account has no password set".to_string(),
        ));
    };

    if !password::verify_password(&req.current_password, current_hash)? {
        return Err(ApiError::Unauthorized(
            "Current password is incorrect".to_string(),
        ));
    }

    password::validate_password_strength(&req.new_password).map_err(|e| {
        ApiError::ValidationError(vec![ValidationErrorDetail {
            field: "new_password".to_string(),
            message: e,
        }])
    })?;

    let new_hash = password::hash_password(&req.new_password)?;
    User::update_password(&state.db, auth.user_id, &new_hash).await?;

    tracing::info!(user_id = %auth.user_id, "Password changed");

    Ok(Json(serde_json::json!({ "updated": true })))
}
