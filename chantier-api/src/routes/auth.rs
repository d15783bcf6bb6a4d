//! Authentication endpoints.
//!
//! # Endpoints
//!
//! - `POST /v1/auth/register` - Register a new user
//! - `POST /v1/auth/login` - Login and get tokens
//! - `POST /v1/auth/refresh` - Refresh the access token
//!
//! Registration also creates the user's three system folders ("Mes
//! projets", "Archivés", "Projets partagés"), which the rest of the API
//! assumes exist.

use crate::{
    app::AppState,
    error::{validation_details, ApiError, ApiResult},
};
use axum::{extract::State, Json};
use chantier_shared::{
    auth::{jwt, password},
    models::{
        folder::ProjectFolder,
        user::{CreateUser, User, UserRole},
    },
};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Register request
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    /// Email address
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    /// Password (strength-validated)
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,

    /// Optional display name
    #[validate(length(max = 100, message = "Name must be at most 100 characters"))]
    pub name: Option<String>,

    /// Optional company name
    #[validate(length(max = 100, message = "Company must be at most 100 characters"))]
    pub company: Option<String>,

    /// Optional phone number
    #[validate(length(max = 32, message = "Phone must be at most 32 characters"))]
    pub phone: Option<String>,
}

/// Register response
#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    /// User ID
    pub user_id: String,

    /// Access token (24h)
    pub access_token: String,

    /// Refresh token (30d)
    pub refresh_token: String,
}

/// Login request
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    /// Email address
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    /// Password
    pub password: String,
}

/// Login response
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    /// User ID
    pub user_id: String,

    /// Account role
    pub role: UserRole,

    /// Access token (24h)
    pub access_token: String,

    /// Refresh token (30d)
    pub refresh_token: String,
}

/// Refresh token request
#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    /// Refresh token
    pub refresh_token: String,
}

/// Refresh token response
#[derive(Debug, Serialize)]
pub struct RefreshResponse {
    /// New access token (24h)
    pub access_token: String,
}

/// Register a new user
///
/// # Errors
///
/// - `422`: validation or password strength failure
/// - `409`: email already registered
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> ApiResult<Json<RegisterResponse>> {
    req.validate().map_err(validation_details)?;

    password::validate_password_strength(&req.password).map_err(|e| {
        ApiError::ValidationError(vec![crate::error::ValidationErrorDetail {
            field: "password".to_string(),
            message: e,
        }])
    })?;

    let password_hash = password::hash_password(&req.password)?;

    let user = User::create(
        &state.db,
        CreateUser {
            email: req.email.to_lowercase(),
            password_hash: Some(password_hash),
            role: UserRole::User,
            name: req.name,
            company: req.company,
            phone: req.phone,
        },
    )
    .await?;

    // Every account gets its three system folders up front; project
    // creation and shared listings rely on them.
    ProjectFolder::bootstrap_for_user(&state.db, user.id).await?;

    let access_claims = jwt::Claims::new(user.id, user.role, jwt::TokenType::Access);
    let refresh_claims = jwt::Claims::new(user.id, user.role, jwt::TokenType::Refresh);

    let access_token = jwt::create_token(&access_claims, state.jwt_secret())?;
    let refresh_token = jwt::create_token(&refresh_claims, state.jwt_secret())?;

    tracing::info!(user_id = %user.id, "User registered");

    Ok(Json(RegisterResponse {
        user_id: user.id.to_string(),
        access_token,
        refresh_token,
    }))
}

/// Login with email and password
///
/// Accounts provisioned through an external identity provider carry no
/// password hash and always fail password login.
///
/// # Errors
///
/// - `401`: unknown email, wrong password, or password-less account
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<Json<LoginResponse>> {
    req.validate().map_err(validation_details)?;

    let user = User::find_by_email(&state.db, &req.email.to_lowercase())
        .await?
        .ok_or_else(|| ApiError::Unauthorized("Invalid email or password".to_string()))?;

    let Some(password_hash) = user.password_hash.as_deref() else {
        // External-identity account: fail closed, same message as a wrong
        // password so the account type is not revealed
        return Err(ApiError::Unauthorized(
            "Invalid email or password".to_string(),
        ));
    };

    if !password::verify_password(&req.password, password_hash)? {
        return Err(ApiError::Unauthorized(
            "Invalid email or password".to_string(),
        ));
    }

    User::touch_last_login(&state.db, user.id).await?;

    let access_claims = jwt::Claims::new(user.id, user.role, jwt::TokenType::Access);
    let refresh_claims = jwt::Claims::new(user.id, user.role, jwt::TokenType::Refresh);

    let access_token = jwt::create_token(&access_claims, state.jwt_secret())?;
    let refresh_token = jwt::create_token(&refresh_claims, state.jwt_secret())?;

    tracing::info!(user_id = %user.id, "User logged in");

    Ok(Json(LoginResponse {
        user_id: user.id.to_string(),
        role: user.role,
        access_token,
        refresh_token,
    }))
}

/// Refresh the access token
///
/// # Errors
///
/// - `401`: invalid or expired refresh token
pub async fn refresh(
    State(state): State<AppState>,
    Json(req): Json<RefreshRequest>,
) -> ApiResult<Json<RefreshResponse>> {
    let access_token = jwt::refresh_access_token(&req.refresh_token, state.jwt_secret())?;

    Ok(Json(RefreshResponse { access_token }))
}
