//! Request authentication context.
//!
//! The API layer validates the Bearer token on protected routes and inserts
//! an [`AuthContext`] into the request extensions; handlers extract it with
//! Axum's `Extension` extractor. The access resolver receives the user id
//! from this context and performs no credential checks of its own.
//!
//! # Example
//!
//! ```
//! use axum::Extension;
//! use chantier_shared::auth::middleware::AuthContext;
//!
//! async fn handler(Extension(auth): Extension<AuthContext>) -> String {
//!     format!("User: {}", auth.user_id)
//! }
//! ```

use axum::http::header;
use axum::http::HeaderMap;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::jwt::Claims;
use crate::models::user::UserRole;

/// Authentication context added to request extensions
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthContext {
    /// Authenticated user ID
    pub user_id: Uuid,

    /// Account role carried by the token
    pub role: UserRole,
}

impl AuthContext {
    /// Creates an auth context from validated JWT claims
    pub fn from_claims(claims: &Claims) -> Self {
        Self {
            user_id: claims.sub,
            role: claims.role,
        }
    }

    /// Whether the authenticated account has the admin role
    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }
}

/// Error type for authentication middleware
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// No credentials provided
    #[error("Missing credentials")]
    MissingCredentials,

    /// Credentials are malformed
    #[error("Invalid credential format: {0}")]
    InvalidFormat(String),

    /// Token failed validation
    #[error("Invalid token: {0}")]
    InvalidToken(String),
}

/// Extracts the Bearer token from an Authorization header
///
/// # Errors
///
/// Returns `AuthError::MissingCredentials` when the header is absent and
/// `AuthError::InvalidFormat` when it is not a Bearer token.
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, AuthError> {
    let auth_header = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or(AuthError::MissingCredentials)?;

    auth_header
        .strip_prefix("Bearer ")
        .ok_or_else(|| AuthError::InvalidFormat("Expected Bearer token".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_bearer_token_extraction() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            HeaderValue::from_static("Bearer abc.def.ghi"),
        );

        assert_eq!(bearer_token(&headers).unwrap(), "abc.def.ghi");
    }

    #[test]
    fn test_bearer_token_missing_header() {
        let headers = HeaderMap::new();
        assert!(matches!(
            bearer_token(&headers),
            Err(AuthError::MissingCredentials)
        ));
    }

    #[test]
    fn test_bearer_token_wrong_scheme() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            HeaderValue::from_static("Basic dXNlcjpwYXNz"),
        );

        assert!(matches!(
            bearer_token(&headers),
            Err(AuthError::InvalidFormat(_))
        ));
    }

    #[test]
    fn test_is_admin() {
        let admin = AuthContext {
            user_id: Uuid::new_v4(),
            role: UserRole::Admin,
        };
        let user = AuthContext {
            user_id: Uuid::new_v4(),
            role: UserRole::User,
        };

        assert!(admin.is_admin());
        assert!(!user.is_admin());
    }
}
