/// Bearer-token authentication
///
/// Extracts the identity provider's access token from the
/// `Authorization: Bearer <token>` header and verifies it. The API's auth
/// layer places the resulting [`AuthContext`] in the request extensions, so
/// handlers read the caller's identity from the context and never from the
/// request body.
///
/// # Example
///
/// ```
/// use axum::http::{header, HeaderMap};
/// use codegrade_shared::auth::jwt::{create_token, Claims};
/// use codegrade_shared::auth::middleware::authenticate;
/// use uuid::Uuid;
///
/// let secret = "a-provider-secret-that-is-long-enough";
/// let user_id = Uuid::new_v4();
/// let token = create_token(&Claims::new(user_id, None), secret).unwrap();
///
/// let mut headers = HeaderMap::new();
/// headers.insert(header::AUTHORIZATION, format!("Bearer {}", token).parse().unwrap());
///
/// let auth = authenticate(&headers, secret).unwrap();
/// assert_eq!(auth.user_id, user_id);
/// ```

use axum::{
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::jwt::{validate_access_token, JwtError};

/// Authenticated caller, added to request extensions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthContext {
    /// User ID from the token subject
    pub user_id: Uuid,

    /// Email from the token, when present
    pub email: Option<String>,
}

impl AuthContext {
    /// Creates an auth context for a verified user
    pub fn new(user_id: Uuid, email: Option<String>) -> Self {
        Self { user_id, email }
    }

    /// Email to store on a freshly created profile
    pub fn email_or_empty(&self) -> &str {
        self.email.as_deref().unwrap_or_default()
    }
}

/// Error type for authentication
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// Missing authorization header
    MissingCredentials,

    /// Authorization header is not a Bearer token
    InvalidFormat(String),

    /// Token validation failed
    InvalidToken(String),
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        match self {
            AuthError::MissingCredentials => {
                (StatusCode::UNAUTHORIZED, "Missing credentials").into_response()
            }
            AuthError::InvalidFormat(msg) => (StatusCode::BAD_REQUEST, msg).into_response(),
            AuthError::InvalidToken(msg) => (StatusCode::UNAUTHORIZED, msg).into_response(),
        }
    }
}

impl From<JwtError> for AuthError {
    fn from(err: JwtError) -> Self {
        match err {
            JwtError::Expired => AuthError::InvalidToken("Token expired".to_string()),
            JwtError::InvalidAudience => {
                AuthError::InvalidToken("Token is not for a signed-in user".to_string())
            }
            other => AuthError::InvalidToken(format!("Invalid token: {}", other)),
        }
    }
}

/// Verifies the bearer token in `headers`
///
/// # Errors
///
/// - `MissingCredentials` when there is no `Authorization` header
/// - `InvalidFormat` when it is not `Bearer <token>`
/// - `InvalidToken` when verification fails
pub fn authenticate(headers: &HeaderMap, secret: &str) -> Result<AuthContext, AuthError> {
    let auth_header = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or(AuthError::MissingCredentials)?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or_else(|| AuthError::InvalidFormat("Expected Bearer token".to_string()))?;

    let claims = validate_access_token(token.trim(), secret)?;

    Ok(AuthContext::new(claims.sub, claims.email))
}
