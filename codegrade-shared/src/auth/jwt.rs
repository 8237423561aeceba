/// Identity-provider access token verification
///
/// Users sign in with the hosted identity provider, which issues HS256 JWTs
/// signed with the project's shared secret. CodeGrade never issues tokens in
/// production; it only verifies them and derives the caller's user id from
/// the `sub` claim.
///
/// # Verified Claims
///
/// - Signature (HS256 with the shared secret)
/// - `exp` (expiration) and `nbf` when present
/// - `aud` must be `authenticated`
///
/// # Example
///
/// ```
/// use codegrade_shared::auth::jwt::{create_token, validate_access_token, Claims};
/// use uuid::Uuid;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let secret = "a-provider-secret-that-is-long-enough";
/// let user_id = Uuid::new_v4();
///
/// let token = create_token(&Claims::new(user_id, Some("dev@example.com".into())), secret)?;
/// let claims = validate_access_token(&token, secret)?;
/// assert_eq!(claims.sub, user_id);
/// # Ok(())
/// # }
/// ```

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Audience the identity provider stamps on signed-in user tokens
pub const AUTHENTICATED_AUDIENCE: &str = "authenticated";

/// Error type for JWT operations
#[derive(Debug, thiserror::Error)]
pub enum JwtError {
    /// Failed to create token
    #[error("Failed to create token: {0}")]
    CreateError(String),

    /// Failed to validate token
    #[error("Failed to validate token: {0}")]
    ValidationError(String),

    /// Token has expired
    #[error("Token has expired")]
    Expired,

    /// Token was issued for another audience (e.g. anonymous role)
    #[error("Invalid audience")]
    InvalidAudience,
}

/// Claims carried by identity-provider access tokens
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject - user ID
    pub sub: Uuid,

    /// Audience - `authenticated` for signed-in users
    pub aud: String,

    /// Email address of the user, if the provider includes it
    #[serde(default)]
    pub email: Option<String>,

    /// Provider role (e.g. `authenticated`)
    #[serde(default)]
    pub role: Option<String>,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

impl Claims {
    /// Creates claims for a signed-in user, valid for one hour
    pub fn new(user_id: Uuid, email: Option<String>) -> Self {
        Self::with_expiration(user_id, email, Duration::hours(1))
    }

    /// Creates claims with a custom lifetime (negative = already expired)
    pub fn with_expiration(user_id: Uuid, email: Option<String>, expires_in: Duration) -> Self {
        let now = Utc::now();

        Self {
            sub: user_id,
            aud: AUTHENTICATED_AUDIENCE.to_string(),
            email,
            role: Some(AUTHENTICATED_AUDIENCE.to_string()),
            iat: now.timestamp(),
            exp: (now + expires_in).timestamp(),
        }
    }

    /// Checks if token has expired
    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp() >= self.exp
    }
}

/// Signs claims with HS256
///
/// Used by tests and local tooling to mint tokens the way the identity
/// provider does.
pub fn create_token(claims: &Claims, secret: &str) -> Result<String, JwtError> {
    let key = EncodingKey::from_secret(secret.as_bytes());

    encode(&Header::new(Algorithm::HS256), claims, &key)
        .map_err(|e| JwtError::CreateError(format!("Token encoding failed: {}", e)))
}

/// Validates an access token and extracts its claims
///
/// # Errors
///
/// - `JwtError::Expired` if `exp` has passed
/// - `JwtError::InvalidAudience` if `aud` is not `authenticated`
/// - `JwtError::ValidationError` for bad signatures or malformed tokens
pub fn validate_access_token(token: &str, secret: &str) -> Result<Claims, JwtError> {
    let key = DecodingKey::from_secret(secret.as_bytes());

    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_audience(&[AUTHENTICATED_AUDIENCE]);
    validation.set_required_spec_claims(&["exp", "sub", "aud"]);
    validation.validate_exp = true;
    validation.leeway = 0;

    let token_data = decode::<Claims>(token, &key, &validation).map_err(|e| match e.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => JwtError::Expired,
        jsonwebtoken::errors::ErrorKind::InvalidAudience => JwtError::InvalidAudience,
        _ => JwtError::ValidationError(format!("Token validation failed: {}", e)),
    })?;

    Ok(token_data.claims)
}
