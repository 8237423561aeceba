/// Authentication utilities
///
/// Sign-up, sign-in and session management belong to the hosted identity
/// provider. This module only verifies the access tokens it issues.
///
/// # Modules
///
/// - [`jwt`]: HS256 access token verification
/// - [`middleware`]: Axum middleware producing an [`middleware::AuthContext`]

pub mod jwt;
pub mod middleware;
