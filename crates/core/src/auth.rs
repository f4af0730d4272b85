//! Bearer credential parsing.
//!
//! The session lookup itself lives behind the store; this module only deals
//! with the shape of the `Authorization` header.

use crate::types::DbId;

/// The only accepted authorization scheme.
pub const BEARER_SCHEME: &str = "Bearer";

/// Reasons a request fails authentication. All of them map to HTTP 401.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    #[error("Missing Authorization header")]
    MissingToken,

    #[error("Invalid Authorization format. Expected: Bearer <token>")]
    MalformedToken,

    #[error("Invalid or expired token")]
    UnknownToken,
}

/// The user a session token resolved to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Identity {
    pub user_id: DbId,
}

/// Extract the token from a raw `Authorization` header value.
///
/// The header must split on whitespace into exactly two parts, the first of
/// which is literally `Bearer`.
pub fn parse_bearer(header: Option<&str>) -> Result<&str, AuthError> {
    let header = header.ok_or(AuthError::MissingToken)?;

    let mut parts = header.split_whitespace();
    match (parts.next(), parts.next(), parts.next()) {
        (Some(BEARER_SCHEME), Some(token), None) => Ok(token),
        _ => Err(AuthError::MalformedToken),
    }
}
