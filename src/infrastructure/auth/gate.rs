//! Bearer token extraction and the access decision

use crate::domain::auth::{AuthError, JwtClaims};

use super::jwt::TokenService;

const BEARER_SCHEME: &str = "bearer";

/// Extract the token from an `Authorization` header value
///
/// The value must be exactly two whitespace-separated parts, the first being
/// `Bearer` in any letter case.
pub fn parse_bearer(header: Option<&str>) -> Result<&str, AuthError> {
    let header = match header {
        Some(value) if !value.is_empty() => value,
        _ => return Err(AuthError::MissingAuthHeader),
    };

    let mut parts = header.split_whitespace();

    match (parts.next(), parts.next(), parts.next()) {
        (Some(scheme), Some(token), None) if scheme.eq_ignore_ascii_case(BEARER_SCHEME) => {
            Ok(token)
        }
        _ => Err(AuthError::MalformedAuthHeader),
    }
}

/// Decide whether a request carrying `header` is admitted
///
/// The token is always verified here, whether or not an upstream gateway has
/// already checked it.
pub fn gate(header: Option<&str>, tokens: &dyn TokenService) -> Result<JwtClaims, AuthError> {
    let token = parse_bearer(header)?;
    tokens.verify(token)
}

/// Verify a token offered either as a query parameter or a bearer header
///
/// The query parameter wins when both are present. Tokens in URLs end up in
/// access logs and `Referer` headers; the form is kept for existing clients.
pub fn verify_request(
    query_token: Option<&str>,
    header: Option<&str>,
    tokens: &dyn TokenService,
) -> Result<JwtClaims, AuthError> {
    let token = query_token
        .filter(|t| !t.is_empty())
        .or_else(|| parse_bearer(header).ok())
        .ok_or(AuthError::MissingToken)?;

    tokens.verify(token)
}
