//! Access gate for protected routes

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header, request::Parts, HeaderMap},
    middleware::Next,
    response::Response,
};
use tracing::{debug, warn};

use crate::api::state::AppState;
use crate::api::types::ApiError;
use crate::domain::auth::{AuthError, JwtClaims};

/// Middleware that admits a request only with a valid bearer token
///
/// On success the verified claims are stored in the request extensions for
/// [`AuthenticatedUser`] to pick up.
pub async fn require_jwt(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let claims = {
        let header = authorization_header(request.headers())?;
        state.auth_service.gate(header).map_err(|e| {
            let path = request.uri().path();
            if e.is_token_failure() {
                warn!(reason = e.kind(), path = %path, "bearer token rejected");
            } else {
                debug!(reason = e.kind(), path = %path, "request rejected by gate");
            }
            ApiError::from(e)
        })?
    };

    request.extensions_mut().insert(claims);

    Ok(next.run(request).await)
}

/// Read the `Authorization` header as text
///
/// A value that is not visible ASCII cannot be a bearer credential and is
/// reported as a format error.
pub fn authorization_header(headers: &HeaderMap) -> Result<Option<&str>, ApiError> {
    headers
        .get(header::AUTHORIZATION)
        .map(|value| {
            value
                .to_str()
                .map_err(|_| ApiError::from(AuthError::MalformedAuthHeader))
        })
        .transpose()
}

/// Claims of the caller admitted by [`require_jwt`]
#[derive(Debug, Clone)]
pub struct AuthenticatedUser(pub JwtClaims);

impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<JwtClaims>()
            .cloned()
            .map(AuthenticatedUser)
            .ok_or_else(|| ApiError::from(AuthError::MissingAuthHeader))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{HeaderValue, StatusCode};

    #[test]
    fn test_authorization_header_present() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            HeaderValue::from_static("Bearer eyJhbGciOiJIUzI1NiJ9.test"),
        );

        assert_eq!(
            authorization_header(&headers).unwrap(),
            Some("Bearer eyJhbGciOiJIUzI1NiJ9.test")
        );
    }

    #[test]
    fn test_authorization_header_absent() {
        let headers = HeaderMap::new();
        assert_eq!(authorization_header(&headers).unwrap(), None);
    }

    #[test]
    fn test_authorization_header_not_text() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            HeaderValue::from_bytes(b"Bearer \xff\xfe").unwrap(),
        );

        let err = authorization_header(&headers).unwrap_err();
        assert_eq!(err.status, StatusCode::UNAUTHORIZED);
        assert!(err.message().starts_with("invalid authorization format"));
    }

    #[tokio::test]
    async fn test_extractor_without_claims() {
        let (mut parts, _) = axum::http::Request::new(()).into_parts();

        let err = AuthenticatedUser::from_request_parts(&mut parts, &())
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_extractor_with_claims() {
        let (mut parts, _) = axum::http::Request::new(()).into_parts();
        let claims = JwtClaims {
            sub: "1".to_string(),
            username: "admin".to_string(),
            iat: 1_700_000_000,
            exp: 1_700_086_400,
            iss: "user-service".to_string(),
        };
        parts.extensions.insert(claims.clone());

        let AuthenticatedUser(found) = AuthenticatedUser::from_request_parts(&mut parts, &())
            .await
            .unwrap();
        assert_eq!(found, claims);
    }
}
