//! Authentication API endpoints
//!
//! Provides login and token introspection for JWT-based authentication.

use axum::{
    extract::{Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::api::middleware::authorization_header;
use crate::api::state::AppState;
use crate::api::types::{ApiError, Json};
use crate::domain::auth::JwtClaims;
use crate::domain::user::User;

/// Create the authentication router
pub fn create_auth_router() -> Router<AppState> {
    Router::new()
        .route("/login", post(login))
        .route("/verify", get(verify))
}

/// Login request
///
/// Missing fields deserialize as empty and are rejected by the handler.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

/// Login response
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub message: String,
    pub token: String,
    pub user: UserResponse,
    pub expires_at: String,
}

/// User response (safe to expose)
#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: i64,
    pub username: String,
    pub email: String,
}

impl UserResponse {
    fn from_user(user: &User) -> Self {
        Self {
            id: user.id().as_i64(),
            username: user.username().to_string(),
            email: user.email().to_string(),
        }
    }
}

/// Login with username and password
///
/// POST /login
///
/// Returns a JWT token on successful authentication.
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    if request.username.is_empty() || request.password.is_empty() {
        return Err(ApiError::bad_request("username and password required"));
    }

    let outcome = state
        .auth_service
        .login(&request.username, &request.password)
        .await?;

    Ok(Json(LoginResponse {
        message: "Login successful".to_string(),
        token: outcome.token,
        user: UserResponse::from_user(&outcome.user),
        expires_at: outcome.expires_at.to_rfc3339(),
    }))
}

/// Query parameters for token introspection
#[derive(Debug, Default, Deserialize)]
pub struct VerifyQuery {
    pub token: Option<String>,
}

/// Verified token contents
#[derive(Debug, Serialize)]
pub struct TokenPayload {
    pub user_id: String,
    pub username: String,
    pub issued_at: Option<DateTime<Utc>>,
    pub expires_at: Option<DateTime<Utc>>,
}

impl From<JwtClaims> for TokenPayload {
    fn from(claims: JwtClaims) -> Self {
        Self {
            issued_at: claims.issued_at(),
            expires_at: claims.expires_at(),
            user_id: claims.sub,
            username: claims.username,
        }
    }
}

/// Introspection response, `payload` on success and `error` otherwise
#[derive(Debug, Serialize)]
pub struct VerifyResponse {
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payload: Option<TokenPayload>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Verify a token
///
/// GET /verify?token=<jwt> or with `Authorization: Bearer <jwt>`
pub async fn verify(
    State(state): State<AppState>,
    Query(query): Query<VerifyQuery>,
    headers: HeaderMap,
) -> Response {
    let header = authorization_header(&headers).ok().flatten();

    match state
        .auth_service
        .verify_request(query.token.as_deref(), header)
    {
        Ok(claims) => (
            StatusCode::OK,
            Json(VerifyResponse {
                valid: true,
                payload: Some(claims.into()),
                error: None,
            }),
        )
            .into_response(),
        Err(e) => {
            let message = e.to_string();
            let status = ApiError::from(e).status;

            (
                status,
                Json(VerifyResponse {
                    valid: false,
                    payload: None,
                    error: Some(message),
                }),
            )
                .into_response()
        }
    }
}
