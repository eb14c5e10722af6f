//! User listing endpoint (behind the access gate)

use axum::extract::State;
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::api::middleware::AuthenticatedUser;
use crate::api::state::AppState;
use crate::api::types::{ApiError, Json};
use crate::domain::user::User;

#[derive(Debug, Serialize)]
pub struct UserSummary {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

impl From<&User> for UserSummary {
    fn from(user: &User) -> Self {
        Self {
            id: user.id().as_i64(),
            username: user.username().to_string(),
            email: user.email().to_string(),
            created_at: user.created_at(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct UsersResponse {
    pub users: Vec<UserSummary>,
    pub total: usize,
    pub requested_by: String,
}

/// GET /users
pub async fn list_users(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> Result<Json<UsersResponse>, ApiError> {
    let users = state.user_service.list().await?;
    let users: Vec<UserSummary> = users.iter().map(UserSummary::from).collect();

    Ok(Json(UsersResponse {
        total: users.len(),
        users,
        requested_by: claims.username,
    }))
}
