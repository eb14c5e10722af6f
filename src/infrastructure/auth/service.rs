//! Login, access gate and token introspection

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{info, warn};

use crate::domain::auth::{AuthError, JwtClaims};
use crate::domain::user::User;
use crate::domain::DomainError;
use crate::infrastructure::user::UserService;

use super::gate;
use super::jwt::TokenService;

/// Result of a successful login
#[derive(Debug, Clone)]
pub struct LoginOutcome {
    pub token: String,
    pub user: User,
    pub expires_at: DateTime<Utc>,
}

/// Authentication entry points used by the HTTP layer
#[derive(Debug, Clone)]
pub struct AuthService {
    users: Arc<UserService>,
    tokens: Arc<dyn TokenService>,
}

impl AuthService {
    pub fn new(users: Arc<UserService>, tokens: Arc<dyn TokenService>) -> Self {
        Self { users, tokens }
    }

    /// Check credentials and issue a token
    pub async fn login(&self, username: &str, password: &str) -> Result<LoginOutcome, AuthError> {
        let user = match self.users.authenticate(username, password).await {
            Ok(user) => user,
            Err(e) => {
                if e.is_credential_failure() {
                    info!(reason = e.kind(), "login failed");
                } else {
                    warn!(error = ?e, "login aborted");
                }
                return Err(e);
            }
        };

        let issued = self.tokens.issue(user.id(), user.username())?;
        let expires_at = issued.claims.expires_at().ok_or_else(|| {
            DomainError::internal(format!("token expiry out of range: {}", issued.claims.exp))
        })?;

        info!(user_id = %user.id(), "login succeeded");

        Ok(LoginOutcome {
            token: issued.token,
            user,
            expires_at,
        })
    }

    /// Admit or reject a request by its `Authorization` header
    pub fn gate(&self, header: Option<&str>) -> Result<JwtClaims, AuthError> {
        gate::gate(header, self.tokens.as_ref())
    }

    /// Verify a token from the `token` query parameter or the bearer header
    pub fn verify_request(
        &self,
        query_token: Option<&str>,
        header: Option<&str>,
    ) -> Result<JwtClaims, AuthError> {
        if query_token.is_some_and(|t| !t.is_empty()) {
            warn!("token supplied in query string; prefer the Authorization header");
        }

        gate::verify_request(query_token, header, self.tokens.as_ref())
    }

    pub fn tokens(&self) -> &Arc<dyn TokenService> {
        &self.tokens
    }
}
