//! User service for credential checks and provisioning

use std::sync::Arc;

use tracing::debug;

use crate::domain::auth::AuthError;
use crate::domain::user::{NewUser, User, UserRepository};
use crate::domain::DomainError;

use super::password::PasswordHasher;

/// Request for provisioning a new user
#[derive(Debug, Clone)]
pub struct CreateUserRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

/// User service for authentication and provisioning
pub struct UserService {
    repository: Arc<dyn UserRepository>,
    hasher: Arc<dyn PasswordHasher>,
}

impl std::fmt::Debug for UserService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UserService")
            .field("hasher", &self.hasher)
            .finish_non_exhaustive()
    }
}

impl UserService {
    /// Create a new user service
    pub fn new(repository: Arc<dyn UserRepository>, hasher: Arc<dyn PasswordHasher>) -> Self {
        Self { repository, hasher }
    }

    /// Provision a new user, hashing the password
    pub async fn create(&self, request: CreateUserRequest) -> Result<User, DomainError> {
        if self.repository.username_exists(&request.username).await? {
            return Err(DomainError::conflict(format!(
                "Username '{}' already exists",
                request.username
            )));
        }

        let hasher = self.hasher.clone();
        let password = request.password;
        let password_hash = tokio::task::spawn_blocking(move || hasher.hash(&password))
            .await
            .map_err(|e| DomainError::internal(format!("Password hashing task failed: {}", e)))??;

        let user = NewUser::new(request.username, request.email, password_hash)
            .map_err(|e| DomainError::validation(e.to_string()))?;

        self.repository.create(user).await
    }

    /// Check a username/password pair against the credential store
    ///
    /// Unknown users and wrong passwords are distinct variants here; both
    /// render as "invalid credentials" to clients.
    pub async fn authenticate(&self, username: &str, password: &str) -> Result<User, AuthError> {
        let user = match self.repository.find_by_username(username).await? {
            Some(user) => user,
            None => {
                debug!("login rejected: unknown username");
                return Err(AuthError::UserNotFound);
            }
        };

        let hasher = self.hasher.clone();
        let password = password.to_owned();
        let password_hash = user.password_hash().to_owned();

        let matches = tokio::task::spawn_blocking(move || hasher.verify(&password, &password_hash))
            .await
            .map_err(|e| {
                DomainError::internal(format!("Password verification task failed: {}", e))
            })?;

        if !matches {
            debug!(user_id = %user.id(), "login rejected: password mismatch");
            return Err(AuthError::WrongPassword);
        }

        Ok(user)
    }

    /// List all users
    pub async fn list(&self) -> Result<Vec<User>, DomainError> {
        self.repository.list().await
    }

    /// Count users
    pub async fn count(&self) -> Result<usize, DomainError> {
        self.repository.count().await
    }
}
