//! Credential store trait

use async_trait::async_trait;

use super::entity::{NewUser, User};
use crate::domain::DomainError;

#[cfg(test)]
use mockall::automock;

/// Repository trait for user records
///
/// Lookups are exact, case-sensitive string matches. A missing user is
/// `Ok(None)`; `Err` is reserved for storage faults.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Get a user by their username (for login)
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, DomainError>;

    /// Provision a new user; the store assigns the id and creation time
    async fn create(&self, user: NewUser) -> Result<User, DomainError>;

    /// List all users ordered by id
    async fn list(&self) -> Result<Vec<User>, DomainError>;

    /// Count stored users
    async fn count(&self) -> Result<usize, DomainError>;

    /// Check if a username exists
    async fn username_exists(&self, username: &str) -> Result<bool, DomainError> {
        Ok(self.find_by_username(username).await?.is_some())
    }
}
