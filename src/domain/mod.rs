//! Domain layer - Core business logic and entities

pub mod auth;
pub mod error;
pub mod user;

pub use auth::{AuthError, JwtClaims, TOKEN_ISSUER};
pub use error::DomainError;
pub use user::{NewUser, User, UserId, UserRepository};
