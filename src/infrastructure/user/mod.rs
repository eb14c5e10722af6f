//! User infrastructure module
//!
//! This module provides the credential store implementations (in-memory and
//! SQLite), password hashing with bcrypt or Argon2, and the user service.

mod password;
mod repository;
mod service;
mod sqlite_repository;

pub use password::{create_password_hasher, Argon2Hasher, BcryptHasher, PasswordHasher};
pub use repository::InMemoryUserRepository;
pub use service::{CreateUserRequest, UserService};
pub use sqlite_repository::SqliteUserRepository;
