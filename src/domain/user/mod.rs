//! User domain
//!
//! This module provides domain types and traits for the credential store:
//! user records, provisioning validation, and the repository trait.

mod entity;
mod repository;
mod validation;

pub use entity::{NewUser, User, UserId};
pub use repository::UserRepository;
pub use validation::{validate_email, validate_username, UserValidationError};

#[cfg(test)]
pub use repository::MockUserRepository;
