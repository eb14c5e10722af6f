//! Infrastructure layer - credential stores, hashing and token handling

pub mod auth;
pub mod logging;
pub mod user;
