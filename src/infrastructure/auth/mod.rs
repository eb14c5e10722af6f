//! Authentication infrastructure module
//!
//! This module provides JWT issuance and verification, bearer header parsing
//! for the access gate, and the login flow.

mod gate;
mod jwt;
mod service;

pub use gate::{gate, parse_bearer, verify_request};
pub use jwt::{parse_algorithm, IssuedToken, JwtConfig, JwtService, TokenService};
pub use service::{AuthService, LoginOutcome};
