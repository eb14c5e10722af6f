//! Authentication domain
//!
//! Token claims and the authentication error taxonomy shared by the token
//! service, the login flow and the access gate.

mod claims;
mod error;

pub use claims::{JwtClaims, TOKEN_ISSUER};
pub use error::AuthError;
