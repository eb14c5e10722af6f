//! API middleware components

pub mod logging;
pub mod security;
pub mod user_auth;

pub use logging::{logging_middleware, redact_uri};
pub use security::security_headers_middleware;
pub use user_auth::{authorization_header, require_jwt, AuthenticatedUser};
