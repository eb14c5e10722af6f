use thiserror::Error;

use crate::domain::DomainError;

/// Authentication failures
///
/// The `Display` text is the client-visible message. Credential failures share
/// one message so a caller cannot tell an unknown username from a wrong
/// password; token failures other than expiry share "invalid token" so the
/// failing check is not revealed.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("invalid credentials")]
    UserNotFound,

    #[error("invalid credentials")]
    WrongPassword,

    #[error("invalid token")]
    MalformedToken,

    #[error("invalid token")]
    BadSignature,

    #[error("invalid token")]
    MissingClaims,

    #[error("token has expired")]
    Expired,

    #[error("authorization header required")]
    MissingAuthHeader,

    #[error("invalid authorization format. Use: Bearer <token>")]
    MalformedAuthHeader,

    #[error("no token provided. Use ?token=<jwt> or Authorization header")]
    MissingToken,

    #[error("internal error")]
    Store(#[from] DomainError),
}

impl AuthError {
    /// True for the two login failures that collapse into "invalid credentials"
    pub fn is_credential_failure(&self) -> bool {
        matches!(self, Self::UserNotFound | Self::WrongPassword)
    }

    /// True for token verification failures (including expiry)
    pub fn is_token_failure(&self) -> bool {
        matches!(
            self,
            Self::MalformedToken | Self::BadSignature | Self::MissingClaims | Self::Expired
        )
    }

    /// Short machine-readable name, for logs only
    pub fn kind(&self) -> &'static str {
        match self {
            Self::UserNotFound => "user_not_found",
            Self::WrongPassword => "wrong_password",
            Self::MalformedToken => "malformed_token",
            Self::BadSignature => "bad_signature",
            Self::MissingClaims => "missing_claims",
            Self::Expired => "expired",
            Self::MissingAuthHeader => "missing_auth_header",
            Self::MalformedAuthHeader => "malformed_auth_header",
            Self::MissingToken => "missing_token",
            Self::Store(_) => "store",
        }
    }
}
