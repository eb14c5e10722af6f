//! Token claim set

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::user::UserId;

/// Fixed issuer identifier placed in every token
pub const TOKEN_ISSUER: &str = "user-service";

/// JWT claims structure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JwtClaims {
    /// Subject (user ID as a string)
    pub sub: String,
    /// Username at issuance time
    pub username: String,
    /// Issued at timestamp (Unix epoch seconds)
    pub iat: i64,
    /// Expiration timestamp (Unix epoch seconds)
    pub exp: i64,
    /// Issuer
    pub iss: String,
}

impl JwtClaims {
    /// Build claims for a user issued at `now`, valid for `lifetime`
    pub fn new(user_id: UserId, username: &str, now: DateTime<Utc>, lifetime: Duration) -> Self {
        let iat = now.timestamp();

        Self {
            sub: user_id.to_string(),
            username: username.to_string(),
            iat,
            exp: iat + lifetime.num_seconds(),
            iss: TOKEN_ISSUER.to_string(),
        }
    }

    /// A token is expired once `now` reaches `exp`
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now.timestamp() >= self.exp
    }

    pub fn issued_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.iat, 0)
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.exp, 0)
    }
}
