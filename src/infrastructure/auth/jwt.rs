//! JWT token issuance and verification

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::Deserialize;
use serde_json::{Number, Value};
use std::fmt::Debug;
use tracing::debug;

use crate::config::AuthConfig;
use crate::domain::auth::{AuthError, JwtClaims};
use crate::domain::user::UserId;
use crate::domain::DomainError;

/// Signing configuration shared by issuance and verification
///
/// Built once at startup; a missing secret, a non-HMAC algorithm or a zero
/// lifetime is rejected here rather than on the request path.
#[derive(Clone)]
pub struct JwtConfig {
    secret: String,
    algorithm: Algorithm,
    expiration_hours: u64,
}

impl Debug for JwtConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtConfig")
            .field("secret", &"[hidden]")
            .field("algorithm", &self.algorithm)
            .field("expiration_hours", &self.expiration_hours)
            .finish()
    }
}

impl JwtConfig {
    /// Create an HS256 configuration
    pub fn new(secret: impl Into<String>, expiration_hours: u64) -> Result<Self, DomainError> {
        let secret = secret.into();

        if secret.trim().is_empty() {
            return Err(DomainError::configuration(
                "JWT secret must be set (auth.jwt_secret or JWT_SECRET_KEY)",
            ));
        }

        if expiration_hours == 0 {
            return Err(DomainError::configuration(
                "JWT expiration must be at least one hour",
            ));
        }

        Ok(Self {
            secret,
            algorithm: Algorithm::HS256,
            expiration_hours,
        })
    }

    /// Replace the signing algorithm; only HMAC algorithms fit a shared secret
    pub fn with_algorithm(mut self, algorithm: Algorithm) -> Result<Self, DomainError> {
        if !matches!(
            algorithm,
            Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512
        ) {
            return Err(DomainError::configuration(format!(
                "Unsupported JWT algorithm {:?}. Use HS256, HS384 or HS512.",
                algorithm
            )));
        }

        self.algorithm = algorithm;
        Ok(self)
    }

    /// Build from the `auth` configuration section
    pub fn from_auth_config(auth: &AuthConfig) -> Result<Self, DomainError> {
        let secret = auth.jwt_secret.clone().unwrap_or_default();
        let algorithm = parse_algorithm(&auth.jwt_algorithm)?;

        Self::new(secret, u64::from(auth.jwt_expiration_hours))?.with_algorithm(algorithm)
    }

    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    pub fn expiration_hours(&self) -> u64 {
        self.expiration_hours
    }

    pub fn lifetime(&self) -> Duration {
        Duration::hours(self.expiration_hours as i64)
    }
}

/// Parse an algorithm name from configuration
pub fn parse_algorithm(name: &str) -> Result<Algorithm, DomainError> {
    match name.trim().to_ascii_uppercase().as_str() {
        "HS256" => Ok(Algorithm::HS256),
        "HS384" => Ok(Algorithm::HS384),
        "HS512" => Ok(Algorithm::HS512),
        other => Err(DomainError::configuration(format!(
            "Unsupported JWT algorithm: {}. Use HS256, HS384 or HS512.",
            other
        ))),
    }
}

/// A signed token and the claims it carries
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub claims: JwtClaims,
}

/// Trait for token operations
pub trait TokenService: Send + Sync + Debug {
    /// Issue a signed token for a user
    fn issue(&self, user_id: UserId, username: &str) -> Result<IssuedToken, DomainError>;

    /// Verify a token and return its claims
    fn verify(&self, token: &str) -> Result<JwtClaims, AuthError>;
}

/// Claims as they arrive, before presence checks
///
/// Dates are kept as JSON numbers since a NumericDate may be fractional.
#[derive(Debug, Deserialize)]
struct UncheckedClaims {
    sub: Option<String>,
    username: Option<String>,
    iat: Option<Number>,
    exp: Option<Number>,
    nbf: Option<Number>,
    aud: Option<Value>,
    iss: Option<String>,
}

/// Whole seconds of a NumericDate, rounded down
fn numeric_date(value: &Number) -> Option<i64> {
    value
        .as_i64()
        .or_else(|| value.as_f64().map(|secs| secs.floor() as i64))
}

/// Whether an `aud` claim names any audience
fn names_audience(aud: &Value) -> bool {
    match aud {
        Value::Null => false,
        Value::String(s) => !s.is_empty(),
        Value::Array(items) => !items.is_empty(),
        _ => true,
    }
}

/// JWT service implementation using a shared HMAC secret
#[derive(Clone)]
pub struct JwtService {
    config: JwtConfig,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl Debug for JwtService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtService")
            .field("config", &self.config)
            .field("encoding_key", &"[hidden]")
            .field("decoding_key", &"[hidden]")
            .finish()
    }
}

impl JwtService {
    /// Create a new JWT service with the given configuration
    pub fn new(config: JwtConfig) -> Self {
        let encoding_key = EncodingKey::from_secret(config.secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(config.secret.as_bytes());

        // The library only checks the signature and algorithm; time and
        // audience claims are checked in verify_at against an explicit
        // clock, with no leeway.
        let mut validation = Validation::new(config.algorithm);
        validation.validate_exp = false;
        validation.validate_nbf = false;
        validation.validate_aud = false;
        validation.leeway = 0;
        validation.required_spec_claims.clear();

        Self {
            config,
            encoding_key,
            decoding_key,
            validation,
        }
    }

    /// Issue a token as of `now`
    pub fn issue_at(
        &self,
        user_id: UserId,
        username: &str,
        now: DateTime<Utc>,
    ) -> Result<IssuedToken, DomainError> {
        let claims = JwtClaims::new(user_id, username, now, self.config.lifetime());

        let token = encode(&Header::new(self.config.algorithm), &claims, &self.encoding_key)
            .map_err(|e| DomainError::internal(format!("Failed to generate JWT: {}", e)))?;

        Ok(IssuedToken { token, claims })
    }

    /// Verify a token as of `now`
    ///
    /// Checks run in order: structure and signature, audience, required
    /// claims (`sub`, `iat`, `exp`), not-before, then expiry (`now` strictly
    /// before `exp`). No audience is configured, so a token naming one is
    /// refused.
    pub fn verify_at(&self, token: &str, now: DateTime<Utc>) -> Result<JwtClaims, AuthError> {
        let token_data = decode::<UncheckedClaims>(token, &self.decoding_key, &self.validation)
            .map_err(|e| {
                debug!(error = %e, "JWT rejected by decoder");
                match e.kind() {
                    ErrorKind::InvalidSignature => AuthError::BadSignature,
                    _ => AuthError::MalformedToken,
                }
            })?;

        let unchecked = token_data.claims;

        if unchecked.aud.as_ref().is_some_and(names_audience) {
            debug!("JWT carries an audience");
            return Err(AuthError::MalformedToken);
        }

        let sub = unchecked.sub.filter(|s| !s.is_empty());
        let iat = unchecked.iat.as_ref().and_then(numeric_date);
        let exp = unchecked.exp.as_ref().and_then(numeric_date);

        let (Some(sub), Some(iat), Some(exp)) = (sub, iat, exp) else {
            return Err(AuthError::MissingClaims);
        };

        if let Some(nbf) = unchecked.nbf.as_ref().and_then(numeric_date) {
            if nbf > now.timestamp() {
                debug!(nbf, "JWT not yet valid");
                return Err(AuthError::MalformedToken);
            }
        }

        let claims = JwtClaims {
            sub,
            username: unchecked.username.unwrap_or_default(),
            iat,
            exp,
            iss: unchecked.iss.unwrap_or_default(),
        };

        if claims.is_expired_at(now) {
            return Err(AuthError::Expired);
        }

        Ok(claims)
    }
}

impl TokenService for JwtService {
    fn issue(&self, user_id: UserId, username: &str) -> Result<IssuedToken, DomainError> {
        self.issue_at(user_id, username, Utc::now())
    }

    fn verify(&self, token: &str) -> Result<JwtClaims, AuthError> {
        self.verify_at(token, Utc::now())
    }
}
