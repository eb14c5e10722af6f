use serde::Deserialize;

/// Application configuration
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub auth: AuthConfig,
    pub database: DatabaseConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Token signing and password hashing settings
///
/// `jwt_secret` has no default: a missing secret is a startup error.
#[derive(Clone, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    pub jwt_secret: Option<String>,
    pub jwt_algorithm: String,
    pub jwt_expiration_hours: u32,
    pub password_scheme: PasswordScheme,
    pub bcrypt_cost: u32,
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("jwt_secret", &self.jwt_secret.as_ref().map(|_| "[hidden]"))
            .field("jwt_algorithm", &self.jwt_algorithm)
            .field("jwt_expiration_hours", &self.jwt_expiration_hours)
            .field("password_scheme", &self.password_scheme)
            .field("bcrypt_cost", &self.bcrypt_cost)
            .finish()
    }
}

/// Password hashing scheme for newly hashed passwords
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PasswordScheme {
    #[default]
    Bcrypt,
    Argon2,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// SQLite database file; `:memory:` selects the in-memory store
    pub path: String,
    pub max_connections: u32,
    /// Seed sample users when the store is empty
    pub seed_sample_users: bool,
}

impl DatabaseConfig {
    pub fn is_in_memory(&self) -> bool {
        self.path == ":memory:"
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::default(),
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: None,
            jwt_algorithm: "HS256".to_string(),
            jwt_expiration_hours: 24,
            password_scheme: PasswordScheme::default(),
            bcrypt_cost: bcrypt::DEFAULT_COST,
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: "data/users.db".to_string(),
            max_connections: 5,
            seed_sample_users: true,
        }
    }
}

impl AppConfig {
    /// Load layered configuration: config files, `APP__*` variables, then the
    /// plain `JWT_SECRET_KEY`, `JWT_EXPIRATION_HOURS` and `DATABASE_PATH`
    /// variables used by existing deployments.
    pub fn load() -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(
                config::Environment::with_prefix("APP")
                    .separator("__")
                    .try_parsing(true),
            )
            .set_override_option("auth.jwt_secret", std::env::var("JWT_SECRET_KEY").ok())?
            .set_override_option(
                "auth.jwt_expiration_hours",
                std::env::var("JWT_EXPIRATION_HOURS").ok(),
            )?
            .set_override_option("database.path", std::env::var("DATABASE_PATH").ok())?
            .build()?;

        config.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();

        assert_eq!(config.server.port, 5000);
        assert_eq!(config.auth.jwt_algorithm, "HS256");
        assert_eq!(config.auth.jwt_expiration_hours, 24);
        assert_eq!(config.auth.bcrypt_cost, 12);
        assert_eq!(config.auth.password_scheme, PasswordScheme::Bcrypt);
        assert!(config.auth.jwt_secret.is_none());
        assert!(!config.database.is_in_memory());
    }

    #[test]
    fn test_partial_deserialization_keeps_defaults() {
        let config: AppConfig = config::Config::builder()
            .set_override("auth.jwt_secret", "s3cret")
            .unwrap()
            .set_override("database.path", ":memory:")
            .unwrap()
            .set_override("logging.format", "json")
            .unwrap()
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(config.auth.jwt_secret.as_deref(), Some("s3cret"));
        assert_eq!(config.auth.jwt_expiration_hours, 24);
        assert!(config.database.is_in_memory());
        assert!(matches!(config.logging.format, LogFormat::Json));
        assert_eq!(config.server.host, "0.0.0.0");
    }

    #[test]
    fn test_debug_hides_secret() {
        let auth = AuthConfig {
            jwt_secret: Some("super-secret".to_string()),
            ..Default::default()
        };

        let debug = format!("{:?}", auth);
        assert!(!debug.contains("super-secret"));
        assert!(debug.contains("[hidden]"));
    }
}
