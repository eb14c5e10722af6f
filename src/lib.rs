//! User Service
//!
//! Identity microservice issuing and verifying JWT bearer tokens:
//! - Credential store backed by SQLite or memory
//! - bcrypt password hashing (Argon2 available)
//! - Token issuance, verification and an access gate for protected routes

pub mod api;
pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::AppConfig;

use std::sync::Arc;

use anyhow::Context;
use api::state::AppState;
use domain::{DomainError, UserRepository};
use infrastructure::{
    auth::{JwtConfig, JwtService},
    user::{
        create_password_hasher, CreateUserRequest, InMemoryUserRepository, SqliteUserRepository,
        UserService,
    },
};
use tracing::{info, warn};

/// Accounts created on an empty store when seeding is enabled
const SAMPLE_USERS: &[(&str, &str, &str)] = &[
    ("admin", "admin@example.com", "admin123"),
    ("user1", "user1@example.com", "password1"),
    ("user2", "user2@example.com", "password2"),
];

/// Create the application state with custom configuration
///
/// Fails when the signing configuration is unusable or the store cannot be
/// opened.
pub async fn create_app_state_with_config(config: &AppConfig) -> anyhow::Result<AppState> {
    let jwt_config =
        JwtConfig::from_auth_config(&config.auth).context("invalid token signing configuration")?;
    info!(
        algorithm = ?jwt_config.algorithm(),
        expiration_hours = jwt_config.expiration_hours(),
        "JWT signing configured"
    );

    let repository = create_user_repository(&config.database).await?;

    let hasher = create_password_hasher(config.auth.password_scheme, config.auth.bcrypt_cost)
        .context("invalid password hashing configuration")?;
    info!(scheme = ?config.auth.password_scheme, "Password hashing configured");

    let user_service = Arc::new(UserService::new(repository, hasher));

    if config.database.seed_sample_users {
        seed_sample_users(&user_service).await?;
    }

    let jwt_service = Arc::new(JwtService::new(jwt_config));

    Ok(AppState::new(user_service, jwt_service))
}

/// Open the credential store selected by `database.path`
pub async fn create_user_repository(
    config: &crate::config::DatabaseConfig,
) -> anyhow::Result<Arc<dyn UserRepository>> {
    if config.is_in_memory() {
        info!("Using in-memory credential store");
        return Ok(Arc::new(InMemoryUserRepository::new()));
    }

    info!(path = %config.path, "Opening SQLite credential store");
    let repository = SqliteUserRepository::connect(&config.path, config.max_connections)
        .await
        .with_context(|| format!("failed to open database at {}", config.path))?;
    repository
        .migrate()
        .await
        .context("failed to prepare users table")?;

    Ok(Arc::new(repository))
}

/// Seed the sample accounts if the store has no users
///
/// Returns the number of users created.
pub async fn seed_sample_users(user_service: &UserService) -> Result<usize, DomainError> {
    if user_service.count().await? > 0 {
        return Ok(0);
    }

    for (username, email, password) in SAMPLE_USERS {
        user_service
            .create(CreateUserRequest {
                username: username.to_string(),
                email: email.to_string(),
                password: password.to_string(),
            })
            .await?;
    }

    warn!(
        users = SAMPLE_USERS.len(),
        "Seeded sample users with well-known passwords; disable database.seed_sample_users in production"
    );

    Ok(SAMPLE_USERS.len())
}
