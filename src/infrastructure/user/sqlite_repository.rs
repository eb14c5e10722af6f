//! SQLite user repository implementation

use std::path::Path;
use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::Row;
use tracing::{debug, info};

use crate::domain::user::{NewUser, User, UserId, UserRepository};
use crate::domain::DomainError;

const CREATE_USERS_TABLE: &str = r#"
    CREATE TABLE IF NOT EXISTS users (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        username TEXT UNIQUE NOT NULL,
        email TEXT UNIQUE NOT NULL,
        password_hash TEXT NOT NULL,
        created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
    )
"#;

/// SQLite implementation of UserRepository
///
/// Every query borrows a connection from the pool; the connection returns to
/// the pool when the query future completes or is dropped.
#[derive(Debug, Clone)]
pub struct SqliteUserRepository {
    pool: SqlitePool,
}

impl SqliteUserRepository {
    /// Create a new repository with the given connection pool
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Open (creating if needed) the database file at `path`
    pub async fn connect(path: &str, max_connections: u32) -> Result<Self, DomainError> {
        if let Some(dir) = Path::new(path).parent().filter(|d| !d.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(dir).await.map_err(|e| {
                DomainError::storage(format!(
                    "Failed to create database directory '{}': {}",
                    dir.display(),
                    e
                ))
            })?;
        }

        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections.max(1))
            .connect_with(options)
            .await
            .map_err(|e| {
                DomainError::storage(format!("Failed to open database '{}': {}", path, e))
            })?;

        info!(path = %path, "SQLite user store opened");
        Ok(Self::new(pool))
    }

    /// Open a private in-memory database on a single long-lived connection
    pub async fn in_memory() -> Result<Self, DomainError> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")
            .map_err(|e| DomainError::storage(format!("Invalid SQLite options: {}", e)))?;

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await
            .map_err(|e| {
                DomainError::storage(format!("Failed to open in-memory database: {}", e))
            })?;

        Ok(Self::new(pool))
    }

    /// Create the users table if it does not exist
    pub async fn migrate(&self) -> Result<(), DomainError> {
        sqlx::query(CREATE_USERS_TABLE)
            .execute(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to create users table: {}", e)))?;

        debug!("users table ready");
        Ok(())
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

#[async_trait]
impl UserRepository for SqliteUserRepository {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, DomainError> {
        let row = sqlx::query(
            r#"
            SELECT id, username, email, password_hash, created_at
            FROM users
            WHERE username = ?
            "#,
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to get user by username: {}", e)))?;

        row.as_ref().map(row_to_user).transpose()
    }

    async fn create(&self, user: NewUser) -> Result<User, DomainError> {
        let created_at = Utc::now();

        let result = sqlx::query(
            r#"
            INSERT INTO users (username, email, password_hash, created_at)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(created_at.to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            let unique_violation = e
                .as_database_error()
                .is_some_and(|db| db.is_unique_violation());

            if !unique_violation {
                return DomainError::storage(format!("Failed to create user: {}", e));
            }

            if e.to_string().contains("username") {
                DomainError::conflict(format!("Username '{}' already exists", user.username))
            } else {
                DomainError::conflict(format!("Email '{}' already exists", user.email))
            }
        })?;

        let id = UserId::new(result.last_insert_rowid());
        Ok(user.into_user(id, created_at))
    }

    async fn list(&self) -> Result<Vec<User>, DomainError> {
        let rows = sqlx::query(
            r#"
            SELECT id, username, email, password_hash, created_at
            FROM users
            ORDER BY id
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to list users: {}", e)))?;

        rows.iter().map(row_to_user).collect()
    }

    async fn count(&self) -> Result<usize, DomainError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to count users: {}", e)))?;

        Ok(count as usize)
    }
}

fn row_to_user(row: &SqliteRow) -> Result<User, DomainError> {
    let get_err = |field: &str, e: sqlx::Error| {
        DomainError::storage(format!("Failed to read column '{}': {}", field, e))
    };

    let id: i64 = row.try_get("id").map_err(|e| get_err("id", e))?;
    let username: String = row.try_get("username").map_err(|e| get_err("username", e))?;
    let email: String = row.try_get("email").map_err(|e| get_err("email", e))?;
    let password_hash: String = row
        .try_get("password_hash")
        .map_err(|e| get_err("password_hash", e))?;
    let created_at: Option<String> = row
        .try_get("created_at")
        .map_err(|e| get_err("created_at", e))?;

    let created_at = match created_at {
        Some(raw) => parse_timestamp(&raw).ok_or_else(|| {
            DomainError::storage(format!("Invalid created_at '{}' for user {}", raw, id))
        })?,
        None => DateTime::<Utc>::UNIX_EPOCH,
    };

    Ok(User::new(
        UserId::new(id),
        username,
        email,
        password_hash,
        created_at,
    ))
}

/// Accept both RFC 3339 (rows written by this service) and SQLite's
/// `CURRENT_TIMESTAMP` format (rows provisioned externally).
fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }

    NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc())
}
