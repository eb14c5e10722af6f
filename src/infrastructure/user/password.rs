//! Password hashing utilities using bcrypt and Argon2

use std::fmt::Debug;
use std::sync::Arc;

use argon2::{
    password_hash::{
        rand_core::OsRng, PasswordHash, PasswordHasher as Argon2PasswordHasher, PasswordVerifier,
        SaltString,
    },
    Argon2,
};

use crate::config::PasswordScheme;
use crate::domain::DomainError;

const BCRYPT_MIN_COST: u32 = 4;
const BCRYPT_MAX_COST: u32 = 31;

/// bcrypt only reads this many bytes of input
pub const BCRYPT_MAX_PASSWORD_BYTES: usize = 72;

/// Trait for password hashing operations
pub trait PasswordHasher: Send + Sync + Debug {
    /// Hash a password with a fresh random salt
    fn hash(&self, password: &str) -> Result<String, DomainError>;

    /// Verify a password against a hash. Malformed or foreign-format hashes
    /// verify as `false`.
    fn verify(&self, password: &str, hash: &str) -> bool;
}

/// Bcrypt-based password hasher producing `$2b$<cost>$...` strings
#[derive(Debug, Clone)]
pub struct BcryptHasher {
    cost: u32,
}

impl BcryptHasher {
    /// Create a hasher with the default work factor (12)
    pub fn new() -> Self {
        Self {
            cost: bcrypt::DEFAULT_COST,
        }
    }

    /// Create a hasher with an explicit work factor
    pub fn with_cost(cost: u32) -> Result<Self, DomainError> {
        if !(BCRYPT_MIN_COST..=BCRYPT_MAX_COST).contains(&cost) {
            return Err(DomainError::configuration(format!(
                "bcrypt cost must be between {} and {}, got {}",
                BCRYPT_MIN_COST, BCRYPT_MAX_COST, cost
            )));
        }

        Ok(Self { cost })
    }

    pub fn cost(&self) -> u32 {
        self.cost
    }
}

impl Default for BcryptHasher {
    fn default() -> Self {
        Self::new()
    }
}

impl PasswordHasher for BcryptHasher {
    fn hash(&self, password: &str) -> Result<String, DomainError> {
        if password.len() > BCRYPT_MAX_PASSWORD_BYTES {
            return Err(DomainError::validation(format!(
                "password must be at most {} bytes",
                BCRYPT_MAX_PASSWORD_BYTES
            )));
        }

        bcrypt::hash(password, self.cost)
            .map_err(|e| DomainError::internal(format!("Failed to hash password: {}", e)))
    }

    fn verify(&self, password: &str, hash: &str) -> bool {
        // Longer input would be truncated and match on its prefix
        if password.len() > BCRYPT_MAX_PASSWORD_BYTES {
            return false;
        }

        bcrypt::verify(password, hash).unwrap_or(false)
    }
}

/// Argon2-based password hasher
#[derive(Debug, Clone, Default)]
pub struct Argon2Hasher;

impl Argon2Hasher {
    /// Create a new Argon2 hasher
    pub fn new() -> Self {
        Self
    }
}

impl PasswordHasher for Argon2Hasher {
    fn hash(&self, password: &str) -> Result<String, DomainError> {
        let salt = SaltString::generate(&mut OsRng);
        let argon2 = Argon2::default();

        argon2
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| DomainError::internal(format!("Failed to hash password: {}", e)))
    }

    fn verify(&self, password: &str, hash: &str) -> bool {
        let parsed_hash = match PasswordHash::new(hash) {
            Ok(h) => h,
            Err(_) => return false,
        };

        Argon2::default()
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok()
    }
}

/// Build the hasher selected by configuration
pub fn create_password_hasher(
    scheme: PasswordScheme,
    bcrypt_cost: u32,
) -> Result<Arc<dyn PasswordHasher>, DomainError> {
    match scheme {
        PasswordScheme::Bcrypt => Ok(Arc::new(BcryptHasher::with_cost(bcrypt_cost)?)),
        PasswordScheme::Argon2 => Ok(Arc::new(Argon2Hasher::new())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fast_bcrypt() -> BcryptHasher {
        BcryptHasher::with_cost(BCRYPT_MIN_COST).unwrap()
    }

    #[test]
    fn test_hash_and_verify() {
        let hasher = fast_bcrypt();
        let password = "admin123";

        let hash = hasher.hash(password).unwrap();

        assert!(hasher.verify(password, &hash));
        assert!(!hasher.verify("wrong", &hash));
    }

    #[test]
    fn test_hash_is_unique() {
        let hasher = fast_bcrypt();
        let password = "my_secure_password";

        let hash1 = hasher.hash(password).unwrap();
        let hash2 = hasher.hash(password).unwrap();

        // Hashes should be different due to random salt
        assert_ne!(hash1, hash2);

        // But both should verify correctly
        assert!(hasher.verify(password, &hash1));
        assert!(hasher.verify(password, &hash2));
    }

    #[test]
    fn test_different_passwords_do_not_cross_verify() {
        let hasher = fast_bcrypt();
        let passwords = ["password1", "password2", "Password1", "password1 ", ""];

        for (i, p) in passwords.iter().enumerate() {
            let hash = hasher.hash(p).unwrap();
            for (j, other) in passwords.iter().enumerate() {
                assert_eq!(hasher.verify(other, &hash), i == j, "{:?} vs {:?}", other, p);
            }
        }
    }

    #[test]
    fn test_default_cost_is_embedded() {
        let hasher = BcryptHasher::new();
        assert_eq!(hasher.cost(), 12);

        let hash = hasher.hash("admin123").unwrap();
        assert!(hash.starts_with("$2b$12$"));
        assert!(hasher.verify("admin123", &hash));
    }

    #[test]
    fn test_verify_invalid_hash() {
        let hasher = fast_bcrypt();

        assert!(!hasher.verify("password", "invalid_hash_format"));
        assert!(!hasher.verify("password", ""));
        assert!(!hasher.verify("password", "$2b$12$short"));
    }

    #[test]
    fn test_foreign_format_is_rejected_not_raised() {
        let argon_hash = Argon2Hasher::new().hash("password").unwrap();
        let bcrypt_hash = fast_bcrypt().hash("password").unwrap();

        assert!(!fast_bcrypt().verify("password", &argon_hash));
        assert!(!Argon2Hasher::new().verify("password", &bcrypt_hash));
    }

    #[test]
    fn test_bcrypt_rejects_long_passwords() {
        let hasher = fast_bcrypt();
        let limit = "a".repeat(BCRYPT_MAX_PASSWORD_BYTES);
        let longer = format!("{}b", limit);

        let err = hasher.hash(&longer).unwrap_err();
        assert!(matches!(err, DomainError::Validation { .. }));

        // A password sharing the first 72 bytes must not verify
        let hash = hasher.hash(&limit).unwrap();
        assert!(hasher.verify(&limit, &hash));
        assert!(!hasher.verify(&longer, &hash));
    }

    #[test]
    fn test_argon2_accepts_long_passwords() {
        let hasher = Argon2Hasher::new();
        let long = "a".repeat(100);

        let hash = hasher.hash(&long).unwrap();
        assert!(hasher.verify(&long, &hash));
        assert!(!hasher.verify(&long[..72], &hash));
    }

    #[test]
    fn test_invalid_cost() {
        assert!(BcryptHasher::with_cost(3).is_err());
        assert!(BcryptHasher::with_cost(32).is_err());
        assert!(BcryptHasher::with_cost(4).is_ok());
    }

    #[test]
    fn test_argon2_hash_and_verify() {
        let hasher = Argon2Hasher::new();

        let hash = hasher.hash("my_secure_password").unwrap();
        assert!(hash.starts_with("$argon2"));
        assert!(hasher.verify("my_secure_password", &hash));
        assert!(!hasher.verify("wrong_password", &hash));
    }

    #[test]
    fn test_create_password_hasher() {
        let bcrypt = create_password_hasher(PasswordScheme::Bcrypt, 4).unwrap();
        assert!(bcrypt.hash("pw").unwrap().starts_with("$2b$04$"));

        let argon = create_password_hasher(PasswordScheme::Argon2, 12).unwrap();
        assert!(argon.hash("pw").unwrap().starts_with("$argon2"));

        assert!(create_password_hasher(PasswordScheme::Bcrypt, 99).is_err());
    }
}
