//! Password hashing and verification using Argon2id

use crate::{config::SecurityConfig, error::AppError};
use argon2::{
    password_hash::{
        rand_core::OsRng, PasswordHash, PasswordHasher as _, PasswordVerifier, SaltString,
    },
    Algorithm, Argon2, Params, Version,
};

/// Password hasher with configurable cost parameters
#[derive(Clone)]
pub struct PasswordHasher {
    argon2: Argon2<'static>,
    min_length: usize,
}

impl PasswordHasher {
    /// Create hasher with the argon2 crate defaults (m=19MiB, t=2, p=1)
    pub fn new() -> Self {
        Self {
            argon2: Argon2::new(Algorithm::Argon2id, Version::V0x13, Params::default()),
            min_length: 8,
        }
    }

    /// Create hasher with cost parameters and policy from config
    pub fn from_config(config: &SecurityConfig) -> Result<Self, AppError> {
        let params = Params::new(
            config.hash_memory_kib,
            config.hash_iterations,
            config.hash_parallelism,
            None,
        )
        .map_err(|e| AppError::Config(format!("Invalid Argon2 params: {}", e)))?;

        Ok(Self {
            argon2: Argon2::new(Algorithm::Argon2id, Version::V0x13, params),
            min_length: config.password_min_length,
        })
    }

    /// Hash a password with a fresh random salt
    pub fn hash(&self, password: &str) -> Result<String, AppError> {
        let salt = SaltString::generate(&mut OsRng);

        let password_hash = self
            .argon2
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| {
                tracing::error!("Failed to hash password: {:?}", e);
                AppError::internal_error("failed to hash password")
            })?
            .to_string();

        Ok(password_hash)
    }

    /// Verify a password against a stored hash.
    ///
    /// A malformed hash and a wrong password both yield `false`.
    pub fn verify(&self, password: &str, hash: &str) -> bool {
        let parsed_hash = match PasswordHash::new(hash) {
            Ok(parsed) => parsed,
            Err(e) => {
                tracing::debug!("Failed to parse password hash: {:?}", e);
                return false;
            }
        };

        self.argon2
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok()
    }

    /// Validate password against policy
    pub fn validate_password_policy(&self, password: &str) -> Result<(), AppError> {
        if password.chars().count() < self.min_length {
            return Err(AppError::Validation(format!(
                "Password must be at least {} characters",
                self.min_length
            )));
        }

        Ok(())
    }
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cheap_hasher() -> PasswordHasher {
        PasswordHasher {
            argon2: Argon2::new(
                Algorithm::Argon2id,
                Version::V0x13,
                Params::new(1024, 1, 1, None).unwrap(),
            ),
            min_length: 8,
        }
    }

    #[test]
    fn test_hash_and_verify() {
        let hasher = cheap_hasher();
        let password = "TestPassword123!";

        let hash = hasher.hash(password).unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(hasher.verify(password, &hash));
    }

    #[test]
    fn test_verify_fails_with_wrong_password() {
        let hasher = cheap_hasher();
        let hash = hasher.hash("TestPassword123!").unwrap();
        assert!(!hasher.verify("WrongPassword", &hash));
    }

    #[test]
    fn test_hash_is_different_each_time() {
        let hasher = cheap_hasher();
        let password = "TestPassword123!";

        let hash1 = hasher.hash(password).unwrap();
        let hash2 = hasher.hash(password).unwrap();

        // Hashes should be different due to salt
        assert_ne!(hash1, hash2);

        // But both should verify correctly
        assert!(hasher.verify(password, &hash1));
        assert!(hasher.verify(password, &hash2));
    }

    #[test]
    fn test_malformed_hash_is_denied() {
        let hasher = cheap_hasher();
        assert!(!hasher.verify("TestPassword123!", "not-a-phc-string"));
        assert!(!hasher.verify("TestPassword123!", ""));
    }

    #[test]
    fn test_password_policy_validation() {
        let hasher = cheap_hasher();
        assert!(hasher.validate_password_policy("longenough").is_ok());
        assert!(hasher.validate_password_policy("short").is_err());
    }

    #[test]
    fn test_from_config_rejects_invalid_params() {
        let config = SecurityConfig {
            access_secret: secrecy::Secret::new("a".repeat(32)),
            refresh_secret: secrecy::Secret::new("b".repeat(32)),
            access_token_exp_secs: 3600,
            refresh_token_exp_secs: 2592000,
            password_min_length: 8,
            hash_memory_kib: 1,
            hash_iterations: 1,
            hash_parallelism: 1,
        };

        assert!(matches!(PasswordHasher::from_config(&config), Err(AppError::Config(_))));
    }
}
