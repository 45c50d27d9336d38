//! Password hashing using Argon2id.
//!
//! Hashes are stored as PHC strings, so the cost parameters travel with the
//! hash and verification works across configuration changes. Both operations
//! are CPU-bound and run on Tokio's blocking pool.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher as _, PasswordVerifier, SaltString},
    Algorithm, Argon2, Params, Version,
};

use crate::config::PasswordConfig;

/// Error type for password hashing operations
#[derive(Debug, thiserror::Error)]
pub enum PasswordError {
    /// Failed to hash password
    #[error("Failed to hash password: {0}")]
    HashError(String),

    /// The blocking task running the hash was cancelled or panicked
    #[error("Password task failed: {0}")]
    TaskFailed(String),
}

/// Argon2id hasher configured from `[passwords]`.
#[derive(Debug, Clone)]
pub struct PasswordHasher {
    params: Params,
}

impl PasswordHasher {
    pub fn new(cfg: &PasswordConfig) -> Result<Self, PasswordError> {
        let params = Params::new(cfg.memory_kib, cfg.iterations, cfg.parallelism, None)
            .map_err(|e| PasswordError::HashError(format!("Invalid parameters: {}", e)))?;
        Ok(Self { params })
    }

    fn argon2(&self) -> Argon2<'static> {
        Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone())
    }

    /// Hashes `password` with a fresh random salt.
    pub fn hash_blocking(&self, password: &str) -> Result<String, PasswordError> {
        let salt = SaltString::generate(&mut OsRng);
        self.argon2()
            .hash_password(password.as_bytes(), &salt)
            .map(|h| h.to_string())
            .map_err(|e| PasswordError::HashError(e.to_string()))
    }

    /// Checks `password` against a stored PHC string. A malformed hash never matches.
    pub fn verify_blocking(&self, password: &str, hash: &str) -> bool {
        let parsed = match PasswordHash::new(hash) {
            Ok(p) => p,
            Err(e) => {
                tracing::warn!("Stored password hash is not a valid PHC string: {}", e);
                return false;
            }
        };
        self.argon2().verify_password(password.as_bytes(), &parsed).is_ok()
    }

    pub async fn hash(&self, password: &str) -> Result<String, PasswordError> {
        let hasher = self.clone();
        let password = password.to_owned();
        tokio::task::spawn_blocking(move || hasher.hash_blocking(&password))
            .await
            .map_err(|e| PasswordError::TaskFailed(e.to_string()))?
    }

    pub async fn verify(&self, password: &str, hash: &str) -> Result<bool, PasswordError> {
        let hasher = self.clone();
        let password = password.to_owned();
        let hash = hash.to_owned();
        tokio::task::spawn_blocking(move || hasher.verify_blocking(&password, &hash))
            .await
            .map_err(|e| PasswordError::TaskFailed(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cheap() -> PasswordHasher {
        PasswordHasher::new(&PasswordConfig { memory_kib: 1024, iterations: 1, parallelism: 1 }).unwrap()
    }

    #[test]
    fn test_hash_and_verify() {
        let hasher = cheap();
        let hash = hasher.hash_blocking("s3cret").unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(hasher.verify_blocking("s3cret", &hash));
        assert!(!hasher.verify_blocking("wrong", &hash));
    }

    #[test]
    fn test_same_password_different_salt() {
        let hasher = cheap();
        let a = hasher.hash_blocking("repeat").unwrap();
        let b = hasher.hash_blocking("repeat").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_malformed_hash_does_not_verify() {
        let hasher = cheap();
        assert!(!hasher.verify_blocking("anything", "not-a-phc-string"));
        assert!(!hasher.verify_blocking("anything", ""));
    }

    #[test]
    fn test_invalid_params_rejected() {
        let res = PasswordHasher::new(&PasswordConfig { memory_kib: 1, iterations: 1, parallelism: 1 });
        assert!(res.is_err());
    }

    #[tokio::test]
    async fn test_async_roundtrip() {
        let hasher = cheap();
        let hash = hasher.hash("card-pass").await.unwrap();
        assert!(hasher.verify("card-pass", &hash).await.unwrap());
    }
}
