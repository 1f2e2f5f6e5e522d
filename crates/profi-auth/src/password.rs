//! Password hashing and verification.
//!
//! Passwords are hashed with Argon2id into PHC strings, so the parameters
//! travel with each hash and a cost change does not invalidate existing
//! passwords.
//!
//! # Example
//!
//! ```
//! use profi_auth::config::PasswordConfig;
//! use profi_auth::password::PasswordHasher;
//!
//! let hasher = PasswordHasher::new(&PasswordConfig { cost: 4, iterations: 1, parallelism: 1 })?;
//! let hash = hasher.hash_password("correct horse")?;
//!
//! assert!(hash.starts_with("$argon2id$"));
//! assert!(hasher.verify_password("correct horse", &hash)?);
//! assert!(!hasher.verify_password("battery staple", &hash)?);
//! # Ok::<(), profi_auth::AuthError>(())
//! ```

use argon2::password_hash::{
    self, PasswordHash, PasswordHasher as _, PasswordVerifier as _, SaltString, rand_core::OsRng,
};
use argon2::{Algorithm, Argon2, Params, Version};

use crate::config::PasswordConfig;
use crate::{AuthError, AuthResult};

/// Argon2id hasher configured from [`PasswordConfig`].
#[derive(Debug, Clone)]
pub struct PasswordHasher {
    params: Params,
}

impl PasswordHasher {
    /// Creates a hasher with the given cost.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Configuration` if Argon2 rejects the parameters.
    pub fn new(config: &PasswordConfig) -> AuthResult<Self> {
        let params = Params::new(
            config.memory_kib(),
            config.iterations,
            config.parallelism,
            None,
        )
        .map_err(|e| AuthError::configuration(format!("invalid password cost: {e}")))?;
        Ok(Self { params })
    }

    fn argon2(&self) -> Argon2<'static> {
        Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone())
    }

    /// Hashes a password with a fresh random salt.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::PasswordHash` if hashing fails.
    pub fn hash_password(&self, password: &str) -> AuthResult<String> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = self
            .argon2()
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| AuthError::password_hash(e.to_string()))?;
        Ok(hash.to_string())
    }

    /// Checks a password against a stored PHC hash.
    ///
    /// Returns `Ok(false)` on mismatch.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::PasswordHash` if the stored hash cannot be parsed.
    pub fn verify_password(&self, password: &str, hash: &str) -> AuthResult<bool> {
        let parsed = PasswordHash::new(hash).map_err(|e| AuthError::password_hash(e.to_string()))?;
        match self.argon2().verify_password(password.as_bytes(), &parsed) {
            Ok(()) => Ok(true),
            Err(password_hash::Error::Password) => Ok(false),
            Err(e) => Err(AuthError::password_hash(e.to_string())),
        }
    }

    /// Runs [`hash_password`](Self::hash_password) on the blocking thread pool.
    ///
    /// # Errors
    ///
    /// Same as [`hash_password`](Self::hash_password), plus `AuthError::Internal` if the
    /// blocking task panics.
    pub async fn hash_password_blocking(&self, password: &str) -> AuthResult<String> {
        let hasher = self.clone();
        let password = password.to_owned();
        tokio::task::spawn_blocking(move || hasher.hash_password(&password))
            .await
            .map_err(|e| AuthError::internal(format!("password hashing task failed: {e}")))?
    }

    /// Runs [`verify_password`](Self::verify_password) on the blocking thread pool.
    ///
    /// # Errors
    ///
    /// Same as [`verify_password`](Self::verify_password), plus `AuthError::Internal` if the
    /// blocking task panics.
    pub async fn verify_password_blocking(&self, password: &str, hash: &str) -> AuthResult<bool> {
        let hasher = self.clone();
        let password = password.to_owned();
        let hash = hash.to_owned();
        tokio::task::spawn_blocking(move || hasher.verify_password(&password, &hash))
            .await
            .map_err(|e| AuthError::internal(format!("password verification task failed: {e}")))?
    }
}
