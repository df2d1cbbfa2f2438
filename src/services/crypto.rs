use argon2::{
    password_hash::SaltString, Algorithm, Argon2, Params, PasswordHash, PasswordHasher,
    PasswordVerifier, Version,
};
use secrecy::{ExposeSecret, Secret};

use crate::error::{AppError, Result};

/// Hashing primitive used for security codes and card passwords
pub trait SecretHasher: Send + Sync {
    /// Hashes a plaintext secret into a self-describing hash string
    fn hash(&self, plaintext: &str) -> Result<String>;

    /// Constant-time comparison of a plaintext against a stored hash
    fn verify(&self, plaintext: &str, hash: &str) -> bool;
}

/// Argon2id hasher keyed with a server-side pepper
pub struct Argon2SecretHasher {
    pepper: Secret<String>,
}

impl Argon2SecretHasher {
    pub fn new(pepper: Secret<String>) -> Self {
        Self { pepper }
    }

    fn argon2(&self) -> Result<Argon2<'_>> {
        Argon2::new_with_secret(
            self.pepper.expose_secret().as_bytes(),
            Algorithm::Argon2id,
            Version::V0x13,
            Params::default(),
        )
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to initialize Argon2: {}", e)))
    }
}

impl SecretHasher for Argon2SecretHasher {
    fn hash(&self, plaintext: &str) -> Result<String> {
        let salt = SaltString::generate(&mut rand_core::OsRng);

        let hash = self
            .argon2()?
            .hash_password(plaintext.as_bytes(), &salt)
            .map_err(|e| AppError::Internal(anyhow::anyhow!("Hashing failed: {}", e)))?
            .to_string();

        Ok(hash)
    }

    fn verify(&self, plaintext: &str, hash: &str) -> bool {
        let parsed = match PasswordHash::new(hash) {
            Ok(parsed) => parsed,
            Err(e) => {
                tracing::warn!(error = %e, "Stored hash is malformed");
                return false;
            }
        };

        match self.argon2() {
            Ok(argon2) => argon2.verify_password(plaintext.as_bytes(), &parsed).is_ok(),
            Err(e) => {
                tracing::error!(error = %e, "Argon2 unavailable for verification");
                false
            }
        }
    }
}
