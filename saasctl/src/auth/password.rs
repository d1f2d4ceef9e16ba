//! Password hashing and verification.

use argon2::{
    Algorithm, Argon2, Params, Version,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};

use crate::config::PasswordConfig;

/// Argon2 hashing parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Argon2Params {
    pub memory_kib: u32,
    pub iterations: u32,
    pub parallelism: u32,
}

impl Argon2Params {
    fn to_argon2(self) -> anyhow::Result<Argon2<'static>> {
        let params = Params::new(self.memory_kib, self.iterations, self.parallelism, None)
            .map_err(|e| anyhow::anyhow!("create argon2 params: {e}"))?;

        Ok(Argon2::new(Algorithm::Argon2id, Version::V0x13, params))
    }
}

impl Default for Argon2Params {
    /// Secure defaults for production (Argon2id RFC recommendations)
    fn default() -> Self {
        Self {
            memory_kib: 19456, // 19 MB
            iterations: 2,
            parallelism: 1,
        }
    }
}

impl From<&PasswordConfig> for Argon2Params {
    fn from(config: &PasswordConfig) -> Self {
        Self {
            memory_kib: config.argon2_memory_kib,
            iterations: config.argon2_iterations,
            parallelism: config.argon2_parallelism,
        }
    }
}

/// One-way salted hashing of secrets.
///
/// Hashing is CPU-bound; async callers run it on `tokio::task::spawn_blocking`.
#[derive(Debug, Clone, Copy, Default)]
pub struct CredentialHasher {
    params: Argon2Params,
}

impl CredentialHasher {
    pub fn new(params: Argon2Params) -> Self {
        Self { params }
    }

    /// Hash a secret with a freshly generated salt. The output is a PHC string.
    pub fn hash(&self, secret: &str) -> anyhow::Result<String> {
        let salt = SaltString::generate(&mut OsRng);
        let argon2 = self.params.to_argon2()?;

        let hash = argon2
            .hash_password(secret.as_bytes(), &salt)
            .map_err(|e| anyhow::anyhow!("hash password: {e}"))?;

        Ok(hash.to_string())
    }

    /// Verify a secret against a stored hash.
    ///
    /// Verification uses the parameters embedded in the hash itself; a malformed hash never matches.
    pub fn verify(&self, secret: &str, hash: &str) -> bool {
        match PasswordHash::new(hash) {
            Ok(parsed) => Argon2::default().verify_password(secret.as_bytes(), &parsed).is_ok(),
            Err(e) => {
                tracing::warn!("Stored password hash could not be parsed: {e}");
                false
            }
        }
    }
}
