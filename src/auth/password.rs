//! Password hashing with Argon2id.
//!
//! Hashes are PHC strings (`$argon2id$v=19$m=..,t=..,p=..$salt$hash`), so the
//! parameters travel with the hash and verification needs nothing else.
//!
//! ```rust,ignore
//! use orgauth::auth::PasswordHasher;
//!
//! let hasher = PasswordHasher::default();
//! let hash = hasher.hash("my-secure-password")?;
//! assert!(hasher.verify("my-secure-password", &hash));
//! ```

use crate::error::{OrgAuthError, Result};

use argon2::{
    Algorithm, Argon2, Params, Version,
    password_hash::{
        PasswordHash, PasswordHasher as Argon2Hasher, PasswordVerifier, SaltString,
        rand_core::OsRng,
    },
};

const TIMING_DUMMY_PASSWORD: &str = "orgauth-timing-equalizer";

/// Argon2 cost parameters.
#[derive(Clone, Debug)]
pub struct PasswordConfig {
    /// Memory cost in KiB (default: 19456 = 19MB)
    pub memory_cost: u32,
    /// Time cost / iterations (default: 2)
    pub time_cost: u32,
    /// Parallelism (default: 1)
    pub parallelism: u32,
}

impl Default for PasswordConfig {
    fn default() -> Self {
        // OWASP recommended minimum for Argon2id
        Self {
            memory_cost: 19 * 1024,
            time_cost: 2,
            parallelism: 1,
        }
    }
}

impl PasswordConfig {
    pub fn new(memory_cost: u32, time_cost: u32, parallelism: u32) -> Self {
        Self {
            memory_cost,
            time_cost,
            parallelism,
        }
    }

    /// Cheap parameters for tests. Never use in production.
    pub fn fast() -> Self {
        Self {
            memory_cost: 1024,
            time_cost: 1,
            parallelism: 1,
        }
    }
}

/// Salted adaptive password hasher.
#[derive(Clone, Debug, Default)]
pub struct PasswordHasher {
    config: PasswordConfig,
}

impl PasswordHasher {
    pub fn new(config: PasswordConfig) -> Self {
        Self { config }
    }

    /// Hash a password with a fresh random salt.
    pub fn hash(&self, password: &str) -> Result<String> {
        let salt = SaltString::generate(&mut OsRng);
        let argon2 = self.build_argon2()?;

        argon2
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| OrgAuthError::internal(format!("Password hashing failed: {}", e)))
    }

    /// Check a password against a stored hash.
    ///
    /// A hash that cannot be parsed counts as a mismatch: a corrupt record
    /// must never authenticate, and it must not turn a login into a 500.
    pub fn verify(&self, password: &str, hash: &str) -> bool {
        let parsed = match PasswordHash::new(hash) {
            Ok(parsed) => parsed,
            Err(e) => {
                tracing::warn!(error = %e, "Stored password hash is malformed");
                return false;
            }
        };

        // Parameters come from the hash itself; comparison is constant-time.
        Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok()
    }

    /// [`hash`](Self::hash) on the blocking pool.
    pub async fn hash_blocking(&self, password: String) -> Result<String> {
        let hasher = self.clone();
        tokio::task::spawn_blocking(move || hasher.hash(&password)).await?
    }

    /// [`verify`](Self::verify) on the blocking pool.
    pub async fn verify_blocking(&self, password: String, hash: String) -> Result<bool> {
        let hasher = self.clone();
        Ok(tokio::task::spawn_blocking(move || hasher.verify(&password, &hash)).await?)
    }

    /// Spend one hash worth of CPU so an unknown email costs the same as a
    /// wrong password.
    pub async fn equalize_timing(&self) {
        if let Err(e) = self.hash_blocking(TIMING_DUMMY_PASSWORD.to_string()).await {
            tracing::warn!(error = %e, "Timing equalizer hash failed");
        }
    }

    fn build_argon2(&self) -> Result<Argon2<'static>> {
        let params = Params::new(
            self.config.memory_cost,
            self.config.time_cost,
            self.config.parallelism,
            None,
        )
        .map_err(|e| OrgAuthError::internal(format!("Invalid Argon2 params: {}", e)))?;

        Ok(Argon2::new(Algorithm::Argon2id, Version::V0x13, params))
    }
}
