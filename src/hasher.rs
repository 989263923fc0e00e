/// Password hashing using Argon2id
///
/// This module defines the [`PasswordHasher`] contract used by the native
/// credential strategy, plus the default [`Argon2idHasher`] implementation.
///
/// # Security
///
/// - **Algorithm**: Argon2id (hybrid of Argon2i and Argon2d)
/// - **Memory**: 64 MB (65536 KB)
/// - **Iterations**: 3 passes
/// - **Parallelism**: 4 lanes
/// - **Output**: 32-byte hash
///
/// Verification is constant-time with respect to match/mismatch, and both
/// hashing and checking run on the blocking thread pool — Argon2 is
/// deliberately expensive and must not stall the async runtime.
///
/// # Example
///
/// ```no_run
/// use credence::hasher::{Argon2idHasher, PasswordHasher};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let hasher = Argon2idHasher::new();
///
/// let hash = hasher.hash("super_secret_password_123").await?;
/// assert!(hasher.check("super_secret_password_123", &hash).await?);
/// assert!(!hasher.check("wrong_password", &hash).await?);
/// # Ok(())
/// # }
/// ```

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordVerifier, SaltString},
    Argon2, Params, ParamsBuilder, Version,
};
use async_trait::async_trait;

use crate::error::HasherError;

/// Contract for one-way password hashing and verification.
///
/// Implementations must keep `check` constant-time with respect to whether
/// the password matches, and must treat an empty or malformed stored hash
/// as a plain mismatch (`Ok(false)`) rather than an error — the strategy
/// feeds an absent hash through as `""` so that every failing credential
/// takes the same code path. `Err` is reserved for genuine malfunction.
#[async_trait]
pub trait PasswordHasher: Send + Sync {
    /// Hashes a plaintext password into a self-describing stored form.
    async fn hash(&self, plaintext: &str) -> Result<String, HasherError>;

    /// Compares a plaintext against a stored hash.
    ///
    /// Returns `Ok(true)` on a match, `Ok(false)` on a mismatch or an
    /// empty/unparsable stored hash.
    async fn check(&self, plaintext: &str, stored_hash: &str) -> Result<bool, HasherError>;
}

/// Argon2id implementation of [`PasswordHasher`].
///
/// Produces PHC-format strings, e.g.:
///
/// ```text
/// $argon2id$v=19$m=65536,t=3,p=4$c2FsdHNhbHRzYWx0$hash...
/// ```
///
/// Parameters are embedded in the hash, so checks keep working after the
/// defaults change.
#[derive(Debug, Clone)]
pub struct Argon2idHasher {
    params: Params,
}

impl Argon2idHasher {
    /// Creates a hasher with the default parameters
    /// (64 MB memory, 3 iterations, 4 lanes, 32-byte output).
    pub fn new() -> Self {
        // ParamsBuilder only fails on out-of-range values; these are fixed
        // in-range constants.
        let params = ParamsBuilder::new()
            .m_cost(65536) // 64 MB
            .t_cost(3)
            .p_cost(4)
            .output_len(32)
            .build()
            .unwrap_or_else(|_| Params::default());

        Self { params }
    }

    /// Creates a hasher with explicit parameters.
    ///
    /// Useful for environments with different memory budgets; the defaults
    /// from [`Argon2idHasher::new`] are the recommended production values.
    pub fn with_params(params: Params) -> Self {
        Self { params }
    }

    fn argon2(&self) -> Argon2<'static> {
        Argon2::new(argon2::Algorithm::Argon2id, Version::V0x13, self.params.clone())
    }
}

impl Default for Argon2idHasher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PasswordHasher for Argon2idHasher {
    async fn hash(&self, plaintext: &str) -> Result<String, HasherError> {
        let argon2 = self.argon2();
        let plaintext = plaintext.to_owned();

        tokio::task::spawn_blocking(move || {
            let salt = SaltString::generate(&mut OsRng);
            argon2::PasswordHasher::hash_password(&argon2, plaintext.as_bytes(), &salt)
                .map(|hash| hash.to_string())
                .map_err(|e| HasherError::Hash(format!("hash generation failed: {}", e)))
        })
        .await
        .map_err(|e| HasherError::Runtime(format!("hashing task failed: {}", e)))?
    }

    async fn check(&self, plaintext: &str, stored_hash: &str) -> Result<bool, HasherError> {
        let argon2 = self.argon2();
        let plaintext = plaintext.to_owned();
        let stored_hash = stored_hash.to_owned();

        tokio::task::spawn_blocking(move || {
            // An empty or malformed stored hash is a mismatch, not a fault:
            // users without a native credential reach this with "".
            let parsed = match PasswordHash::new(&stored_hash) {
                Ok(parsed) => parsed,
                Err(_) => return false,
            };

            argon2.verify_password(plaintext.as_bytes(), &parsed).is_ok()
        })
        .await
        .map_err(|e| HasherError::Runtime(format!("verification task failed: {}", e)))
    }
}
