/// Error types for the authentication core
///
/// Failed authentication is **not** an error: unknown identifier, wrong
/// password, missing native method and soft-deleted user all collapse into
/// [`AuthOutcome::NoMatch`](crate::AuthOutcome::NoMatch), which is returned,
/// never raised. The variants here cover the two remaining classes:
///
/// - **Configuration faults**: a strategy name nobody registered, a
///   duplicate registration, a strategy used before `init`, or a credential
///   payload that does not match the strategy's declared shape. These are
///   programming/wiring bugs and should be reported loudly.
/// - **Infrastructure faults**: the store or the hasher malfunctioned.
///   Callers must not present these as "login failed" — that would mask an
///   outage as bad credentials.

use thiserror::Error;

/// Result alias used throughout the crate
pub type AuthResult<T> = Result<T, AuthError>;

/// Errors raised by strategies and the registry.
#[derive(Debug, Error)]
pub enum AuthError {
    /// No strategy registered under the requested name (configuration fault)
    #[error("no authentication strategy registered under \"{0}\"")]
    UnknownStrategy(String),

    /// Two strategies registered under the same name (configuration fault)
    #[error("duplicate authentication strategy name \"{0}\"")]
    DuplicateStrategy(String),

    /// Strategy used before its one-time `init` ran (configuration fault)
    #[error("strategy \"{0}\" was used before init")]
    NotInitialized(&'static str),

    /// Credential payload did not deserialize into the strategy's declared
    /// shape. Structural validation belongs to the API layer, so reaching a
    /// strategy with the wrong shape means broken wiring, not bad credentials.
    #[error("malformed credentials for strategy \"{strategy}\": {source}")]
    MalformedCredentials {
        /// Strategy that rejected the payload
        strategy: &'static str,
        /// Underlying deserialization error
        #[source]
        source: serde_json::Error,
    },

    /// User store failure (infrastructure fault)
    #[error("user store error: {0}")]
    Store(#[from] StoreError),

    /// Password hasher failure (infrastructure fault)
    #[error("password hasher error: {0}")]
    Hasher(#[from] HasherError),
}

/// Errors from [`UserStore`](crate::store::UserStore) implementations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Database-level failure (connection, query, protocol)
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Failure in a non-database store backend
    #[error("store backend error: {0}")]
    Backend(String),
}

/// Errors from [`PasswordHasher`](crate::hasher::PasswordHasher)
/// implementations.
///
/// An unparsable or empty stored hash is **not** an error — `check` returns
/// `Ok(false)` for those, so a missing hash takes the same path as a wrong
/// password.
#[derive(Debug, Error)]
pub enum HasherError {
    /// Failed to produce a hash (invalid parameters, RNG failure)
    #[error("failed to hash password: {0}")]
    Hash(String),

    /// The hashing runtime failed (e.g. blocking task was cancelled)
    #[error("hasher runtime error: {0}")]
    Runtime(String),
}
