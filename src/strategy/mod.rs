/// Authentication strategy contract
///
/// Every authentication mechanism — native username/password, external
/// identity providers, token exchange — implements
/// [`AuthenticationStrategy`] and is registered with the
/// [`StrategyRegistry`](crate::registry::StrategyRegistry) under its stable
/// name. The registry dispatches each authentication request to the
/// matching strategy; strategies themselves are long-lived, shared,
/// stateless-per-request singletons.
///
/// Credentials cross the contract as a [`serde_json::Value`]: the
/// surrounding API layer validates each payload against the strategy's
/// declared [`InputSchemaFragment`] before dispatch, and the strategy
/// deserializes it into its own shape.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::context::RequestContext;
use crate::error::AuthError;
use crate::hasher::PasswordHasher;
use crate::store::UserStore;
use crate::user::User;

pub mod native;

/// Outcome of an authentication attempt.
///
/// `NoMatch` is deliberately reason-free: unknown identifier, wrong
/// password, missing native method and soft-deleted user all produce the
/// same value, so callers (and attackers) cannot tell them apart.
#[derive(Debug, Clone, PartialEq)]
pub enum AuthOutcome {
    /// Credentials identified this user
    Authenticated(User),

    /// Credentials did not authenticate; no reason given
    NoMatch,
}

impl AuthOutcome {
    /// Whether this outcome is a failed authentication.
    pub fn is_no_match(&self) -> bool {
        matches!(self, AuthOutcome::NoMatch)
    }

    /// The authenticated user, if any.
    pub fn user(&self) -> Option<&User> {
        match self {
            AuthOutcome::Authenticated(user) => Some(user),
            AuthOutcome::NoMatch => None,
        }
    }

    /// Consumes the outcome, yielding the authenticated user if any.
    pub fn into_user(self) -> Option<User> {
        match self {
            AuthOutcome::Authenticated(user) => Some(user),
            AuthOutcome::NoMatch => None,
        }
    }
}

/// Declares the credential shape a strategy accepts.
///
/// Purely descriptive: the surrounding API layer merges every registered
/// strategy's fragment into one tagged union keyed by strategy name. This
/// crate only supplies the fragments.
#[derive(Debug, Clone, PartialEq)]
pub struct InputSchemaFragment {
    /// Strategy name the fragment belongs to (the union tag)
    pub name: &'static str,

    /// JSON-schema-shaped description of the credential object
    pub schema: Value,
}

/// Provider for the password hasher, resolved on first use.
///
/// Strategies must not demand the hasher at construction or even at `init`
/// time: the hasher component may itself depend on configuration that is
/// only resolved after all strategies exist. Handing a provider through
/// [`StrategyDependencies`] and resolving it lazily breaks that
/// initialization cycle.
pub type HasherProvider = Arc<dyn Fn() -> Arc<dyn PasswordHasher> + Send + Sync>;

/// Shared collaborators handed to every strategy during `init`.
#[derive(Clone)]
pub struct StrategyDependencies {
    /// Channel-scoped read access to user records
    pub user_store: Arc<dyn UserStore>,

    /// Lazily-resolved password hasher
    pub password_hasher: HasherProvider,
}

impl StrategyDependencies {
    /// Creates dependencies with an explicit hasher provider.
    pub fn new(user_store: Arc<dyn UserStore>, password_hasher: HasherProvider) -> Self {
        Self {
            user_store,
            password_hasher,
        }
    }

    /// Creates dependencies around an already-constructed hasher.
    pub fn with_hasher(user_store: Arc<dyn UserStore>, hasher: Arc<dyn PasswordHasher>) -> Self {
        Self {
            user_store,
            password_hasher: Arc::new(move || hasher.clone()),
        }
    }
}

impl std::fmt::Debug for StrategyDependencies {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StrategyDependencies").finish_non_exhaustive()
    }
}

/// Uniform contract implemented by every authentication mechanism.
#[async_trait]
pub trait AuthenticationStrategy: Send + Sync {
    /// Stable, globally unique name used for dispatch.
    ///
    /// External clients reference this name; it must not change across
    /// versions.
    fn name(&self) -> &'static str;

    /// The credential shape this strategy accepts.
    ///
    /// No side effects; called whenever the surrounding API layer rebuilds
    /// its input contract.
    fn input_schema_fragment(&self) -> InputSchemaFragment;

    /// One-time setup granting access to shared collaborators.
    ///
    /// Runs exactly once per process lifetime, before any concurrent
    /// `authenticate` calls begin. Implementations that defer part of their
    /// wiring (see [`HasherProvider`]) must make the deferred resolution
    /// safe against racing first uses.
    async fn init(&self, deps: &StrategyDependencies) -> Result<(), AuthError>;

    /// Attempts to authenticate the given credentials.
    ///
    /// Read-only with respect to persisted state. Invalid credentials are a
    /// normal [`AuthOutcome::NoMatch`], never an error; `Err` is reserved
    /// for infrastructure faults (store unreachable, hasher malfunction)
    /// and for credential payloads that do not match the declared shape.
    async fn authenticate(
        &self,
        ctx: &RequestContext,
        credentials: Value,
    ) -> Result<AuthOutcome, AuthError>;
}
