/// Native username/password authentication
///
/// [`NativeCredentialStrategy`] authenticates credentials stored in the
/// system's own store, as opposed to delegated identity providers. It holds
/// no per-request state and is safe for concurrent reuse across
/// simultaneous requests.
///
/// Every failing branch — unknown identifier, soft-deleted user, no native
/// method, missing hash, wrong password — converges on the same
/// `NoMatch`/`false` outcome and the same code-path shape. Returning
/// differentiated reasons here would hand attackers a user-enumeration
/// oracle; do not "improve" this.
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use credence::hasher::Argon2idHasher;
/// use credence::store::memory::InMemoryUserStore;
/// use credence::strategy::{AuthenticationStrategy, StrategyDependencies};
/// use credence::strategy::native::NativeCredentialStrategy;
/// use credence::RequestContext;
/// use serde_json::json;
/// use uuid::Uuid;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let strategy = NativeCredentialStrategy::new();
/// let deps = StrategyDependencies::with_hasher(
///     Arc::new(InMemoryUserStore::new()),
///     Arc::new(Argon2idHasher::new()),
/// );
/// strategy.init(&deps).await?;
///
/// let ctx = RequestContext::new(Uuid::new_v4());
/// let outcome = strategy
///     .authenticate(&ctx, json!({"username": "alice", "password": "s3cret"}))
///     .await?;
/// assert!(outcome.is_no_match()); // empty store
/// # Ok(())
/// # }
/// ```

use std::sync::{Arc, OnceLock};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::debug;
use uuid::Uuid;

use crate::context::RequestContext;
use crate::error::AuthError;
use crate::hasher::PasswordHasher;
use crate::store::UserStore;
use crate::strategy::{
    AuthOutcome, AuthenticationStrategy, HasherProvider, InputSchemaFragment,
    StrategyDependencies,
};

/// Stable dispatch name of the native strategy.
///
/// External clients reference this; it must never change.
pub const NATIVE_STRATEGY_NAME: &str = "native";

/// Credential payload accepted by the native strategy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NativeCredentials {
    /// The user's login identifier
    pub username: String,

    /// The plaintext password to verify
    pub password: String,
}

/// Username/password authentication over [`UserStore`] and
/// [`PasswordHasher`].
///
/// Collaborators arrive during [`init`](AuthenticationStrategy::init); the
/// hasher additionally resolves lazily on first use, because the hasher
/// component may depend on configuration that only exists after all
/// strategies are constructed. Resolution happens under a [`OnceLock`], so
/// racing first uses still run the provider exactly once.
pub struct NativeCredentialStrategy {
    user_store: OnceLock<Arc<dyn UserStore>>,
    hasher_provider: OnceLock<HasherProvider>,
    hasher: OnceLock<Arc<dyn PasswordHasher>>,
}

impl NativeCredentialStrategy {
    /// Creates an unwired strategy; call `init` before use.
    pub fn new() -> Self {
        Self {
            user_store: OnceLock::new(),
            hasher_provider: OnceLock::new(),
            hasher: OnceLock::new(),
        }
    }

    fn store(&self) -> Result<&Arc<dyn UserStore>, AuthError> {
        self.user_store
            .get()
            .ok_or(AuthError::NotInitialized(NATIVE_STRATEGY_NAME))
    }

    /// Resolves the hasher, running the provider on first use only.
    fn hasher(&self) -> Result<Arc<dyn PasswordHasher>, AuthError> {
        if let Some(hasher) = self.hasher.get() {
            return Ok(hasher.clone());
        }

        let provider = self
            .hasher_provider
            .get()
            .ok_or(AuthError::NotInitialized(NATIVE_STRATEGY_NAME))?;

        Ok(self.hasher.get_or_init(|| provider()).clone())
    }

    /// Verifies a password against the user's stored native credential.
    ///
    /// Public in its own right: callers performing re-authentication on
    /// sensitive operations use this directly, outside the `authenticate`
    /// path. The id-based lookup is the canonical trusted path for all
    /// verification callers, decoupled from "find by login identifier".
    ///
    /// Returns `Ok(false)` when the user does not exist in the context's
    /// channel, has no native authentication method, has no stored hash, or
    /// the password does not match — without distinguishing which.
    ///
    /// # Errors
    ///
    /// Only infrastructure faults: store failure, hasher malfunction, or
    /// use before `init`.
    pub async fn verify_user_password(
        &self,
        ctx: &RequestContext,
        user_id: Uuid,
        password: &str,
    ) -> Result<bool, AuthError> {
        let store = self.store()?;

        let user = match store.find_by_id(ctx, user_id).await? {
            Some(user) => user,
            None => return Ok(false),
        };

        let method = match user.native_authentication_method() {
            Some(method) => method,
            // External-only users cannot pass a password check.
            None => return Ok(false),
        };

        // Absent hash feeds through as "" so this branch keeps the same
        // shape as a wrong password; the hasher returns false for it.
        let stored_hash = store
            .load_password_hash(ctx, method.id)
            .await?
            .unwrap_or_default();

        let matched = self.hasher()?.check(password, &stored_hash).await?;
        Ok(matched)
    }
}

impl Default for NativeCredentialStrategy {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for NativeCredentialStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NativeCredentialStrategy")
            .field("initialized", &self.user_store.get().is_some())
            .finish()
    }
}

#[async_trait]
impl AuthenticationStrategy for NativeCredentialStrategy {
    fn name(&self) -> &'static str {
        NATIVE_STRATEGY_NAME
    }

    fn input_schema_fragment(&self) -> InputSchemaFragment {
        InputSchemaFragment {
            name: NATIVE_STRATEGY_NAME,
            schema: json!({
                "type": "object",
                "properties": {
                    "username": { "type": "string" },
                    "password": { "type": "string" }
                },
                "required": ["username", "password"]
            }),
        }
    }

    async fn init(&self, deps: &StrategyDependencies) -> Result<(), AuthError> {
        // Repeat init keeps the first wiring; OnceLock makes this a no-op.
        let _ = self.user_store.set(deps.user_store.clone());
        let _ = self.hasher_provider.set(deps.password_hasher.clone());
        Ok(())
    }

    async fn authenticate(
        &self,
        ctx: &RequestContext,
        credentials: Value,
    ) -> Result<AuthOutcome, AuthError> {
        let credentials: NativeCredentials = serde_json::from_value(credentials).map_err(
            |source| AuthError::MalformedCredentials {
                strategy: NATIVE_STRATEGY_NAME,
                source,
            },
        )?;

        debug!(
            strategy = NATIVE_STRATEGY_NAME,
            request_id = %ctx.request_id(),
            "Authenticating credentials"
        );

        let user = match self
            .store()?
            .find_by_identifier(ctx, &credentials.username)
            .await?
        {
            Some(user) => user,
            None => return Ok(AuthOutcome::NoMatch),
        };

        if self
            .verify_user_password(ctx, user.id, &credentials.password)
            .await?
        {
            Ok(AuthOutcome::Authenticated(user))
        } else {
            Ok(AuthOutcome::NoMatch)
        }
    }
}
