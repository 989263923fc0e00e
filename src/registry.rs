/// Strategy registry and dispatch
///
/// The registry holds every configured [`AuthenticationStrategy`] keyed by
/// its stable name. It is populated once at startup (strategies are
/// registered and `init`ed in one pass) and read-only afterwards, so
/// request handling needs no locking.
///
/// Requesting a name nobody registered is a configuration fault
/// ([`AuthError::UnknownStrategy`]) — loud and fatal to the request, and
/// deliberately distinct from the quiet [`AuthOutcome::NoMatch`] an
/// authentication failure produces. The registry adds no retry logic;
/// infrastructure failures propagate to the caller as errors.
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use credence::hasher::Argon2idHasher;
/// use credence::registry::StrategyRegistry;
/// use credence::store::memory::InMemoryUserStore;
/// use credence::strategy::StrategyDependencies;
/// use credence::strategy::native::NativeCredentialStrategy;
/// use credence::RequestContext;
/// use serde_json::json;
/// use uuid::Uuid;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let deps = StrategyDependencies::with_hasher(
///     Arc::new(InMemoryUserStore::new()),
///     Arc::new(Argon2idHasher::new()),
/// );
/// let registry = StrategyRegistry::initialize(
///     vec![Arc::new(NativeCredentialStrategy::new())],
///     &deps,
/// )
/// .await?;
///
/// let ctx = RequestContext::new(Uuid::new_v4());
/// let outcome = registry
///     .authenticate("native", &ctx, json!({"username": "alice", "password": "s3cret"}))
///     .await?;
/// # Ok(())
/// # }
/// ```

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, info};

use crate::context::RequestContext;
use crate::error::AuthError;
use crate::strategy::{
    AuthOutcome, AuthenticationStrategy, InputSchemaFragment, StrategyDependencies,
};

/// Name-keyed set of configured authentication strategies.
pub struct StrategyRegistry {
    strategies: HashMap<&'static str, Arc<dyn AuthenticationStrategy>>,
}

impl StrategyRegistry {
    /// Builds the registry and runs each strategy's one-time `init`.
    ///
    /// Call this once during startup, before any authentication traffic.
    ///
    /// # Errors
    ///
    /// - [`AuthError::DuplicateStrategy`] if two strategies share a name
    /// - whatever error a strategy's own `init` raises
    pub async fn initialize(
        strategies: Vec<Arc<dyn AuthenticationStrategy>>,
        deps: &StrategyDependencies,
    ) -> Result<Self, AuthError> {
        let mut map: HashMap<&'static str, Arc<dyn AuthenticationStrategy>> = HashMap::new();

        for strategy in strategies {
            let name = strategy.name();
            if map.contains_key(name) {
                return Err(AuthError::DuplicateStrategy(name.to_string()));
            }

            strategy.init(deps).await?;
            debug!(strategy = name, "Initialized authentication strategy");
            map.insert(name, strategy);
        }

        info!(
            strategies = ?map.keys().collect::<Vec<_>>(),
            "Authentication strategy registry ready"
        );

        Ok(Self { strategies: map })
    }

    /// Dispatches an authentication request to the named strategy.
    ///
    /// # Errors
    ///
    /// [`AuthError::UnknownStrategy`] when the name was never registered;
    /// otherwise whatever the strategy itself returns. A failed
    /// authentication is `Ok(AuthOutcome::NoMatch)`, not an error.
    pub async fn authenticate(
        &self,
        strategy_name: &str,
        ctx: &RequestContext,
        credentials: Value,
    ) -> Result<AuthOutcome, AuthError> {
        let strategy = self
            .strategies
            .get(strategy_name)
            .ok_or_else(|| AuthError::UnknownStrategy(strategy_name.to_string()))?;

        strategy.authenticate(ctx, credentials).await
    }

    /// Looks up a registered strategy by name.
    pub fn get(&self, strategy_name: &str) -> Option<&Arc<dyn AuthenticationStrategy>> {
        self.strategies.get(strategy_name)
    }

    /// Names of all registered strategies, sorted for stable output.
    pub fn strategy_names(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.strategies.keys().copied().collect();
        names.sort_unstable();
        names
    }

    /// Collects every strategy's credential-shape fragment.
    ///
    /// The surrounding API layer merges these into a single tagged union of
    /// credential payloads keyed by strategy name; this crate only supplies
    /// the fragments. Sorted by name for stable output.
    pub fn input_schema_fragments(&self) -> Vec<InputSchemaFragment> {
        let mut fragments: Vec<_> = self
            .strategies
            .values()
            .map(|strategy| strategy.input_schema_fragment())
            .collect();
        fragments.sort_by_key(|fragment| fragment.name);
        fragments
    }
}

impl std::fmt::Debug for StrategyRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StrategyRegistry")
            .field("strategies", &self.strategy_names())
            .finish()
    }
}
