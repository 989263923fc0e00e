/// In-memory user store
///
/// A deterministic [`UserStore`] backed by a `HashMap`, used by the test
/// suite, doc examples and local development. Seeding goes through
/// [`InMemoryUserStore::add_user`], which keeps the password hash in a
/// separate map keyed by method id — mirroring the projection boundary the
/// Postgres store enforces with its column lists.
///
/// # Example
///
/// ```
/// use credence::store::memory::InMemoryUserStore;
/// use credence::store::UserStore;
/// use credence::{RequestContext, User};
/// use credence::user::{AuthenticationMethod, AuthenticationMethodKind};
/// use chrono::Utc;
/// use uuid::Uuid;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let store = InMemoryUserStore::new();
/// let channel = Uuid::new_v4();
/// let user_id = Uuid::new_v4();
/// let method_id = Uuid::new_v4();
///
/// store.add_user(
///     channel,
///     User {
///         id: user_id,
///         identifier: "alice@example.com".to_string(),
///         verified: true,
///         deleted_at: None,
///         roles: vec![],
///         authentication_methods: vec![AuthenticationMethod {
///             id: method_id,
///             user_id,
///             kind: AuthenticationMethodKind::Native,
///         }],
///         created_at: Utc::now(),
///         updated_at: Utc::now(),
///     },
///     Some((method_id, "$argon2id$...".to_string())),
/// );
///
/// let ctx = RequestContext::new(channel);
/// let found = store.find_by_identifier(&ctx, "alice@example.com").await?;
/// assert!(found.is_some());
/// # Ok(())
/// # }
/// ```

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use uuid::Uuid;

use crate::context::RequestContext;
use crate::error::StoreError;
use crate::store::UserStore;
use crate::user::User;

#[derive(Debug, Default)]
struct Inner {
    /// Users keyed by id, each tagged with its channel
    users: HashMap<Uuid, (Uuid, User)>,

    /// Password hashes keyed by authentication-method id, held apart from
    /// the user records so general reads cannot see them
    password_hashes: HashMap<Uuid, String>,
}

/// HashMap-backed [`UserStore`] for tests and development.
#[derive(Debug, Default)]
pub struct InMemoryUserStore {
    inner: RwLock<Inner>,
}

impl InMemoryUserStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds a user into the given channel.
    ///
    /// `password_hash` attaches a stored hash to one of the user's
    /// authentication methods; pass `None` for users that authenticate only
    /// through external providers.
    pub fn add_user(&self, channel_id: Uuid, user: User, password_hash: Option<(Uuid, String)>) {
        // Seeding recovers from poisoning; the data is test fixture state.
        let mut inner = self.inner.write().unwrap_or_else(|e| e.into_inner());
        if let Some((method_id, hash)) = password_hash {
            inner.password_hashes.insert(method_id, hash);
        }
        inner.users.insert(user.id, (channel_id, user));
    }

    /// Removes a user and any stored hashes for their methods.
    pub fn remove_user(&self, user_id: Uuid) {
        let mut inner = self.inner.write().unwrap_or_else(|e| e.into_inner());
        if let Some((_, user)) = inner.users.remove(&user_id) {
            for method in &user.authentication_methods {
                inner.password_hashes.remove(&method.id);
            }
        }
    }
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn find_by_identifier(
        &self,
        ctx: &RequestContext,
        identifier: &str,
    ) -> Result<Option<User>, StoreError> {
        let inner = self
            .inner
            .read()
            .map_err(|_| StoreError::Backend("store lock poisoned".to_string()))?;

        let user = inner
            .users
            .values()
            .filter(|(channel_id, _)| *channel_id == ctx.channel_id())
            .map(|(_, user)| user)
            .find(|user| user.identifier == identifier && !user.is_deleted())
            .cloned();

        Ok(user)
    }

    async fn find_by_id(
        &self,
        ctx: &RequestContext,
        id: Uuid,
    ) -> Result<Option<User>, StoreError> {
        let inner = self
            .inner
            .read()
            .map_err(|_| StoreError::Backend("store lock poisoned".to_string()))?;

        let user = inner
            .users
            .get(&id)
            .filter(|(channel_id, user)| *channel_id == ctx.channel_id() && !user.is_deleted())
            .map(|(_, user)| user.clone());

        Ok(user)
    }

    async fn load_password_hash(
        &self,
        ctx: &RequestContext,
        method_id: Uuid,
    ) -> Result<Option<String>, StoreError> {
        let inner = self
            .inner
            .read()
            .map_err(|_| StoreError::Backend("store lock poisoned".to_string()))?;

        // The hash is only readable when the method's owner belongs to the
        // context's channel; a context from another tenant sees nothing.
        let owned_in_channel = inner.users.values().any(|(channel_id, user)| {
            *channel_id == ctx.channel_id()
                && user
                    .authentication_methods
                    .iter()
                    .any(|method| method.id == method_id)
        });
        if !owned_in_channel {
            return Ok(None);
        }

        Ok(inner.password_hashes.get(&method_id).cloned())
    }
}
