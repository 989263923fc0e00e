/// User store contract and implementations
///
/// The authentication core never talks to storage directly; it goes through
/// the [`UserStore`] trait, which the surrounding system implements over its
/// persistence layer. Two implementations ship with the crate:
///
/// - [`postgres::PgUserStore`]: sqlx/PostgreSQL reference implementation
/// - [`memory::InMemoryUserStore`]: deterministic in-memory store for tests
///   and local development
///
/// All reads are scoped by the [`RequestContext`]'s channel boundary and
/// none of them mutate state.

use async_trait::async_trait;
use uuid::Uuid;

use crate::context::RequestContext;
use crate::error::StoreError;
use crate::user::User;

pub mod memory;
pub mod postgres;

/// Transactional, channel-scoped read access to user records.
///
/// Implementations decide how the context's transaction binding maps onto
/// their connection handling; this crate only requires that all three reads
/// observe a consistent snapshot for the duration of one `authenticate`
/// call.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Finds a user by their unique login identifier within the context's
    /// channel, excluding soft-deleted users.
    ///
    /// Returns the user with roles and authentication methods eagerly
    /// loaded, or `None` if no matching user exists.
    async fn find_by_identifier(
        &self,
        ctx: &RequestContext,
        identifier: &str,
    ) -> Result<Option<User>, StoreError>;

    /// Finds a user by id within the context's channel, with authentication
    /// methods loaded, excluding soft-deleted users.
    ///
    /// This is the canonical lookup used by the verification path,
    /// intentionally separate from the identifier lookup so that every
    /// verification caller goes through the same id-based read.
    async fn find_by_id(&self, ctx: &RequestContext, id: Uuid)
        -> Result<Option<User>, StoreError>;

    /// Fetches the stored password hash for one authentication method.
    ///
    /// This is a minimal-projection read: the hash is never loaded as part
    /// of a general user fetch. Returns `None` when the method does not
    /// exist, is not native, has no hash stored, or its owning user is
    /// outside the context's channel.
    async fn load_password_hash(
        &self,
        ctx: &RequestContext,
        method_id: Uuid,
    ) -> Result<Option<String>, StoreError>;
}
