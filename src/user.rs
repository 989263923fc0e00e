/// User identity records
///
/// These are the read-only records authentication works over. They are
/// owned and mutated by collaborators outside this crate (registration,
/// password-change flows); this crate only reads them through a
/// [`UserStore`](crate::store::UserStore) within the channel boundary of a
/// [`RequestContext`](crate::RequestContext).
///
/// None of these types carry a password hash. The hash is reachable only
/// through [`UserStore::load_password_hash`](crate::store::UserStore::load_password_hash),
/// a minimal-projection read used by the verification path alone, so that a
/// general user fetch can never incidentally expose it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A user account that can authenticate.
///
/// A user may hold at most one native (username/password) authentication
/// method and any number of external-provider methods.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    /// Unique user ID (UUID v4)
    pub id: Uuid,

    /// Unique human-readable login identifier (email or username)
    pub identifier: String,

    /// Whether the account has completed verification
    pub verified: bool,

    /// Soft-delete marker; a deleted user never authenticates
    pub deleted_at: Option<DateTime<Utc>>,

    /// Role/permission grants, eagerly loaded for downstream callers
    pub roles: Vec<Role>,

    /// Authentication methods configured for this user (hash excluded)
    pub authentication_methods: Vec<AuthenticationMethod>,

    /// When the account was created
    pub created_at: DateTime<Utc>,

    /// When the account was last updated
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Whether the user is soft-deleted.
    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }

    /// The user's native authentication method, if one is configured.
    pub fn native_authentication_method(&self) -> Option<&AuthenticationMethod> {
        self.authentication_methods
            .iter()
            .find(|method| matches!(method.kind, AuthenticationMethodKind::Native))
    }
}

/// One authentication method configured for a user.
///
/// There is one record per (user, strategy) pair. The native variant's
/// stored password hash is deliberately not part of this record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthenticationMethod {
    /// Unique method ID
    pub id: Uuid,

    /// Owning user
    pub user_id: Uuid,

    /// Which mechanism this method belongs to
    pub kind: AuthenticationMethodKind,
}

/// Mechanism behind an [`AuthenticationMethod`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AuthenticationMethodKind {
    /// Username/password stored in this system's own store
    Native,

    /// Delegated to an external identity provider
    External {
        /// Strategy name of the provider (e.g. "google", "saml")
        strategy: String,

        /// The user's identifier at that provider
        external_identifier: String,
    },
}

/// A role grant attached to a user.
///
/// Read-only from this crate's perspective; authorization decisions happen
/// in the layers above.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    /// Unique role ID
    pub id: Uuid,

    /// Stable role code (e.g. "administrator")
    pub code: String,

    /// Permission identifiers this role grants
    pub permissions: Vec<String>,

    /// Channels the role applies to
    pub channel_ids: Vec<Uuid>,
}
