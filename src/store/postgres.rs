/// PostgreSQL user store
///
/// Reference [`UserStore`] implementation over sqlx. Reads are scoped to
/// the context's channel through the `user_channels` join table, and the
/// password hash lives in its own projection query — it is never part of
/// the column list of a general user read.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE users (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     identifier CITEXT NOT NULL UNIQUE,
///     verified BOOLEAN NOT NULL DEFAULT FALSE,
///     deleted_at TIMESTAMPTZ,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
///
/// CREATE TABLE user_channels (
///     user_id UUID NOT NULL REFERENCES users(id),
///     channel_id UUID NOT NULL,
///     PRIMARY KEY (user_id, channel_id)
/// );
///
/// CREATE TABLE authentication_methods (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     user_id UUID NOT NULL REFERENCES users(id),
///     kind VARCHAR(16) NOT NULL,              -- 'native' | 'external'
///     strategy VARCHAR(255),                  -- external only
///     external_identifier VARCHAR(255),       -- external only
///     password_hash VARCHAR(255)              -- native only, never empty
/// );
///
/// CREATE TABLE roles (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     code VARCHAR(255) NOT NULL,
///     permissions TEXT[] NOT NULL DEFAULT '{}'
/// );
///
/// CREATE TABLE user_roles (
///     user_id UUID NOT NULL REFERENCES users(id),
///     role_id UUID NOT NULL REFERENCES roles(id),
///     PRIMARY KEY (user_id, role_id)
/// );
///
/// CREATE TABLE role_channels (
///     role_id UUID NOT NULL REFERENCES roles(id),
///     channel_id UUID NOT NULL,
///     PRIMARY KEY (role_id, channel_id)
/// );
/// ```

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::debug;
use uuid::Uuid;

use crate::context::RequestContext;
use crate::error::StoreError;
use crate::store::UserStore;
use crate::user::{AuthenticationMethod, AuthenticationMethodKind, Role, User};

/// sqlx/PostgreSQL implementation of [`UserStore`].
///
/// Holds a connection pool created by the surrounding system (see the
/// pool-sizing guidance in the sqlx docs); the store itself never opens,
/// commits or rolls back transactions.
#[derive(Debug, Clone)]
pub struct PgUserStore {
    pool: PgPool,
}

#[derive(Debug, sqlx::FromRow)]
struct UserRow {
    id: Uuid,
    identifier: String,
    verified: bool,
    deleted_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(Debug, sqlx::FromRow)]
struct AuthMethodRow {
    id: Uuid,
    user_id: Uuid,
    kind: String,
    strategy: Option<String>,
    external_identifier: Option<String>,
}

#[derive(Debug, sqlx::FromRow)]
struct RoleRow {
    id: Uuid,
    code: String,
    permissions: Vec<String>,
    channel_ids: Vec<Uuid>,
}

impl PgUserStore {
    /// Creates a store over an existing connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Loads the authentication methods for a user, without hashes.
    async fn load_methods(&self, user_id: Uuid) -> Result<Vec<AuthenticationMethod>, StoreError> {
        let rows = sqlx::query_as::<_, AuthMethodRow>(
            r#"
            SELECT id, user_id, kind, strategy, external_identifier
            FROM authentication_methods
            WHERE user_id = $1
            ORDER BY id
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(StoreError::Database)?;

        rows.into_iter().map(AuthenticationMethod::try_from).collect()
    }

    /// Loads the role grants for a user.
    async fn load_roles(&self, user_id: Uuid) -> Result<Vec<Role>, StoreError> {
        let rows = sqlx::query_as::<_, RoleRow>(
            r#"
            SELECT r.id, r.code, r.permissions,
                   COALESCE(
                       ARRAY_AGG(rc.channel_id) FILTER (WHERE rc.channel_id IS NOT NULL),
                       '{}'
                   ) AS channel_ids
            FROM roles r
            JOIN user_roles ur ON ur.role_id = r.id
            LEFT JOIN role_channels rc ON rc.role_id = r.id
            WHERE ur.user_id = $1
            GROUP BY r.id, r.code, r.permissions
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(StoreError::Database)?;

        Ok(rows
            .into_iter()
            .map(|row| Role {
                id: row.id,
                code: row.code,
                permissions: row.permissions,
                channel_ids: row.channel_ids,
            })
            .collect())
    }

    /// Assembles a full [`User`] from its base row plus associations.
    async fn hydrate(&self, row: UserRow) -> Result<User, StoreError> {
        let authentication_methods = self.load_methods(row.id).await?;
        let roles = self.load_roles(row.id).await?;

        Ok(User {
            id: row.id,
            identifier: row.identifier,
            verified: row.verified,
            deleted_at: row.deleted_at,
            roles,
            authentication_methods,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

impl TryFrom<AuthMethodRow> for AuthenticationMethod {
    type Error = StoreError;

    fn try_from(row: AuthMethodRow) -> Result<Self, Self::Error> {
        let kind = match row.kind.as_str() {
            "native" => AuthenticationMethodKind::Native,
            "external" => {
                let strategy = row.strategy.ok_or_else(|| {
                    StoreError::Backend(format!(
                        "authentication method {} is external but has no strategy",
                        row.id
                    ))
                })?;
                let external_identifier = row.external_identifier.ok_or_else(|| {
                    StoreError::Backend(format!(
                        "authentication method {} is external but has no external identifier",
                        row.id
                    ))
                })?;
                AuthenticationMethodKind::External {
                    strategy,
                    external_identifier,
                }
            }
            other => {
                return Err(StoreError::Backend(format!(
                    "authentication method {} has unknown kind \"{}\"",
                    row.id, other
                )))
            }
        };

        Ok(AuthenticationMethod {
            id: row.id,
            user_id: row.user_id,
            kind,
        })
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn find_by_identifier(
        &self,
        ctx: &RequestContext,
        identifier: &str,
    ) -> Result<Option<User>, StoreError> {
        debug!(
            channel_id = %ctx.channel_id(),
            request_id = %ctx.request_id(),
            "Looking up user by identifier"
        );

        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT u.id, u.identifier, u.verified, u.deleted_at, u.created_at, u.updated_at
            FROM users u
            JOIN user_channels uc ON uc.user_id = u.id
            WHERE u.identifier = $1
              AND uc.channel_id = $2
              AND u.deleted_at IS NULL
            "#,
        )
        .bind(identifier)
        .bind(ctx.channel_id())
        .fetch_optional(&self.pool)
        .await
        .map_err(StoreError::Database)?;

        match row {
            Some(row) => Ok(Some(self.hydrate(row).await?)),
            None => Ok(None),
        }
    }

    async fn find_by_id(
        &self,
        ctx: &RequestContext,
        id: Uuid,
    ) -> Result<Option<User>, StoreError> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT u.id, u.identifier, u.verified, u.deleted_at, u.created_at, u.updated_at
            FROM users u
            JOIN user_channels uc ON uc.user_id = u.id
            WHERE u.id = $1
              AND uc.channel_id = $2
              AND u.deleted_at IS NULL
            "#,
        )
        .bind(id)
        .bind(ctx.channel_id())
        .fetch_optional(&self.pool)
        .await
        .map_err(StoreError::Database)?;

        match row {
            Some(row) => Ok(Some(self.hydrate(row).await?)),
            None => Ok(None),
        }
    }

    async fn load_password_hash(
        &self,
        ctx: &RequestContext,
        method_id: Uuid,
    ) -> Result<Option<String>, StoreError> {
        // Minimal projection: the hash column alone, keyed by method id and
        // scoped to the owning user's channel like every other read.
        let row: Option<(Option<String>,)> = sqlx::query_as(
            r#"
            SELECT am.password_hash
            FROM authentication_methods am
            JOIN users u ON u.id = am.user_id
            JOIN user_channels uc ON uc.user_id = u.id
            WHERE am.id = $1
              AND am.kind = 'native'
              AND uc.channel_id = $2
            "#,
        )
        .bind(method_id)
        .bind(ctx.channel_id())
        .fetch_optional(&self.pool)
        .await
        .map_err(StoreError::Database)?;

        Ok(row.and_then(|(hash,)| hash))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_method_row_native() {
        let row = AuthMethodRow {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            kind: "native".to_string(),
            strategy: None,
            external_identifier: None,
        };

        let method = AuthenticationMethod::try_from(row).expect("native row should convert");
        assert_eq!(method.kind, AuthenticationMethodKind::Native);
    }

    #[test]
    fn test_auth_method_row_external() {
        let row = AuthMethodRow {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            kind: "external".to_string(),
            strategy: Some("google".to_string()),
            external_identifier: Some("google-uid-1".to_string()),
        };

        let method = AuthenticationMethod::try_from(row).expect("external row should convert");
        assert!(matches!(
            method.kind,
            AuthenticationMethodKind::External { .. }
        ));
    }

    #[test]
    fn test_auth_method_row_external_missing_strategy() {
        let row = AuthMethodRow {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            kind: "external".to_string(),
            strategy: None,
            external_identifier: Some("google-uid-1".to_string()),
        };

        assert!(AuthenticationMethod::try_from(row).is_err());
    }

    #[test]
    fn test_auth_method_row_unknown_kind() {
        let row = AuthMethodRow {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            kind: "biometric".to_string(),
            strategy: None,
            external_identifier: None,
        };

        assert!(AuthenticationMethod::try_from(row).is_err());
    }

    // Database-backed tests require a running PostgreSQL instance; see
    // tests/ for the store contract tests that run against the in-memory
    // implementation instead.
}
