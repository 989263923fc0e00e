/// End-to-end tests for native credential authentication
///
/// These tests run the full path — registry dispatch, identifier lookup,
/// id-based verification, Argon2 check — over the in-memory store, so they
/// need no running database. Store-specific behavior is covered by the unit
/// tests next to each store implementation.

use std::sync::Arc;

use argon2::ParamsBuilder;
use chrono::Utc;
use credence::hasher::{Argon2idHasher, PasswordHasher};
use credence::registry::StrategyRegistry;
use credence::store::memory::InMemoryUserStore;
use credence::strategy::native::NativeCredentialStrategy;
use credence::strategy::StrategyDependencies;
use credence::user::{AuthenticationMethod, AuthenticationMethodKind, Role, User};
use credence::{AuthError, AuthOutcome, RequestContext};
use serde_json::json;
use uuid::Uuid;

/// Reduced Argon2 cost keeps the suite fast; parameter handling itself is
/// asserted in the hasher's own tests.
fn test_hasher() -> Arc<Argon2idHasher> {
    let params = ParamsBuilder::new()
        .m_cost(1024)
        .t_cost(2)
        .p_cost(1)
        .output_len(32)
        .build()
        .expect("valid test parameters");
    Arc::new(Argon2idHasher::with_params(params))
}

struct Fixture {
    store: Arc<InMemoryUserStore>,
    hasher: Arc<Argon2idHasher>,
    channel: Uuid,
}

impl Fixture {
    fn new() -> Self {
        Self {
            store: Arc::new(InMemoryUserStore::new()),
            hasher: test_hasher(),
            channel: Uuid::new_v4(),
        }
    }

    fn ctx(&self) -> RequestContext {
        RequestContext::new(self.channel)
    }

    async fn registry(&self) -> StrategyRegistry {
        let deps =
            StrategyDependencies::with_hasher(self.store.clone(), self.hasher.clone());
        StrategyRegistry::initialize(vec![Arc::new(NativeCredentialStrategy::new())], &deps)
            .await
            .expect("registry should initialize")
    }

    async fn strategy(&self) -> NativeCredentialStrategy {
        let strategy = NativeCredentialStrategy::new();
        let deps =
            StrategyDependencies::with_hasher(self.store.clone(), self.hasher.clone());
        use credence::strategy::AuthenticationStrategy;
        strategy.init(&deps).await.expect("init should succeed");
        strategy
    }

    /// Seeds a user with a native credential; returns the user id.
    async fn seed_native_user(&self, identifier: &str, password: &str) -> Uuid {
        let user_id = Uuid::new_v4();
        let method_id = Uuid::new_v4();
        let hash = self.hasher.hash(password).await.expect("hash should succeed");

        self.store.add_user(
            self.channel,
            User {
                id: user_id,
                identifier: identifier.to_string(),
                verified: true,
                deleted_at: None,
                roles: vec![Role {
                    id: Uuid::new_v4(),
                    code: "customer".to_string(),
                    permissions: vec!["Authenticated".to_string()],
                    channel_ids: vec![self.channel],
                }],
                authentication_methods: vec![AuthenticationMethod {
                    id: method_id,
                    user_id,
                    kind: AuthenticationMethodKind::Native,
                }],
                created_at: Utc::now(),
                updated_at: Utc::now(),
            },
            Some((method_id, hash)),
        );
        user_id
    }

    /// Seeds a user whose only authentication method is an external provider.
    fn seed_external_user(&self, identifier: &str) -> Uuid {
        let user_id = Uuid::new_v4();
        self.store.add_user(
            self.channel,
            User {
                id: user_id,
                identifier: identifier.to_string(),
                verified: true,
                deleted_at: None,
                roles: vec![],
                authentication_methods: vec![AuthenticationMethod {
                    id: Uuid::new_v4(),
                    user_id,
                    kind: AuthenticationMethodKind::External {
                        strategy: "google".to_string(),
                        external_identifier: format!("google-{}", identifier),
                    },
                }],
                created_at: Utc::now(),
                updated_at: Utc::now(),
            },
            None,
        );
        user_id
    }
}

fn native_credentials(username: &str, password: &str) -> serde_json::Value {
    json!({ "username": username, "password": password })
}

#[tokio::test]
async fn test_correct_password_returns_the_user() {
    let fixture = Fixture::new();
    let alice_id = fixture.seed_native_user("alice", "s3cret").await;
    let registry = fixture.registry().await;

    let outcome = registry
        .authenticate("native", &fixture.ctx(), native_credentials("alice", "s3cret"))
        .await
        .expect("authenticate should not error");

    let user = outcome.into_user().expect("alice should authenticate");
    assert_eq!(user.id, alice_id);
    assert_eq!(user.identifier, "alice");
    // Associations come back eagerly loaded for downstream callers.
    assert_eq!(user.roles.len(), 1);
    assert_eq!(user.authentication_methods.len(), 1);
}

#[tokio::test]
async fn test_wrong_password_is_no_match() {
    let fixture = Fixture::new();
    fixture.seed_native_user("alice", "s3cret").await;
    let registry = fixture.registry().await;

    let outcome = registry
        .authenticate("native", &fixture.ctx(), native_credentials("alice", "wrong"))
        .await
        .expect("authenticate should not error");

    assert!(outcome.is_no_match());
}

#[tokio::test]
async fn test_unknown_identifier_is_no_match() {
    let fixture = Fixture::new();
    fixture.seed_native_user("alice", "s3cret").await;
    let registry = fixture.registry().await;

    let outcome = registry
        .authenticate("native", &fixture.ctx(), native_credentials("bob", "s3cret"))
        .await
        .expect("authenticate should not error");

    assert!(outcome.is_no_match());
}

/// The collapse of distinct failure causes into one outcome is intentional
/// (it prevents user enumeration), not an oversight. A refactor that
/// returns differentiated reasons would reintroduce the leak.
#[tokio::test]
async fn test_failure_causes_are_indistinguishable() {
    let fixture = Fixture::new();
    fixture.seed_native_user("alice", "s3cret").await;
    fixture.seed_external_user("carol");
    let registry = fixture.registry().await;
    let ctx = fixture.ctx();

    let unknown_user = registry
        .authenticate("native", &ctx, native_credentials("bob", "s3cret"))
        .await
        .expect("authenticate should not error");
    let wrong_password = registry
        .authenticate("native", &ctx, native_credentials("alice", "wrong"))
        .await
        .expect("authenticate should not error");
    let no_native_method = registry
        .authenticate("native", &ctx, native_credentials("carol", "anything"))
        .await
        .expect("authenticate should not error");

    assert_eq!(unknown_user, AuthOutcome::NoMatch);
    assert_eq!(wrong_password, AuthOutcome::NoMatch);
    assert_eq!(no_native_method, AuthOutcome::NoMatch);
    assert_eq!(unknown_user, wrong_password);
}

#[tokio::test]
async fn test_external_only_user_never_passes_password_check() {
    let fixture = Fixture::new();
    let carol_id = fixture.seed_external_user("carol");
    let strategy = fixture.strategy().await;
    let ctx = fixture.ctx();

    for password in ["", "password", "google-carol"] {
        let verified = strategy
            .verify_user_password(&ctx, carol_id, password)
            .await
            .expect("verify should not error");
        assert!(!verified, "external-only user must fail for '{}'", password);
    }
}

#[tokio::test]
async fn test_soft_deleted_user_never_authenticates() {
    let fixture = Fixture::new();
    let user_id = fixture.seed_native_user("alice", "s3cret").await;
    let registry = fixture.registry().await;
    let ctx = fixture.ctx();

    // Sanity: authenticates before deletion.
    let before = registry
        .authenticate("native", &ctx, native_credentials("alice", "s3cret"))
        .await
        .expect("authenticate should not error");
    assert!(!before.is_no_match());

    // Soft-delete and reseed the same record.
    let mut user = before.into_user().expect("authenticated user");
    let method_id = user.authentication_methods[0].id;
    user.deleted_at = Some(Utc::now());
    fixture.store.remove_user(user_id);
    let hash = fixture.hasher.hash("s3cret").await.expect("hash should succeed");
    fixture
        .store
        .add_user(fixture.channel, user, Some((method_id, hash)));

    let after = registry
        .authenticate("native", &ctx, native_credentials("alice", "s3cret"))
        .await
        .expect("authenticate should not error");
    assert!(after.is_no_match(), "soft-deleted user must not authenticate");

    // The id-based verification path refuses deleted users too.
    let strategy = fixture.strategy().await;
    let verified = strategy
        .verify_user_password(&ctx, user_id, "s3cret")
        .await
        .expect("verify should not error");
    assert!(!verified);
}

#[tokio::test]
async fn test_authenticate_is_idempotent_against_unchanged_state() {
    let fixture = Fixture::new();
    fixture.seed_native_user("alice", "s3cret").await;
    let registry = fixture.registry().await;
    let ctx = fixture.ctx();

    let first = registry
        .authenticate("native", &ctx, native_credentials("alice", "s3cret"))
        .await
        .expect("authenticate should not error");
    let second = registry
        .authenticate("native", &ctx, native_credentials("alice", "s3cret"))
        .await
        .expect("authenticate should not error");
    assert_eq!(first, second);

    let miss_first = registry
        .authenticate("native", &ctx, native_credentials("alice", "wrong"))
        .await
        .expect("authenticate should not error");
    let miss_second = registry
        .authenticate("native", &ctx, native_credentials("alice", "wrong"))
        .await
        .expect("authenticate should not error");
    assert_eq!(miss_first, miss_second);
}

#[tokio::test]
async fn test_unknown_strategy_is_distinct_from_no_match() {
    let fixture = Fixture::new();
    fixture.seed_native_user("alice", "s3cret").await;
    let registry = fixture.registry().await;

    let result = registry
        .authenticate(
            "nonexistent-strategy",
            &fixture.ctx(),
            native_credentials("alice", "s3cret"),
        )
        .await;

    // A configuration fault surfaces as an error, never as the quiet
    // NoMatch an authentication failure produces.
    match result {
        Err(AuthError::UnknownStrategy(name)) => assert_eq!(name, "nonexistent-strategy"),
        Ok(outcome) => panic!("expected UnknownStrategy error, got outcome {:?}", outcome),
        Err(other) => panic!("expected UnknownStrategy error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_verify_user_password_supports_reauthentication() {
    let fixture = Fixture::new();
    let alice_id = fixture.seed_native_user("alice", "s3cret").await;
    let strategy = fixture.strategy().await;
    let ctx = fixture.ctx();

    // Re-auth on a sensitive operation: caller already knows the user id.
    assert!(strategy
        .verify_user_password(&ctx, alice_id, "s3cret")
        .await
        .expect("verify should not error"));
    assert!(!strategy
        .verify_user_password(&ctx, alice_id, "wrong")
        .await
        .expect("verify should not error"));
}

#[tokio::test]
async fn test_schema_fragments_expose_native_shape() {
    let fixture = Fixture::new();
    let registry = fixture.registry().await;

    let fragments = registry.input_schema_fragments();
    assert_eq!(fragments.len(), 1);
    assert_eq!(fragments[0].name, "native");
    assert_eq!(
        fragments[0].schema["required"],
        json!(["username", "password"])
    );
}
