//! # Credence
//!
//! Pluggable credential-authentication core for multi-tenant services.
//!
//! Given a set of user-supplied credentials, this crate determines whether
//! they identify a valid, known user — returning either the authenticated
//! [`User`] or a deliberately reason-free [`AuthOutcome::NoMatch`].
//!
//! ## Module Organization
//!
//! - `context`: request-scoped tenant/channel handle threaded through reads
//! - `error`: configuration-fault vs. infrastructure-fault taxonomy
//! - `hasher`: password hashing contract and the Argon2id implementation
//! - `user`: read-only identity records
//! - `store`: channel-scoped user store contract, Postgres and in-memory
//!   implementations
//! - `strategy`: the uniform strategy contract and the built-in
//!   username/password strategy
//! - `registry`: name-keyed dispatch, populated once at startup
//!
//! ## Security properties
//!
//! Unknown identifier, wrong password, missing native credential and
//! soft-deleted account all collapse into the same `NoMatch` outcome along
//! the same code-path shape — no user-enumeration or timing oracle. The
//! stored hash is reachable only through a dedicated minimal-projection
//! read, never as part of a general user fetch.
//!
//! Session/token issuance, lockout policy, MFA and audit logging are
//! layered above this crate by the surrounding system.
//!
//! ## Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use credence::hasher::Argon2idHasher;
//! use credence::registry::StrategyRegistry;
//! use credence::store::memory::InMemoryUserStore;
//! use credence::strategy::native::NativeCredentialStrategy;
//! use credence::strategy::StrategyDependencies;
//! use credence::RequestContext;
//! use serde_json::json;
//! use uuid::Uuid;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let deps = StrategyDependencies::with_hasher(
//!     Arc::new(InMemoryUserStore::new()),
//!     Arc::new(Argon2idHasher::new()),
//! );
//!
//! let registry = StrategyRegistry::initialize(
//!     vec![Arc::new(NativeCredentialStrategy::new())],
//!     &deps,
//! )
//! .await?;
//!
//! let ctx = RequestContext::new(Uuid::new_v4());
//! let outcome = registry
//!     .authenticate("native", &ctx, json!({"username": "alice", "password": "s3cret"}))
//!     .await?;
//!
//! match outcome.into_user() {
//!     Some(user) => println!("authenticated {}", user.identifier),
//!     None => println!("no match"),
//! }
//! # Ok(())
//! # }
//! ```

pub mod context;
pub mod error;
pub mod hasher;
pub mod registry;
pub mod store;
pub mod strategy;
pub mod user;

pub use context::RequestContext;
pub use error::{AuthError, AuthResult, HasherError, StoreError};
pub use strategy::{AuthOutcome, AuthenticationStrategy};
pub use user::User;

/// Current version of the credence library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
