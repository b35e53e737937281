//! # Collection Authorization Context
//!
//! Decides which collections an identity may read or write, and issues and
//! verifies the signed session tokens carrying that identity.
//!
//! ## Features
//!
//! - **Implicit role sets** built from role records (guest, authenticated user, groups)
//! - **Two-tier grant caching**: per-context memo plus a shared key-value cache
//! - **Explicit invalidation** of cached grants, globally or per role
//! - **Scoped, expiring JWT session tokens** that fail soft on bad input
//! - **Pluggable collaborators** for permission store, role store, cache and codec
//!
//! ## Example
//!
//! ```rust
//! use collection_authz::{
//!     Action, AuthzEngine, AuthzSettings, Grant, InMemoryCache, InMemoryPermissionStore,
//!     InMemoryRoleStore, Role,
//! };
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let permissions = InMemoryPermissionStore::new();
//! permissions.grant(5, 42, Grant::read()).await;
//!
//! let engine = AuthzEngine::new(
//!     AuthzSettings::new("s3cret"),
//!     Arc::new(permissions),
//!     Arc::new(InMemoryRoleStore::new()),
//!     Arc::new(InMemoryCache::new()),
//! )?;
//!
//! let alice = Role::new(5, "alice");
//! let authz = engine.from_role(Some(&alice));
//! assert!(authz.can(42, Action::Read).await?);
//!
//! let token = authz.to_token(Some("download"), None, None)?;
//! let restored = engine.from_token(Some(&token), Some("download")).unwrap();
//! assert_eq!(restored.id(), Some(5));
//! # Ok(())
//! # }
//! ```

pub mod cache;
pub mod config;
pub mod context;
pub mod decision;
pub mod engine;
pub mod error;
pub mod resolver;
pub mod store;
pub mod token;
pub mod types;

// Re-export commonly used types
pub use cache::{CacheStats, InMemoryCache, SharedCache};
pub use config::AuthzSettings;
pub use context::Authz;
pub use engine::AuthzEngine;
pub use error::{AuthzError, Result};
pub use store::{
    Grant, InMemoryPermissionStore, InMemoryRoleStore, PermissionStore, RoleStore, SYSTEM_GUEST,
    SYSTEM_USER,
};
pub use token::{JwtTokenCodec, SessionClaims, TokenCodec};
pub use types::{Action, Collection, CollectionId, EntityRef, Role, RoleId, RoleType};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
