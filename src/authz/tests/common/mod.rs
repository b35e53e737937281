//! Shared fixtures for integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use collection_authz::{
    Action, AuthzEngine, AuthzError, AuthzSettings, CollectionId, Grant, InMemoryCache,
    InMemoryPermissionStore, InMemoryRoleStore, PermissionStore, Result, RoleId,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

pub const SECRET: &str = "test-secret";

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Permission store that counts the queries reaching it
#[derive(Clone, Default)]
pub struct CountingStore {
    pub inner: InMemoryPermissionStore,
    queries: Arc<AtomicUsize>,
}

impl CountingStore {
    pub fn queries(&self) -> usize {
        self.queries.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PermissionStore for CountingStore {
    async fn distinct_collection_ids(
        &self,
        roles: &[RoleId],
        action: Action,
    ) -> Result<Vec<CollectionId>> {
        self.queries.fetch_add(1, Ordering::SeqCst);
        self.inner.distinct_collection_ids(roles, action).await
    }

    async fn all_collection_ids(&self) -> Result<Vec<CollectionId>> {
        self.queries.fetch_add(1, Ordering::SeqCst);
        self.inner.all_collection_ids().await
    }
}

/// Permission store that is always down
pub struct UnavailableStore;

#[async_trait]
impl PermissionStore for UnavailableStore {
    async fn distinct_collection_ids(&self, _: &[RoleId], _: Action) -> Result<Vec<CollectionId>> {
        Err(AuthzError::Store("connection refused".to_string()))
    }

    async fn all_collection_ids(&self) -> Result<Vec<CollectionId>> {
        Err(AuthzError::Store("connection refused".to_string()))
    }
}

pub struct Fixture {
    pub engine: AuthzEngine,
    pub store: CountingStore,
    pub roles: InMemoryRoleStore,
    pub cache: InMemoryCache,
}

/// Engine over in-memory collaborators with a few grants:
///
/// - group 10 reads collection 1 and read-writes collection 2
/// - role 5 read-writes collection 3
/// - the guest role reads collection 4
/// - collection 42 has no grants at all
pub async fn fixture(settings: AuthzSettings) -> Fixture {
    init_tracing();

    let store = CountingStore::default();
    store.inner.grant(10, 1, Grant::read()).await;
    store.inner.grant(10, 2, Grant::read_write()).await;
    store.inner.grant(5, 3, Grant::read_write()).await;
    store.inner.grant(collection_authz::SYSTEM_GUEST, 4, Grant::read()).await;
    store.inner.add_collection(42).await;

    let roles = InMemoryRoleStore::new();
    let cache = InMemoryCache::new();
    let engine = AuthzEngine::new(
        settings,
        Arc::new(store.clone()),
        Arc::new(roles.clone()),
        Arc::new(cache.clone()),
    )
    .expect("engine");

    Fixture {
        engine,
        store,
        roles,
        cache,
    }
}

pub async fn default_fixture() -> Fixture {
    fixture(AuthzSettings::new(SECRET)).await
}
