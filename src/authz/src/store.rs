//! Role and permission store contracts
//!
//! The persistent stores live outside this crate. Only the queries the
//! authorization context needs are described here, along with in-memory
//! implementations for embedding and tests.

use async_trait::async_trait;
use std::collections::{BTreeSet, HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::error::Result;
use crate::types::{Action, CollectionId, Role, RoleId};

/// Well-known role id every context belongs to
pub const SYSTEM_GUEST: RoleId = 1;

/// Well-known role id every logged-in context belongs to
pub const SYSTEM_USER: RoleId = 2;

/// Permission store trait
#[async_trait]
pub trait PermissionStore: Send + Sync {
    /// Distinct collection ids on which any of `roles` is granted `action`
    async fn distinct_collection_ids(
        &self,
        roles: &[RoleId],
        action: Action,
    ) -> Result<Vec<CollectionId>>;

    /// Every collection id in the system
    async fn all_collection_ids(&self) -> Result<Vec<CollectionId>>;
}

/// Role store trait
#[async_trait]
pub trait RoleStore: Send + Sync {
    /// Load a role by ID
    async fn load_role_by_id(&self, id: RoleId) -> Result<Option<Role>>;

    /// Ids of the roles shared by everyone (guest, authenticated users)
    async fn public_role_ids(&self) -> Result<HashSet<RoleId>>;

    /// Id of the guest role
    fn guest_role_id(&self) -> RoleId {
        SYSTEM_GUEST
    }

    /// Id of the authenticated-user role
    fn user_role_id(&self) -> RoleId {
        SYSTEM_USER
    }
}

/// Read/write flags granted to one role on one collection
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Grant {
    pub read: bool,
    pub write: bool,
}

impl Grant {
    pub fn read() -> Self {
        Self {
            read: true,
            write: false,
        }
    }

    pub fn read_write() -> Self {
        Self {
            read: true,
            write: true,
        }
    }

    fn allows(&self, action: Action) -> bool {
        match action {
            Action::Read => self.read,
            Action::Write => self.write,
        }
    }
}

/// In-memory permission store implementation
#[derive(Clone, Default)]
pub struct InMemoryPermissionStore {
    collections: Arc<RwLock<BTreeSet<CollectionId>>>,
    grants: Arc<RwLock<HashMap<(RoleId, CollectionId), Grant>>>,
}

impl InMemoryPermissionStore {
    /// Create a new in-memory permission store
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a collection
    pub async fn add_collection(&self, collection_id: CollectionId) {
        self.collections.write().await.insert(collection_id);
    }

    /// Set the grant of `role_id` on `collection_id`, registering the collection
    pub async fn grant(&self, role_id: RoleId, collection_id: CollectionId, grant: Grant) {
        self.add_collection(collection_id).await;
        self.grants.write().await.insert((role_id, collection_id), grant);
    }

    /// Remove any grant of `role_id` on `collection_id`
    pub async fn revoke(&self, role_id: RoleId, collection_id: CollectionId) {
        self.grants.write().await.remove(&(role_id, collection_id));
    }
}

#[async_trait]
impl PermissionStore for InMemoryPermissionStore {
    async fn distinct_collection_ids(
        &self,
        roles: &[RoleId],
        action: Action,
    ) -> Result<Vec<CollectionId>> {
        let grants = self.grants.read().await;
        let ids: BTreeSet<CollectionId> = grants
            .iter()
            .filter(|((role_id, _), grant)| roles.contains(role_id) && grant.allows(action))
            .map(|((_, collection_id), _)| *collection_id)
            .collect();
        Ok(ids.into_iter().collect())
    }

    async fn all_collection_ids(&self) -> Result<Vec<CollectionId>> {
        let collections = self.collections.read().await;
        Ok(collections.iter().copied().collect())
    }
}

/// In-memory role store implementation
#[derive(Clone, Default)]
pub struct InMemoryRoleStore {
    roles: Arc<RwLock<HashMap<RoleId, Role>>>,
}

impl InMemoryRoleStore {
    /// Create a new in-memory role store
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a role
    pub async fn put(&self, role: Role) {
        self.roles.write().await.insert(role.id, role);
    }
}

#[async_trait]
impl RoleStore for InMemoryRoleStore {
    async fn load_role_by_id(&self, id: RoleId) -> Result<Option<Role>> {
        let roles = self.roles.read().await;
        Ok(roles.get(&id).cloned())
    }

    async fn public_role_ids(&self) -> Result<HashSet<RoleId>> {
        Ok([self.guest_role_id(), self.user_role_id()].into_iter().collect())
    }
}
