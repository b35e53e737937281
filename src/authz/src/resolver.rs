//! Grant resolution with two-tier caching
//!
//! Lookup order for `(action, identity)`:
//!
//! 1. the context's own memo
//! 2. the shared cache, namespace [`GRANT_NAMESPACE`]
//! 3. the permission store (all collections for admins)
//!
//! Store results are written back to both tiers. Shared entries only go away
//! through [`AuthzEngine::flush`](crate::AuthzEngine::flush),
//! [`AuthzEngine::flush_role`](crate::AuthzEngine::flush_role) or the optional
//! grant cache TTL.

use blake3::Hasher;
use tracing::{debug, warn};

use crate::context::Authz;
use crate::error::Result;
use crate::types::{Action, CollectionId, RoleId};

/// Shared cache namespace holding grant sets
pub const GRANT_NAMESPACE: &str = "authz";

/// Compute the shared cache key of a grant set
pub fn grant_key(action: Action, identity: Option<RoleId>) -> String {
    let mut hasher = Hasher::new();
    hasher.update(action.as_str().as_bytes());
    hasher.update(b":");
    match identity {
        Some(id) => hasher.update(id.to_string().as_bytes()),
        None => hasher.update(b"anonymous"),
    };
    hasher.finalize().to_hex().to_string()
}

impl Authz {
    /// Collection ids this context may perform `action` on
    pub async fn collections(&self, action: Action) -> Result<Vec<CollectionId>> {
        if let Some(cached) = self.collections.get(&action) {
            return Ok(cached.value().clone());
        }

        let engine = &self.engine;
        let key = grant_key(action, self.id());

        if let Some(bytes) = engine.cache.hash_get(GRANT_NAMESPACE, &key).await? {
            match serde_json::from_slice::<Vec<CollectionId>>(&bytes) {
                Ok(collections) => {
                    self.collections.insert(action, collections.clone());
                    return Ok(collections);
                }
                Err(e) => warn!("Discarding undecodable grant cache entry for {}: {}", self, e),
            }
        }

        let collections = if self.is_admin() {
            engine.permissions.all_collection_ids().await?
        } else {
            let mut roles: Vec<RoleId> = self.roles().iter().copied().collect();
            roles.sort_unstable();
            engine.permissions.distinct_collection_ids(&roles, action).await?
        };
        debug!("Authz: {} ({}): {} collections", self, action, collections.len());

        let bytes = serde_json::to_vec(&collections)?;
        engine
            .cache
            .hash_set(GRANT_NAMESPACE, &key, bytes, engine.settings.grant_cache_ttl)
            .await?;
        self.collections.insert(action, collections.clone());
        Ok(collections)
    }
}
