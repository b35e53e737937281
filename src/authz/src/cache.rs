//! Shared key-value cache contract
//!
//! Grant sets are shared across contexts through a hash-style cache: entries
//! live under a namespace and can be dropped one by one or a namespace at a
//! time. The production engine (Redis or similar) sits behind [`SharedCache`];
//! [`InMemoryCache`] serves single-process deployments and tests.

use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::error::Result;

/// Shared cache trait
///
/// Implementations must make each call atomic on whole entries.
#[async_trait]
pub trait SharedCache: Send + Sync {
    /// Read one entry of a namespace
    async fn hash_get(&self, namespace: &str, key: &str) -> Result<Option<Vec<u8>>>;

    /// Write one entry of a namespace, optionally bounded by a TTL
    async fn hash_set(
        &self,
        namespace: &str,
        key: &str,
        value: Vec<u8>,
        ttl: Option<Duration>,
    ) -> Result<()>;

    /// Drop the given entries of a namespace
    async fn hash_delete(&self, namespace: &str, keys: &[String]) -> Result<()>;

    /// Drop a whole namespace
    async fn delete_namespace(&self, namespace: &str) -> Result<()>;
}

/// Cached entry with optional TTL
#[derive(Debug, Clone)]
struct CachedEntry {
    value: Vec<u8>,
    cached_at: Instant,
    ttl: Option<Duration>,
}

impl CachedEntry {
    fn new(value: Vec<u8>, ttl: Option<Duration>) -> Self {
        Self {
            value,
            cached_at: Instant::now(),
            ttl,
        }
    }

    fn is_expired(&self) -> bool {
        self.ttl.is_some_and(|ttl| self.cached_at.elapsed() > ttl)
    }
}

/// In-process shared cache
///
/// Clones share the same storage, so one instance can be handed to several
/// engines the way a network cache would be.
#[derive(Clone, Default)]
pub struct InMemoryCache {
    entries: Arc<DashMap<(String, String), CachedEntry>>,
    stats: Arc<DashMap<String, usize>>,
}

impl InMemoryCache {
    /// Create an empty cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Get cache statistics
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.get_stat("hits"),
            misses: self.get_stat("misses"),
            expirations: self.get_stat("expirations"),
            entries: self
                .entries
                .iter()
                .filter(|entry| !entry.value().is_expired())
                .count(),
        }
    }

    /// Number of live entries in a namespace
    pub fn namespace_len(&self, namespace: &str) -> usize {
        self.entries
            .iter()
            .filter(|entry| entry.key().0 == namespace && !entry.value().is_expired())
            .count()
    }

    /// Drop an entry only if it is still expired; a concurrent `hash_set`
    /// may have replaced it since it was read.
    fn evict_expired(&self, cache_key: &(String, String)) {
        self.entries.remove_if(cache_key, |_, entry| entry.is_expired());
    }

    fn increment_stat(&self, key: &str) {
        self.stats
            .entry(key.to_string())
            .and_modify(|count| *count += 1)
            .or_insert(1);
    }

    fn get_stat(&self, key: &str) -> usize {
        self.stats.get(key).map(|v| *v).unwrap_or(0)
    }
}

#[async_trait]
impl SharedCache for InMemoryCache {
    async fn hash_get(&self, namespace: &str, key: &str) -> Result<Option<Vec<u8>>> {
        let cache_key = (namespace.to_string(), key.to_string());

        let value = self
            .entries
            .get(&cache_key)
            .map(|entry| (!entry.is_expired()).then(|| entry.value.clone()));

        match value {
            Some(Some(value)) => {
                self.increment_stat("hits");
                Ok(Some(value))
            }
            Some(None) => {
                self.evict_expired(&cache_key);
                self.increment_stat("expirations");
                self.increment_stat("misses");
                Ok(None)
            }
            None => {
                self.increment_stat("misses");
                Ok(None)
            }
        }
    }

    async fn hash_set(
        &self,
        namespace: &str,
        key: &str,
        value: Vec<u8>,
        ttl: Option<Duration>,
    ) -> Result<()> {
        self.entries.insert(
            (namespace.to_string(), key.to_string()),
            CachedEntry::new(value, ttl),
        );
        Ok(())
    }

    async fn hash_delete(&self, namespace: &str, keys: &[String]) -> Result<()> {
        for key in keys {
            self.entries.remove(&(namespace.to_string(), key.clone()));
        }
        Ok(())
    }

    async fn delete_namespace(&self, namespace: &str) -> Result<()> {
        self.entries.retain(|(ns, _), _| ns != namespace);
        Ok(())
    }
}

/// Cache statistics
#[derive(Debug, Clone, Default)]
pub struct CacheStats {
    pub hits: usize,
    pub misses: usize,
    pub expirations: usize,
    pub entries: usize,
}

impl CacheStats {
    /// Calculate cache hit rate
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}
