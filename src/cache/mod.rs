use async_trait::async_trait;
use moka::sync::Cache;
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

/// Collection holding fully resolved permission trees
pub const ROLE_PERMISSIONS: &str = "role_permissions";
/// Collection holding filtered college screens
pub const MASTER_SCREEN: &str = "master_screen";

const MAX_FIELDS_PER_COLLECTION: u64 = 10_000;

/// Keyed cache addressed by `(collection, field)`, invalidated a whole
/// collection at a time.
#[async_trait]
pub trait CacheStore: Send + Sync {
    async fn get_collection_from_cache(&self, collection: &str, field: &str) -> Option<Value>;

    async fn store_collection_in_cache(&self, value: Value, collection: &str, field: &str);

    /// Drop every field cached under `api_updated`
    async fn cache_invalidation(&self, api_updated: &str);
}

/// In-process cache with an optional time to live per field
pub struct MemoryCache {
    collections: Cache<String, Cache<String, Value>>,
    ttl: Option<Duration>,
}

impl MemoryCache {
    pub fn new(ttl: Option<Duration>) -> Self {
        Self {
            collections: Cache::new(64),
            ttl,
        }
    }

    fn new_collection(&self) -> Cache<String, Value> {
        let builder = Cache::builder().max_capacity(MAX_FIELDS_PER_COLLECTION);
        match self.ttl {
            Some(ttl) => builder.time_to_live(ttl).build(),
            None => builder.build(),
        }
    }
}

#[async_trait]
impl CacheStore for MemoryCache {
    async fn get_collection_from_cache(&self, collection: &str, field: &str) -> Option<Value> {
        let hit = self.collections.get(collection)?.get(field);
        debug!(collection, field, hit = hit.is_some(), "Cache lookup");
        hit
    }

    async fn store_collection_in_cache(&self, value: Value, collection: &str, field: &str) {
        let fields = self
            .collections
            .get_with(collection.to_string(), || self.new_collection());
        fields.insert(field.to_string(), value);
    }

    async fn cache_invalidation(&self, api_updated: &str) {
        self.collections.invalidate(api_updated);
        debug!(collection = api_updated, "Cache invalidated");
    }
}

/// Cache used when caching is switched off
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopCache;

#[async_trait]
impl CacheStore for NoopCache {
    async fn get_collection_from_cache(&self, _collection: &str, _field: &str) -> Option<Value> {
        None
    }

    async fn store_collection_in_cache(&self, _value: Value, _collection: &str, _field: &str) {}

    async fn cache_invalidation(&self, _api_updated: &str) {}
}
