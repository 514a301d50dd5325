//! Cache Store Abstraction
//!
//! Read-aside cache over a distributed key-value store. Entries are
//! namespaced, TTL-expiring, and JSON-valued. Namespace invalidation
//! is generation-stamped: every key folds in a per-namespace
//! generation counter, and invalidating a namespace is a single
//! counter increment with no enumerate-and-delete sweep, so
//! invalidation is atomic under concurrent writers.
//!
//! Cache failures must never fail a request: implementations log and
//! degrade (a failed read is a miss, a failed write is dropped).

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use dashmap::DashMap;
use deadpool_redis::Pool;
use redis::AsyncCommands;
use serde_json::Value;

/// Build the storage key for one namespaced entry.
///
/// The generation sits between namespace and key so that bumping it
/// orphans every key of the namespace at once (orphans expire by TTL).
fn stamped_key(ns: &str, generation: u64, key: &str) -> String {
    format!("cache:{ns}:g{generation}:{key}")
}

fn generation_key(ns: &str) -> String {
    format!("cache_gen:{ns}")
}

/// Cache store contract
///
/// Object-safe so handlers can hold `Arc<dyn CacheStore>` and tests
/// can substitute the in-memory implementation.
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Read an entry. A store failure is a miss.
    async fn get(&self, ns: &str, key: &str) -> Option<Value>;

    /// Write an entry with a TTL. A store failure is dropped.
    async fn put(&self, ns: &str, key: &str, value: &Value, ttl: Duration);

    /// Point-delete one entry (detail pages).
    async fn delete(&self, ns: &str, key: &str);

    /// Invalidate every entry under a namespace (listing pages).
    async fn invalidate_namespace(&self, ns: &str);
}

// ============================================================================
// Redis implementation
// ============================================================================

/// Redis-backed cache store (multi-instance deployments)
pub struct RedisCacheStore {
    pool: Pool,
}

impl RedisCacheStore {
    pub fn new(pool: Pool) -> Self {
        Self { pool }
    }

    async fn current_generation(&self, conn: &mut deadpool_redis::Connection, ns: &str) -> u64 {
        match conn.get::<_, Option<u64>>(generation_key(ns)).await {
            Ok(generation) => generation.unwrap_or(0),
            Err(e) => {
                tracing::warn!(namespace = ns, error = %e, "Cache generation read failed");
                0
            }
        }
    }
}

#[async_trait]
impl CacheStore for RedisCacheStore {
    async fn get(&self, ns: &str, key: &str) -> Option<Value> {
        let mut conn = match self.pool.get().await {
            Ok(conn) => conn,
            Err(e) => {
                tracing::warn!(namespace = ns, error = %e, "Cache unavailable, treating as miss");
                return None;
            }
        };

        let generation = self.current_generation(&mut conn, ns).await;
        let raw: Option<String> = match conn.get(stamped_key(ns, generation, key)).await {
            Ok(raw) => raw,
            Err(e) => {
                tracing::warn!(namespace = ns, key, error = %e, "Cache read failed");
                return None;
            }
        };

        raw.and_then(|s| match serde_json::from_str(&s) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!(namespace = ns, key, error = %e, "Corrupt cache entry dropped");
                None
            }
        })
    }

    async fn put(&self, ns: &str, key: &str, value: &Value, ttl: Duration) {
        let mut conn = match self.pool.get().await {
            Ok(conn) => conn,
            Err(e) => {
                tracing::warn!(namespace = ns, error = %e, "Cache unavailable, write dropped");
                return;
            }
        };

        let generation = self.current_generation(&mut conn, ns).await;
        let payload = value.to_string();
        if let Err(e) = conn
            .set_ex::<_, _, ()>(stamped_key(ns, generation, key), payload, ttl.as_secs())
            .await
        {
            tracing::warn!(namespace = ns, key, error = %e, "Cache write failed");
        }
    }

    async fn delete(&self, ns: &str, key: &str) {
        let mut conn = match self.pool.get().await {
            Ok(conn) => conn,
            Err(e) => {
                tracing::warn!(namespace = ns, error = %e, "Cache unavailable, delete dropped");
                return;
            }
        };

        let generation = self.current_generation(&mut conn, ns).await;
        if let Err(e) = conn.del::<_, ()>(stamped_key(ns, generation, key)).await {
            tracing::warn!(namespace = ns, key, error = %e, "Cache delete failed");
        }
    }

    async fn invalidate_namespace(&self, ns: &str) {
        let mut conn = match self.pool.get().await {
            Ok(conn) => conn,
            Err(e) => {
                tracing::warn!(namespace = ns, error = %e, "Cache unavailable, invalidation dropped");
                return;
            }
        };

        match conn.incr::<_, _, u64>(generation_key(ns), 1).await {
            Ok(generation) => {
                tracing::debug!(namespace = ns, generation, "Cache namespace invalidated");
            }
            Err(e) => {
                tracing::warn!(namespace = ns, error = %e, "Cache invalidation failed");
            }
        }
    }
}

// ============================================================================
// In-memory implementation
// ============================================================================

struct MemoryEntry {
    value: Value,
    expires_at: Instant,
}

/// In-memory cache store (single-instance mode and tests)
#[derive(Clone, Default)]
pub struct MemoryCacheStore {
    entries: Arc<DashMap<String, MemoryEntry>>,
    generations: Arc<DashMap<String, u64>>,
}

impl MemoryCacheStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn generation(&self, ns: &str) -> u64 {
        self.generations.get(ns).map(|g| *g).unwrap_or(0)
    }
}

#[async_trait]
impl CacheStore for MemoryCacheStore {
    async fn get(&self, ns: &str, key: &str) -> Option<Value> {
        let storage_key = stamped_key(ns, self.generation(ns), key);
        let entry = self.entries.get(&storage_key)?;
        if entry.expires_at <= Instant::now() {
            drop(entry);
            self.entries.remove(&storage_key);
            return None;
        }
        Some(entry.value.clone())
    }

    async fn put(&self, ns: &str, key: &str, value: &Value, ttl: Duration) {
        let storage_key = stamped_key(ns, self.generation(ns), key);
        self.entries.insert(
            storage_key,
            MemoryEntry {
                value: value.clone(),
                expires_at: Instant::now() + ttl,
            },
        );
    }

    async fn delete(&self, ns: &str, key: &str) {
        let storage_key = stamped_key(ns, self.generation(ns), key);
        self.entries.remove(&storage_key);
    }

    async fn invalidate_namespace(&self, ns: &str) {
        *self.generations.entry(ns.to_string()).or_insert(0) += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const TTL: Duration = Duration::from_secs(60);

    #[tokio::test]
    async fn test_put_get_roundtrip() {
        let cache = MemoryCacheStore::new();
        let value = json!({"title": "Dune", "price": 9.99});
        cache.put("books:detail", "b1", &value, TTL).await;
        assert_eq!(cache.get("books:detail", "b1").await, Some(value));
    }

    #[tokio::test]
    async fn test_distinct_keys_do_not_collide() {
        let cache = MemoryCacheStore::new();
        cache.put("books:list", "c=Fiction", &json!(1), TTL).await;
        cache.put("books:list", "c=Folklore", &json!(2), TTL).await;
        assert_eq!(cache.get("books:list", "c=Fiction").await, Some(json!(1)));
        assert_eq!(cache.get("books:list", "c=Folklore").await, Some(json!(2)));
    }

    #[tokio::test]
    async fn test_expired_entry_is_a_miss() {
        let cache = MemoryCacheStore::new();
        cache
            .put("books:list", "p1", &json!([]), Duration::ZERO)
            .await;
        assert_eq!(cache.get("books:list", "p1").await, None);
    }

    #[tokio::test]
    async fn test_namespace_invalidation_drops_all_keys() {
        let cache = MemoryCacheStore::new();
        cache.put("books:list", "p1", &json!(1), TTL).await;
        cache.put("books:list", "p2", &json!(2), TTL).await;
        cache.put("books:detail", "b1", &json!(3), TTL).await;

        cache.invalidate_namespace("books:list").await;

        assert_eq!(cache.get("books:list", "p1").await, None);
        assert_eq!(cache.get("books:list", "p2").await, None);
        // Other namespaces are untouched
        assert_eq!(cache.get("books:detail", "b1").await, Some(json!(3)));
    }

    #[tokio::test]
    async fn test_point_delete() {
        let cache = MemoryCacheStore::new();
        cache.put("books:detail", "b1", &json!(1), TTL).await;
        cache.put("books:detail", "b2", &json!(2), TTL).await;

        cache.delete("books:detail", "b1").await;

        assert_eq!(cache.get("books:detail", "b1").await, None);
        assert_eq!(cache.get("books:detail", "b2").await, Some(json!(2)));
    }
}
