// src/client/cache.rs
// DOCUMENTATION: Time-boxed in-memory cache for API responses
// PURPOSE: Avoid repeating identical read requests within the TTL window

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

/// Default freshness window (5 minutes)
pub const DEFAULT_TTL: Duration = Duration::from_secs(300);

/// Cache entry stamped with its insertion time
#[derive(Clone, Debug)]
struct CacheEntry<T> {
    data: T,
    stored_at: Instant,
}

impl<T> CacheEntry<T> {
    fn new(data: T) -> Self {
        Self {
            data,
            stored_at: Instant::now(),
        }
    }

    /// Fresh while `now - stored_at < ttl`
    fn is_fresh(&self, ttl: Duration) -> bool {
        self.stored_at.elapsed() < ttl
    }
}

/// Key/value cache with a single TTL
/// DOCUMENTATION: Stale entries are never served; they read as misses
pub struct RequestCache<T> {
    store: RwLock<HashMap<String, CacheEntry<T>>>,
    ttl: Duration,
}

impl<T: Clone> Default for RequestCache<T> {
    fn default() -> Self {
        Self::new(DEFAULT_TTL)
    }
}

impl<T: Clone> RequestCache<T> {
    pub fn new(ttl: Duration) -> Self {
        Self {
            store: RwLock::new(HashMap::new()),
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Get cached value if still fresh
    pub async fn get(&self, key: &str) -> Option<T> {
        let store = self.store.read().await;

        match store.get(key) {
            Some(entry) if entry.is_fresh(self.ttl) => {
                log::debug!("Cache HIT for key: {}", key);
                Some(entry.data.clone())
            }
            Some(_) => {
                log::debug!("Cache EXPIRED for key: {}", key);
                None
            }
            None => {
                log::debug!("Cache MISS for key: {}", key);
                None
            }
        }
    }

    /// Store a value stamped with the current time, replacing any prior entry
    pub async fn put(&self, key: String, value: T) {
        let mut store = self.store.write().await;
        log::debug!("Cache SET for key: {} (TTL: {}s)", key, self.ttl.as_secs());
        store.insert(key, CacheEntry::new(value));
    }

    /// Remove keys containing `pattern`, or everything when no pattern is given
    /// Returns the number of removed entries
    pub async fn invalidate(&self, pattern: Option<&str>) -> usize {
        let mut store = self.store.write().await;
        let before = store.len();
        match pattern {
            Some(p) => store.retain(|key, _| !key.contains(p)),
            None => store.clear(),
        }
        let removed = before - store.len();
        log::debug!(
            "Cache invalidated {} entries (pattern: {})",
            removed,
            pattern.unwrap_or("*")
        );
        removed
    }

    /// Drop entries past their TTL
    pub async fn purge_expired(&self) -> usize {
        let mut store = self.store.write().await;
        let before = store.len();
        let ttl = self.ttl;
        store.retain(|_, entry| entry.is_fresh(ttl));
        before - store.len()
    }

    pub async fn stats(&self) -> CacheStats {
        let store = self.store.read().await;
        let total = store.len();
        let expired = store.values().filter(|e| !e.is_fresh(self.ttl)).count();

        CacheStats {
            total_entries: total,
            expired_entries: expired,
            active_entries: total - expired,
        }
    }
}

/// Cache statistics
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheStats {
    pub total_entries: usize,
    pub expired_entries: usize,
    pub active_entries: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_cache_put_get() {
        let cache = RequestCache::new(Duration::from_secs(60));
        cache.put("key".to_string(), "value".to_string()).await;
        assert_eq!(cache.get("key").await, Some("value".to_string()));
        assert_eq!(cache.get("other").await, None);
    }

    #[tokio::test]
    async fn test_put_overwrites() {
        let cache = RequestCache::new(Duration::from_secs(60));
        cache.put("key".to_string(), 1).await;
        cache.put("key".to_string(), 2).await;
        assert_eq!(cache.get("key").await, Some(2));
    }

    #[tokio::test]
    async fn test_cache_expiration() {
        let cache = RequestCache::new(Duration::from_millis(50));
        cache.put("key".to_string(), "value".to_string()).await;
        assert!(cache.get("key").await.is_some());

        tokio::time::sleep(Duration::from_millis(80)).await;

        assert!(cache.get("key").await.is_none());
        let stats = cache.stats().await;
        assert_eq!(stats.expired_entries, 1);
        assert_eq!(cache.purge_expired().await, 1);
        assert_eq!(cache.stats().await.total_entries, 0);
    }

    #[tokio::test]
    async fn test_invalidate_by_pattern() {
        let cache = RequestCache::new(Duration::from_secs(60));
        cache.put("http://api/api/projects|GET".to_string(), 1).await;
        cache.put("http://api/api/projects/3|GET".to_string(), 2).await;
        cache.put("http://api/api/blog|GET".to_string(), 3).await;

        assert_eq!(cache.invalidate(Some("/api/projects")).await, 2);
        assert!(cache.get("http://api/api/blog|GET").await.is_some());

        assert_eq!(cache.invalidate(None).await, 1);
        assert_eq!(cache.stats().await.total_entries, 0);
    }
}
