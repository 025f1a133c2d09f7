use std::time::{Duration, Instant};

use dashmap::DashMap;
use serde_json::Value;

/// Named, expiring, fully-invalidated materialized views.
///
/// Both the per-locale category tree and the flat settings map are cached
/// through this trait. Invalidation granularity is a whole entry; writers
/// evict every key they might have affected rather than patching values in
/// place. Implementations must tolerate concurrent populate-on-miss from
/// multiple readers: the computation is idempotent, so duplicate writes of
/// the same value are wasted work, not corruption.
pub trait ViewCache: Send + Sync {
    /// Returns the cached value, or `None` if absent or expired.
    fn get(&self, key: &str) -> Option<Value>;

    /// Stores `value` under `key`, replacing any previous entry. The entry
    /// expires `ttl` after this call unless evicted first.
    fn put(&self, key: &str, value: Value, ttl: Duration);

    /// Drops the entry for `key` if present.
    fn evict(&self, key: &str);
}

struct CacheEntry {
    value: Value,
    expires_at: Instant,
}

/// Process-local `ViewCache` backed by a concurrent map.
#[derive(Default)]
pub struct MemoryViewCache {
    entries: DashMap<String, CacheEntry>,
}

impl MemoryViewCache {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ViewCache for MemoryViewCache {
    fn get(&self, key: &str) -> Option<Value> {
        if let Some(entry) = self.entries.get(key) {
            if entry.expires_at > Instant::now() {
                return Some(entry.value.clone());
            }
        }
        // Expired entries are dropped lazily on the next read. The shard
        // guard from `get` must be released before removing.
        self.entries.remove(key);
        None
    }

    fn put(&self, key: &str, value: Value, ttl: Duration) {
        self.entries.insert(
            key.to_string(),
            CacheEntry {
                value,
                expires_at: Instant::now() + ttl,
            },
        );
    }

    fn evict(&self, key: &str) {
        self.entries.remove(key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_put_then_get() {
        let cache = MemoryViewCache::new();
        cache.put("settings", json!({"site_name": "Kedai"}), Duration::from_secs(60));

        assert_eq!(
            cache.get("settings"),
            Some(json!({"site_name": "Kedai"}))
        );
    }

    #[test]
    fn test_miss_on_unknown_key() {
        let cache = MemoryViewCache::new();
        assert_eq!(cache.get("categories:en-MY"), None);
    }

    #[test]
    fn test_entry_expires() {
        let cache = MemoryViewCache::new();
        cache.put("categories:en-MY", json!([]), Duration::from_millis(20));

        assert!(cache.get("categories:en-MY").is_some());
        std::thread::sleep(Duration::from_millis(40));
        assert_eq!(cache.get("categories:en-MY"), None);
    }

    #[test]
    fn test_evict_removes_entry() {
        let cache = MemoryViewCache::new();
        cache.put("categories:en-MY", json!([]), Duration::from_secs(60));
        cache.evict("categories:en-MY");

        assert_eq!(cache.get("categories:en-MY"), None);
    }

    #[test]
    fn test_put_replaces_existing_value() {
        let cache = MemoryViewCache::new();
        cache.put("settings", json!({"v": 1}), Duration::from_secs(60));
        cache.put("settings", json!({"v": 2}), Duration::from_secs(60));

        assert_eq!(cache.get("settings"), Some(json!({"v": 2})));
    }
}
