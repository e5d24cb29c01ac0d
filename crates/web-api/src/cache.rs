//! Time-bounded memoization for request results.
//!
//! Keys are the JSON serialization of the request parameters, so two
//! requests share an entry exactly when their parameters serialize equally.

use serde::Serialize;
use std::collections::HashMap;
use std::future::Future;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::time::Instant;

struct CacheEntry<V> {
    value: V,
    inserted_at: Instant,
}

/// Map of values that expire `ttl` after insertion. A zero TTL stores nothing.
pub struct TtlCache<V> {
    ttl: Duration,
    entries: RwLock<HashMap<String, CacheEntry<V>>>,
}

impl<V: Clone> TtlCache<V> {
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: RwLock::new(HashMap::new()),
        }
    }

    #[must_use]
    pub fn from_secs(ttl_secs: u64) -> Self {
        Self::new(Duration::from_secs(ttl_secs))
    }

    #[must_use]
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Cache key for a set of request parameters.
    #[must_use]
    pub fn key<P: Serialize + ?Sized>(params: &P) -> String {
        serde_json::to_string(params).unwrap_or_default()
    }

    fn is_fresh(&self, entry: &CacheEntry<V>) -> bool {
        entry.inserted_at.elapsed() < self.ttl
    }

    /// Returns the value for `key` if it has not expired.
    pub async fn get(&self, key: &str) -> Option<V> {
        let entries = self.entries.read().await;
        entries
            .get(key)
            .filter(|entry| self.is_fresh(entry))
            .map(|entry| entry.value.clone())
    }

    /// Stores `value` under `key`, dropping every expired entry first.
    pub async fn insert(&self, key: impl Into<String>, value: V) {
        if self.ttl.is_zero() {
            return;
        }
        let entry = CacheEntry {
            value,
            inserted_at: Instant::now(),
        };
        let ttl = self.ttl;
        let mut entries = self.entries.write().await;
        entries.retain(|_, entry| entry.inserted_at.elapsed() < ttl);
        entries.insert(key.into(), entry);
    }

    /// Returns the cached value or computes, stores and returns a new one.
    ///
    /// Concurrent misses for the same key may each compute; the last write wins.
    pub async fn get_or_insert_with<F, Fut>(&self, key: impl Into<String>, compute: F) -> V
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = V>,
    {
        let key = key.into();
        if let Some(value) = self.get(&key).await {
            tracing::debug!(%key, "cache hit");
            return value;
        }
        let value = compute().await;
        self.insert(key, value.clone()).await;
        value
    }

    /// Drops expired entries and returns how many were removed.
    pub async fn purge_expired(&self) -> usize {
        let mut entries = self.entries.write().await;
        let before = entries.len();
        let ttl = self.ttl;
        entries.retain(|_, entry| entry.inserted_at.elapsed() < ttl);
        before - entries.len()
    }

    /// Number of stored entries, including ones that have expired but not been purged.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    pub async fn clear(&self) {
        self.entries.write().await.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_key_is_parameter_json() {
        assert_eq!(TtlCache::<u32>::key(&("forecast", 7, Some(30))), "[\"forecast\",7,30]");
        assert_ne!(TtlCache::<u32>::key(&("lag", 1)), TtlCache::<u32>::key(&("lag", 2)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_entries_expire_after_ttl() {
        let cache = TtlCache::from_secs(60);
        cache.insert("a", 1).await;
        assert_eq!(cache.get("a").await, Some(1));

        tokio::time::advance(Duration::from_secs(59)).await;
        assert_eq!(cache.get("a").await, Some(1));

        tokio::time::advance(Duration::from_secs(1)).await;
        assert_eq!(cache.get("a").await, None);
        assert_eq!(cache.purge_expired().await, 1);
        assert!(cache.is_empty().await);
    }

    #[tokio::test(start_paused = true)]
    async fn test_insert_evicts_expired_entries() {
        let cache = TtlCache::from_secs(60);
        cache.insert("2024-06-01", 1).await;
        cache.insert("2024-06-02", 2).await;

        tokio::time::advance(Duration::from_secs(61)).await;
        cache.insert("2024-06-03", 3).await;

        assert_eq!(cache.len().await, 1);
        assert_eq!(cache.get("2024-06-03").await, Some(3));
    }

    #[tokio::test]
    async fn test_get_or_insert_with_computes_once() {
        let cache = TtlCache::from_secs(60);
        let calls = AtomicUsize::new(0);

        for _ in 0..3 {
            let value = cache
                .get_or_insert_with("k", || async {
                    calls.fetch_add(1, Ordering::SeqCst);
                    42
                })
                .await;
            assert_eq!(value, 42);
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_zero_ttl_disables_caching() {
        let cache = TtlCache::from_secs(0);
        cache.insert("a", 1).await;
        assert_eq!(cache.get("a").await, None);
        assert_eq!(cache.len().await, 0);
    }
}
