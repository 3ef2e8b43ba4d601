//! In-memory key-value cache.

use async_trait::async_trait;
use parking_lot::Mutex;
use penstock_core::{CacheStore, StoreResult};
use std::collections::HashMap;
use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
struct CacheEntry {
    value: String,
    expires_at: Instant,
}

/// An in-memory [`CacheStore`] honoring per-entry expiration on read.
///
/// # Example
///
/// ```
/// use penstock_test::MemoryCache;
/// use penstock_core::CacheStore;
/// use std::time::Duration;
///
/// # tokio_test::block_on(async {
/// let cache = MemoryCache::new();
/// cache.set("greeting", "hello", Duration::from_secs(60)).await.unwrap();
/// assert_eq!(cache.get("greeting").await.unwrap().as_deref(), Some("hello"));
/// # });
/// ```
#[derive(Debug, Default)]
pub struct MemoryCache {
    entries: Mutex<HashMap<String, CacheEntry>>,
}

impl MemoryCache {
    /// Creates an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns how many live (unexpired) entries the cache holds.
    #[must_use]
    pub fn len(&self) -> usize {
        let now = Instant::now();
        self.entries
            .lock()
            .values()
            .filter(|entry| entry.expires_at > now)
            .count()
    }

    /// Returns `true` if the cache holds no live entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl CacheStore for MemoryCache {
    async fn get(&self, key: &str) -> StoreResult<Option<String>> {
        let mut entries = self.entries.lock();
        match entries.get(key) {
            Some(entry) if entry.expires_at > Instant::now() => Ok(Some(entry.value.clone())),
            Some(_) => {
                entries.remove(key);
                Ok(None)
            }
            None => Ok(None),
        }
    }

    async fn set(&self, key: &str, value: &str, expiry: Duration) -> StoreResult<()> {
        self.entries.lock().insert(
            key.to_string(),
            CacheEntry {
                value: value.to_string(),
                expires_at: Instant::now() + expiry,
            },
        );
        Ok(())
    }

    async fn delete(&self, key: &str) -> StoreResult<u64> {
        Ok(u64::from(self.entries.lock().remove(key).is_some()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_set_then_get_round_trips() {
        let cache = MemoryCache::new();
        cache
            .set("books:1", r#"{"title":"Dune"}"#, Duration::from_secs(60))
            .await
            .unwrap();

        let value = cache.get("books:1").await.unwrap();
        assert_eq!(value.as_deref(), Some(r#"{"title":"Dune"}"#));
    }

    #[tokio::test]
    async fn test_get_miss_is_none() {
        let cache = MemoryCache::new();
        assert!(cache.get("absent").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_expired_entry_is_a_miss() {
        let cache = MemoryCache::new();
        cache
            .set("ephemeral", "x", Duration::from_millis(5))
            .await
            .unwrap();
        std::thread::sleep(Duration::from_millis(10));

        assert!(cache.get("ephemeral").await.unwrap().is_none());
        assert!(cache.is_empty());
    }

    #[tokio::test]
    async fn test_delete_reports_removed_count() {
        let cache = MemoryCache::new();
        cache.set("k", "v", Duration::from_secs(60)).await.unwrap();

        assert_eq!(cache.delete("k").await.unwrap(), 1);
        assert_eq!(cache.delete("k").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_set_overwrites_value_and_expiry() {
        let cache = MemoryCache::new();
        cache.set("k", "old", Duration::from_secs(60)).await.unwrap();
        cache.set("k", "new", Duration::from_secs(60)).await.unwrap();

        assert_eq!(cache.get("k").await.unwrap().as_deref(), Some("new"));
        assert_eq!(cache.len(), 1);
    }
}
