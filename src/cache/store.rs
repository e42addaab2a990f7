//! Time-bounded key/value store.

use std::collections::HashMap;
use std::hash::Hash;
use std::time::Duration;

use parking_lot::RwLock;
use tokio::time::Instant;

/// A stored value and the instant it stops being fresh.
#[derive(Debug, Clone)]
pub struct CacheEntry<V> {
    pub value: V,
    pub expires_at: Instant,
}

impl<V> CacheEntry<V> {
    fn is_fresh(&self, now: Instant) -> bool {
        now < self.expires_at
    }
}

/// Thread-safe map from key to value with a per-entry expiry.
///
/// Expired entries are reported as misses but stay in place until they are
/// overwritten, purged to make room, or the store is cleared. Without a
/// capacity limit the store grows with the number of distinct keys.
#[derive(Debug)]
pub struct CacheStore<K, V> {
    entries: RwLock<HashMap<K, CacheEntry<V>>>,
    max_entries: Option<usize>,
}

impl<K, V> CacheStore<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    /// Create an unbounded store.
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            max_entries: None,
        }
    }

    /// Create a store holding at most `max_entries` keys.
    pub fn with_max_entries(max_entries: usize) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            max_entries: Some(max_entries.max(1)),
        }
    }

    /// The fresh value for `key`, if any.
    pub fn get(&self, key: &K) -> Option<V> {
        let now = Instant::now();
        self.entries
            .read()
            .get(key)
            .filter(|entry| entry.is_fresh(now))
            .map(|entry| entry.value.clone())
    }

    /// Insert or replace the entry for `key`, fresh for `ttl` from now.
    pub fn put(&self, key: K, value: V, ttl: Duration) {
        let now = Instant::now();
        let entry = CacheEntry {
            value,
            expires_at: now + ttl,
        };

        let mut entries = self.entries.write();
        if let Some(max) = self.max_entries {
            if entries.len() >= max && !entries.contains_key(&key) {
                make_room(&mut entries, max, now);
            }
        }
        entries.insert(key, entry);
    }

    /// Number of stored entries, fresh or not.
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    pub fn clear(&self) {
        self.entries.write().clear();
    }
}

impl<K, V> Default for CacheStore<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    fn default() -> Self {
        Self::new()
    }
}

/// Drop expired entries, then the entries closest to expiry, until one more
/// key fits.
fn make_room<K, V>(entries: &mut HashMap<K, CacheEntry<V>>, max: usize, now: Instant)
where
    K: Eq + Hash + Clone,
{
    entries.retain(|_, entry| entry.is_fresh(now));
    while entries.len() >= max {
        let oldest = entries
            .iter()
            .min_by_key(|(_, entry)| entry.expires_at)
            .map(|(key, _)| key.clone());
        match oldest {
            Some(key) => {
                entries.remove(&key);
            }
            None => break,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    const TTL: Duration = Duration::from_secs(30);

    #[test]
    fn get_returns_fresh_value() {
        let store = CacheStore::new();
        store.put("a", 1, TTL);
        assert_eq!(store.get(&"a"), Some(1));
        assert_eq!(store.get(&"b"), None);
    }

    #[test]
    fn put_overwrites_wholesale() {
        let store = CacheStore::new();
        store.put("a", 1, TTL);
        store.put("a", 2, TTL);
        assert_eq!(store.get(&"a"), Some(2));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn zero_ttl_is_immediately_stale() {
        let store = CacheStore::new();
        store.put("a", 1, Duration::ZERO);
        assert_eq!(store.get(&"a"), None);
    }

    #[tokio::test(start_paused = true)]
    async fn entries_expire_after_ttl() {
        let store = CacheStore::new();
        store.put("a", 1, TTL);

        tokio::time::advance(TTL - Duration::from_millis(1)).await;
        assert_eq!(store.get(&"a"), Some(1));

        tokio::time::advance(Duration::from_millis(1)).await;
        assert_eq!(store.get(&"a"), None);
    }

    #[tokio::test(start_paused = true)]
    async fn expired_entries_are_kept_by_get() {
        let store = CacheStore::new();
        store.put("a", 1, TTL);
        tokio::time::advance(TTL * 2).await;

        assert_eq!(store.get(&"a"), None);
        assert_eq!(store.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn refresh_resets_expiry() {
        let store = CacheStore::new();
        store.put("a", 1, TTL);
        tokio::time::advance(TTL).await;
        store.put("a", 2, TTL);
        tokio::time::advance(TTL / 2).await;
        assert_eq!(store.get(&"a"), Some(2));
    }

    #[tokio::test(start_paused = true)]
    async fn capacity_purges_expired_entries_first() {
        let store = CacheStore::with_max_entries(2);
        store.put("short", 1, Duration::from_secs(1));
        store.put("long", 2, TTL);
        tokio::time::advance(Duration::from_secs(2)).await;

        store.put("new", 3, TTL);
        assert_eq!(store.len(), 2);
        assert_eq!(store.get(&"long"), Some(2));
        assert_eq!(store.get(&"new"), Some(3));
    }

    #[test]
    fn capacity_evicts_entry_closest_to_expiry() {
        let store = CacheStore::with_max_entries(2);
        store.put("soon", 1, Duration::from_secs(10));
        store.put("later", 2, Duration::from_secs(60));
        store.put("new", 3, TTL);

        assert_eq!(store.len(), 2);
        assert_eq!(store.get(&"soon"), None);
        assert_eq!(store.get(&"later"), Some(2));
        assert_eq!(store.get(&"new"), Some(3));
    }

    #[test]
    fn overwriting_at_capacity_evicts_nothing() {
        let store = CacheStore::with_max_entries(2);
        store.put("a", 1, TTL);
        store.put("b", 2, TTL);
        store.put("a", 3, TTL);
        assert_eq!(store.get(&"a"), Some(3));
        assert_eq!(store.get(&"b"), Some(2));
    }

    #[test]
    fn clear_empties_the_store() {
        let store = CacheStore::new();
        store.put("a", 1, TTL);
        assert!(!store.is_empty());
        store.clear();
        assert!(store.is_empty());
    }

    #[test]
    fn concurrent_writers_and_readers() {
        use std::thread;

        let store = Arc::new(CacheStore::new());
        let mut handles = vec![];
        for t in 0..8 {
            let store = store.clone();
            handles.push(thread::spawn(move || {
                for i in 0..100 {
                    store.put((t, i), i, TTL);
                    assert_eq!(store.get(&(t, i)), Some(i));
                }
            }));
        }
        for h in handles {
            h.join().unwrap();
        }
        assert_eq!(store.len(), 800);
    }
}
