//! Cache Service Module
//!
//! The public face of the cache. Every operation first waits out a simulated
//! network delay, then touches the shared store exactly once.

use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, warn};

use crate::cache::codec;
use crate::cache::{CacheEntry, CacheStats, CacheStore, KeyPattern, LatencySimulator, Operation};
use crate::error::Result;

// == Cache Service ==
/// Typed key-value operations over a shared [`CacheStore`].
///
/// Cloning is cheap: clones share the same store.
#[derive(Debug, Clone)]
pub struct CacheService {
    store: Arc<CacheStore>,
    latency: LatencySimulator,
}

impl CacheService {
    // == Constructor ==
    pub fn new(store: Arc<CacheStore>, latency: LatencySimulator) -> Self {
        Self { store, latency }
    }

    /// Returns the shared store, e.g. to hand it to the reaper.
    pub fn store(&self) -> &Arc<CacheStore> {
        &self.store
    }

    // == Get ==
    /// Returns the value under `key`, or None if it is missing or expired.
    ///
    /// Expired entries are removed on the way out. An entry that cannot be
    /// decoded as `T` is also treated as a miss and removed.
    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        self.latency.delay(Operation::Get).await;
        let stats = self.store.stats();

        let Some(entry) = self.store.get(key) else {
            stats.record_miss();
            return None;
        };

        if entry.is_expired() {
            self.evict_expired(key);
            stats.record_miss();
            return None;
        }

        match codec::decode(&entry.raw_value) {
            Ok(value) => {
                stats.record_hit();
                Some(value)
            }
            Err(err) => {
                warn!(key, error = %err, "Evicting cache entry that failed to decode");
                self.store.remove_matching(key, &entry);
                stats.record_decode_failure();
                stats.record_miss();
                None
            }
        }
    }

    // == Set ==
    /// Stores `value` under `key`, replacing any previous value and TTL.
    ///
    /// Fails only if `value` cannot be serialized, in which case nothing is stored.
    pub async fn set<T: Serialize + ?Sized>(
        &self,
        key: &str,
        value: &T,
        ttl: Option<Duration>,
    ) -> Result<()> {
        self.latency.delay(Operation::Set).await;
        let raw = codec::encode(value)?;
        self.store.put(key, CacheEntry::new(raw, ttl));
        Ok(())
    }

    // == Set If Not Exists ==
    /// Stores `value` only if `key` is physically absent from the store.
    ///
    /// An expired entry that has not been evicted yet still blocks the insert.
    pub async fn set_if_not_exists<T: Serialize + ?Sized>(
        &self,
        key: &str,
        value: &T,
        ttl: Option<Duration>,
    ) -> Result<bool> {
        self.latency.delay(Operation::SetIfNotExists).await;
        let raw = codec::encode(value)?;
        Ok(self.store.compare_insert(key, CacheEntry::new(raw, ttl)))
    }

    // == Delete ==
    /// Removes `key`, returning whether anything was stored under it.
    pub async fn delete(&self, key: &str) -> bool {
        self.latency.delay(Operation::Delete).await;
        self.store.remove(key)
    }

    // == Exists ==
    /// Reports whether a live entry is stored under `key`.
    pub async fn exists(&self, key: &str) -> bool {
        self.latency.delay(Operation::Exists).await;
        match self.store.get(key) {
            Some(entry) if entry.is_expired() => {
                self.evict_expired(key);
                false
            }
            Some(_) => true,
            None => false,
        }
    }

    // == Increment / Decrement ==
    /// Adds one to the counter under `key` and returns the new value.
    ///
    /// A missing or expired key starts from 0. A value that is not an integer
    /// is overwritten with 1.
    pub async fn increment(&self, key: &str) -> i64 {
        self.latency.delay(Operation::Increment).await;
        self.adjust(key, 1)
    }

    /// Subtracts one from the counter under `key` and returns the new value.
    ///
    /// A missing or expired key starts from 0. A value that is not an integer
    /// is overwritten with -1.
    pub async fn decrement(&self, key: &str) -> i64 {
        self.latency.delay(Operation::Decrement).await;
        self.adjust(key, -1)
    }

    fn adjust(&self, key: &str, delta: i64) -> i64 {
        let now = Instant::now();
        let mut result = delta;

        self.store.atomic_update(key, |current| match current {
            Some(entry) if !entry.is_expired_at(now) => {
                result = match codec::parse_counter(&entry.raw_value) {
                    Some(n) => n.saturating_add(delta),
                    None => {
                        debug!(key, "Counter value is not an integer, resetting");
                        delta
                    }
                };
                CacheEntry::with_deadline(result.to_string(), entry.expires_at)
            }
            _ => CacheEntry::new(delta.to_string(), None),
        });

        result
    }

    // == Get Keys ==
    /// Lists live keys matching `pattern` in ascending order.
    ///
    /// `"*"` lists every key; otherwise keys must contain `pattern` with its
    /// `*` characters removed. Scanning never evicts.
    pub async fn get_keys(&self, pattern: &str) -> Vec<String> {
        self.latency.delay(Operation::ScanKeys).await;
        self.store
            .keys_matching(&KeyPattern::parse(pattern), Instant::now())
    }

    // == Introspection ==
    /// Number of entries physically held, including expired ones not yet reaped.
    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    pub fn stats(&self) -> CacheStats {
        self.store.stats().snapshot(self.store.len())
    }

    fn evict_expired(&self, key: &str) {
        if self.store.remove_if_expired(key, Instant::now()) {
            self.store.stats().record_lazy_eviction();
            debug!(key, "Lazily evicted expired entry");
        }
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::{json, Value};

    fn service() -> CacheService {
        CacheService::new(Arc::new(CacheStore::new()), LatencySimulator::disabled())
    }

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Session {
        user: String,
        roles: Vec<String>,
    }

    #[tokio::test]
    async fn test_get_missing_key() {
        let cache = service();
        assert_eq!(cache.get::<Value>("never").await, None);
        assert!(!cache.exists("never").await);
        assert_eq!(cache.stats().misses, 1);
    }

    #[tokio::test]
    async fn test_set_then_get_struct() {
        let cache = service();
        let session = Session {
            user: "ada".to_string(),
            roles: vec!["admin".to_string()],
        };

        cache.set("session:1", &session, None).await.unwrap();

        assert_eq!(cache.get::<Session>("session:1").await, Some(session));
        assert!(cache.exists("session:1").await);
        assert_eq!(cache.stats().hits, 1);
    }

    #[tokio::test]
    async fn test_set_overwrites_ttl() {
        let cache = service();
        cache
            .set("k", &json!(1), Some(Duration::from_millis(10)))
            .await
            .unwrap();
        cache.set("k", &json!(2), None).await.unwrap();

        tokio::time::sleep(Duration::from_millis(30)).await;

        assert_eq!(cache.get::<i64>("k").await, Some(2));
    }

    #[tokio::test]
    async fn test_expired_get_evicts() {
        let cache = service();
        cache
            .set("temp", "value", Some(Duration::from_millis(10)))
            .await
            .unwrap();

        tokio::time::sleep(Duration::from_millis(50)).await;

        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get::<String>("temp").await, None);
        assert_eq!(cache.len(), 0);
        assert!(!cache.exists("temp").await);
        assert_eq!(cache.stats().lazy_evictions, 1);
    }

    #[tokio::test]
    async fn test_expired_exists_evicts() {
        let cache = service();
        cache
            .set("temp", "value", Some(Duration::from_millis(10)))
            .await
            .unwrap();

        tokio::time::sleep(Duration::from_millis(50)).await;

        assert!(!cache.exists("temp").await);
        assert!(cache.is_empty());
    }

    #[tokio::test]
    async fn test_decode_failure_is_miss_and_evicts() {
        let cache = service();
        cache.set("name", "ada", None).await.unwrap();

        assert_eq!(cache.get::<i64>("name").await, None);
        assert!(cache.is_empty());

        let stats = cache.stats();
        assert_eq!(stats.decode_failures, 1);
        assert_eq!(stats.misses, 1);
    }

    #[tokio::test]
    async fn test_set_if_not_exists() {
        let cache = service();

        assert!(cache.set_if_not_exists("lock", "v1", None).await.unwrap());
        assert!(!cache.set_if_not_exists("lock", "v2", None).await.unwrap());
        assert_eq!(cache.get::<String>("lock").await.as_deref(), Some("v1"));
    }

    #[tokio::test]
    async fn test_set_if_not_exists_blocked_by_unreaped_expired_entry() {
        let cache = service();
        cache
            .set("lock", "old", Some(Duration::from_millis(10)))
            .await
            .unwrap();

        tokio::time::sleep(Duration::from_millis(50)).await;

        assert!(!cache.set_if_not_exists("lock", "new", None).await.unwrap());

        // Once a read evicts the stale entry the insert succeeds
        assert!(!cache.exists("lock").await);
        assert!(cache.set_if_not_exists("lock", "new", None).await.unwrap());
    }

    #[tokio::test]
    async fn test_delete() {
        let cache = service();
        cache.set("k", &1, None).await.unwrap();

        assert!(cache.delete("k").await);
        assert!(!cache.delete("k").await);
        assert_eq!(cache.get::<i64>("k").await, None);
    }

    #[tokio::test]
    async fn test_counter_sequence() {
        let cache = service();

        assert_eq!(cache.increment("c").await, 1);
        assert_eq!(cache.increment("c").await, 2);
        assert_eq!(cache.decrement("c").await, 1);
        assert_eq!(cache.get::<i64>("c").await, Some(1));
    }

    #[tokio::test]
    async fn test_decrement_fresh_key() {
        let cache = service();
        assert_eq!(cache.decrement("d").await, -1);
        assert_eq!(cache.decrement("d").await, -2);
    }

    #[tokio::test]
    async fn test_counter_resets_malformed_value() {
        let cache = service();
        cache.set("k", "abc", None).await.unwrap();
        assert_eq!(cache.increment("k").await, 1);

        cache.set("j", &json!({"n": 4}), None).await.unwrap();
        assert_eq!(cache.decrement("j").await, -1);
    }

    #[tokio::test]
    async fn test_counter_continues_from_stored_integer() {
        let cache = service();
        cache.set("k", &41, None).await.unwrap();
        assert_eq!(cache.increment("k").await, 42);
    }

    #[tokio::test]
    async fn test_counter_keeps_ttl_of_live_entry() {
        let cache = service();
        cache
            .set("k", &5, Some(Duration::from_millis(20)))
            .await
            .unwrap();
        assert_eq!(cache.increment("k").await, 6);

        tokio::time::sleep(Duration::from_millis(60)).await;

        assert_eq!(cache.get::<i64>("k").await, None);
    }

    #[tokio::test]
    async fn test_counter_restarts_after_expiry() {
        let cache = service();
        cache
            .set("k", &5, Some(Duration::from_millis(10)))
            .await
            .unwrap();

        tokio::time::sleep(Duration::from_millis(50)).await;

        assert_eq!(cache.increment("k").await, 1);
        assert!(cache.store().get("k").unwrap().expires_at.is_none());
    }

    #[tokio::test]
    async fn test_counter_saturates() {
        let cache = service();
        cache.set("max", &i64::MAX, None).await.unwrap();
        assert_eq!(cache.increment("max").await, i64::MAX);
    }

    #[tokio::test]
    async fn test_get_keys() {
        let cache = service();
        cache.set("user:1", &1, None).await.unwrap();
        cache.set("user:2", &2, None).await.unwrap();
        cache.set("product:1", &3, None).await.unwrap();
        cache
            .set("user:temp", &4, Some(Duration::from_millis(10)))
            .await
            .unwrap();

        tokio::time::sleep(Duration::from_millis(50)).await;

        assert_eq!(
            cache.get_keys("*").await,
            vec!["product:1", "user:1", "user:2"]
        );
        assert_eq!(cache.get_keys("user").await, vec!["user:1", "user:2"]);
        assert_eq!(cache.get_keys("*user*").await, vec!["user:1", "user:2"]);
        assert!(cache.get_keys("nothing").await.is_empty());
        // The expired key is still held until something evicts it
        assert_eq!(cache.len(), 4);
    }
}
