//! Cache Store Module
//!
//! Sharded, type-agnostic storage with per-key atomic read-modify-write.

use std::time::Instant;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

use crate::cache::{CacheEntry, StatsCounters};

// == Key Pattern ==
/// Key filter used by scans.
///
/// `"*"` matches everything. Any other pattern matches keys that contain it
/// once every `*` has been stripped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyPattern {
    All,
    Contains(String),
}

impl KeyPattern {
    pub fn parse(pattern: &str) -> Self {
        if pattern == "*" {
            return KeyPattern::All;
        }
        KeyPattern::Contains(pattern.replace('*', ""))
    }

    pub fn matches(&self, key: &str) -> bool {
        match self {
            KeyPattern::All => true,
            KeyPattern::Contains(needle) => key.contains(needle.as_str()),
        }
    }
}

// == Cache Store ==
/// Shared key -> entry map.
///
/// Each key lives in one shard of a `DashMap`; single-key operations lock only
/// that shard, and traversals lock one shard at a time.
#[derive(Debug, Default)]
pub struct CacheStore {
    /// Key-value storage
    entries: DashMap<String, CacheEntry>,
    /// Activity counters
    stats: StatsCounters,
}

impl CacheStore {
    // == Constructor ==
    pub fn new() -> Self {
        Self::default()
    }

    // == Get ==
    /// Returns a copy of the entry physically stored under `key`, expired or not.
    pub fn get(&self, key: &str) -> Option<CacheEntry> {
        self.entries.get(key).map(|entry| entry.value().clone())
    }

    // == Put ==
    /// Stores an entry, replacing any previous value and deadline.
    pub fn put(&self, key: impl Into<String>, entry: CacheEntry) {
        self.entries.insert(key.into(), entry);
    }

    // == Remove ==
    /// Removes `key`, returning whether an entry was present.
    pub fn remove(&self, key: &str) -> bool {
        self.entries.remove(key).is_some()
    }

    // == Compare Insert ==
    /// Inserts only if no entry is physically present under `key`.
    ///
    /// An entry that is expired but not yet evicted still counts as present.
    pub fn compare_insert(&self, key: impl Into<String>, entry: CacheEntry) -> bool {
        match self.entries.entry(key.into()) {
            Entry::Occupied(_) => false,
            Entry::Vacant(vacant) => {
                vacant.insert(entry);
                true
            }
        }
    }

    // == Atomic Update ==
    /// Reads the current entry and writes its replacement as one step.
    ///
    /// The shard lock for `key` is held while `update` runs, so concurrent
    /// updates to the same key are serialized and none is lost.
    pub fn atomic_update<F>(&self, key: &str, update: F) -> CacheEntry
    where
        F: FnOnce(Option<&CacheEntry>) -> CacheEntry,
    {
        match self.entries.entry(key.to_string()) {
            Entry::Occupied(mut occupied) => {
                let next = update(Some(occupied.get()));
                occupied.insert(next.clone());
                next
            }
            Entry::Vacant(vacant) => {
                let next = update(None);
                vacant.insert(next.clone());
                next
            }
        }
    }

    // == Remove If Expired ==
    /// Removes `key` only if the stored entry is expired as of `now`.
    ///
    /// The check runs under the shard lock, so a fresh value written after the
    /// caller observed the stale one survives.
    pub fn remove_if_expired(&self, key: &str, now: Instant) -> bool {
        self.entries
            .remove_if(key, |_, entry| entry.is_expired_at(now))
            .is_some()
    }

    /// Removes `key` only if it still holds exactly `expected`.
    pub fn remove_matching(&self, key: &str, expected: &CacheEntry) -> bool {
        self.entries
            .remove_if(key, |_, entry| entry == expected)
            .is_some()
    }

    // == Keys Matching ==
    /// Returns the sorted keys of live entries accepted by `pattern`.
    ///
    /// Expired entries are skipped but left in place.
    pub fn keys_matching(&self, pattern: &KeyPattern, now: Instant) -> Vec<String> {
        let mut keys: Vec<String> = self
            .entries
            .iter()
            .filter(|item| !item.value().is_expired_at(now) && pattern.matches(item.key()))
            .map(|item| item.key().clone())
            .collect();
        keys.sort_unstable();
        keys
    }

    // == Purge Expired ==
    /// Removes every entry expired as of `now`, returning how many were dropped.
    ///
    /// Keys are collected first so no shard guard is held while removing.
    pub fn purge_expired(&self, now: Instant) -> usize {
        let expired: Vec<String> = self
            .entries
            .iter()
            .filter(|item| item.value().is_expired_at(now))
            .map(|item| item.key().clone())
            .collect();

        expired
            .iter()
            .filter(|key| self.remove_if_expired(key, now))
            .count()
    }

    // == Stats ==
    pub fn stats(&self) -> &StatsCounters {
        &self.stats
    }

    // == Length ==
    /// Returns the number of physically present entries, expired ones included.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    // == Is Empty ==
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
