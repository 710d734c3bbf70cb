//! Cache Entry Module
//!
//! Defines a single stored value: its serialized text and an optional deadline.

use std::time::{Duration, Instant};

// == Cache Entry ==
/// Represents a single cache entry: serialized value plus expiry metadata.
///
/// The store never interprets `raw_value`; typing happens at the codec boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheEntry {
    /// Serialized value (JSON text)
    pub raw_value: String,
    /// Monotonic deadline, None = no expiration
    pub expires_at: Option<Instant>,
}

impl CacheEntry {
    // == Constructor ==
    /// Creates a new cache entry with an optional TTL measured from now.
    pub fn new(raw_value: impl Into<String>, ttl: Option<Duration>) -> Self {
        let now = Instant::now();
        Self {
            raw_value: raw_value.into(),
            expires_at: ttl.map(|ttl| now + ttl),
        }
    }

    /// Creates an entry that keeps an already computed deadline.
    pub fn with_deadline(raw_value: impl Into<String>, expires_at: Option<Instant>) -> Self {
        Self {
            raw_value: raw_value.into(),
            expires_at,
        }
    }

    // == Is Expired ==
    /// Checks if the entry is logically expired right now.
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Instant::now())
    }

    /// Checks expiry against a fixed instant.
    ///
    /// An entry is expired only once `now` is strictly past its deadline.
    pub fn is_expired_at(&self, now: Instant) -> bool {
        match self.expires_at {
            Some(deadline) => now > deadline,
            None => false,
        }
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use std::thread::sleep;

    #[test]
    fn test_entry_creation_no_ttl() {
        let entry = CacheEntry::new("\"value\"", None);

        assert_eq!(entry.raw_value, "\"value\"");
        assert!(entry.expires_at.is_none());
        assert!(!entry.is_expired());
    }

    #[test]
    fn test_entry_creation_with_ttl() {
        let entry = CacheEntry::new("1", Some(Duration::from_secs(60)));

        assert!(entry.expires_at.is_some());
        assert!(!entry.is_expired());
    }

    #[test]
    fn test_entry_expiration() {
        let entry = CacheEntry::new("1", Some(Duration::from_millis(10)));

        assert!(!entry.is_expired());

        sleep(Duration::from_millis(30));

        assert!(entry.is_expired());
    }

    #[test]
    fn test_expiration_boundary_is_strict() {
        let now = Instant::now();
        let entry = CacheEntry::with_deadline("1", Some(now));

        // Exactly at the deadline the entry is still live
        assert!(!entry.is_expired_at(now));
        assert!(entry.is_expired_at(now + Duration::from_millis(1)));
    }
}
