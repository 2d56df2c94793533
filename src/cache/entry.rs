//! Cache Entry Module
//!
//! A cached lookup outcome plus the time it was recorded.

use serde::{Deserialize, Serialize};

// == Cached Value ==
/// A definitive lookup outcome. Both variants are cacheable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CachedValue {
    /// The attribute exists with this value
    Found(String),
    /// The upstream confirmed the attribute does not exist
    NotFound,
}

impl CachedValue {
    /// Returns the found value, or None for a confirmed absence.
    pub fn as_found(&self) -> Option<&str> {
        match self {
            CachedValue::Found(value) => Some(value),
            CachedValue::NotFound => None,
        }
    }
}

// == Cache Entry ==
/// Represents a single cache entry with its creation time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheEntry {
    /// The stored outcome
    pub value: CachedValue,
    /// Creation timestamp (Unix milliseconds)
    pub timestamp: u64,
}

impl CacheEntry {
    // == Constructor ==
    /// Creates a new cache entry stamped at `now_ms`.
    ///
    /// # Arguments
    /// * `value` - The outcome to store
    /// * `now_ms` - Creation time (Unix milliseconds)
    pub fn new(value: CachedValue, now_ms: u64) -> Self {
        Self {
            value,
            timestamp: now_ms,
        }
    }

    // == Age ==
    /// Age of the entry at `now_ms`. A timestamp in the future counts as age zero.
    pub fn age_ms(&self, now_ms: u64) -> u64 {
        now_ms.saturating_sub(self.timestamp)
    }

    // == Is Expired ==
    /// Checks whether the entry has outlived `ttl_ms`.
    ///
    /// Boundary condition: the entry is valid only while `age < ttl`, so it
    /// expires at exactly `timestamp + ttl`.
    pub fn is_expired(&self, now_ms: u64, ttl_ms: u64) -> bool {
        self.age_ms(now_ms) >= ttl_ms
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    const DAY_MS: u64 = 86_400_000;

    #[test]
    fn test_fresh_entry_is_valid() {
        let entry = CacheEntry::new(CachedValue::Found("500000".into()), 1_000);
        assert!(!entry.is_expired(1_000, 7 * DAY_MS));
        assert_eq!(entry.value.as_found(), Some("500000"));
    }

    #[test]
    fn test_expiration_boundary_condition() {
        let entry = CacheEntry::new(CachedValue::NotFound, 0);

        assert!(!entry.is_expired(DAY_MS - 1, DAY_MS));
        assert!(entry.is_expired(DAY_MS, DAY_MS), "Entry should be expired at boundary");
    }

    #[test]
    fn test_future_timestamp_is_not_expired() {
        let entry = CacheEntry::new(CachedValue::NotFound, 10_000);
        assert_eq!(entry.age_ms(5_000), 0);
        assert!(!entry.is_expired(5_000, 1));
    }

    #[test]
    fn test_zero_ttl_expires_immediately() {
        let entry = CacheEntry::new(CachedValue::Found("1".into()), 42);
        assert!(entry.is_expired(42, 0));
    }

    #[test]
    fn test_serialized_shape() {
        let entry = CacheEntry::new(CachedValue::Found("750000".into()), 7);
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["value"]["found"], "750000");
        assert_eq!(json["timestamp"], 7);

        let absent = serde_json::to_value(CacheEntry::new(CachedValue::NotFound, 7)).unwrap();
        assert_eq!(absent["value"], "not_found");
    }
}
