//! Cache Statistics Module
//!
//! Counts lookups served from cache, lookups that missed, and lazy expirations.

use serde::Serialize;

// == Cache Stats ==
/// Lookup counters for the cache store.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CacheStats {
    /// Lookups answered from a valid entry
    pub hits: u64,
    /// Lookups that found no valid entry (absent or expired)
    pub misses: u64,
    /// Entries removed because a read found them expired
    pub expirations: u64,
    /// Entries currently stored, including expired ones not yet read
    pub total_entries: usize,
}

impl CacheStats {
    // == Constructor ==
    /// Creates a new CacheStats with all counters at zero.
    pub fn new() -> Self {
        Self::default()
    }

    // == Hit Rate ==
    /// Calculates the cache hit rate.
    ///
    /// Returns hits / (hits + misses), or 0.0 before any lookup.
    pub fn hit_rate(&self) -> f64 {
        let lookups = self.hits + self.misses;
        if lookups == 0 {
            0.0
        } else {
            self.hits as f64 / lookups as f64
        }
    }

    // == Record Hit ==
    /// Increments the hit counter.
    pub fn record_hit(&mut self) {
        self.hits += 1;
    }

    // == Record Miss ==
    /// Increments the miss counter.
    pub fn record_miss(&mut self) {
        self.misses += 1;
    }

    // == Record Expiration ==
    /// An expired read counts both as an expiration and as a miss.
    pub fn record_expiration(&mut self) {
        self.expirations += 1;
        self.misses += 1;
    }
}
