//! Cache Module
//!
//! Persisted lookup cache with TTL expiration checked on read.

mod clock;
mod entry;
mod stats;
mod store;

#[cfg(test)]
mod property_tests;

// Re-export public types
pub use clock::{Clock, ManualClock, SystemClock};
pub use entry::{CacheEntry, CachedValue};
pub use stats::CacheStats;
pub use store::{CacheStore, CACHE_NAMESPACE};
