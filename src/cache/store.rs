//! Cache Store Module
//!
//! Keyed lookup cache with a runtime-configurable TTL and eviction on read.
//! Mutations are written through to the persistence collaborator.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::cache::{CacheEntry, CacheStats, CachedValue, Clock, SystemClock};
use crate::error::Result;
use crate::persistence::Persistence;
use crate::settings::SettingsHandle;

/// Persistence namespace holding the whole cache map.
pub const CACHE_NAMESPACE: &str = "cv_cache";

// == Cache Store ==
/// Lookup cache keyed by listing identifier.
///
/// There is no background sweep: an expired entry stays in the map (and in
/// [`CacheStore::size`]) until a `get` for its key removes it.
pub struct CacheStore {
    /// Key-value storage
    entries: HashMap<String, CacheEntry>,
    /// Lookup statistics
    stats: CacheStats,
    /// Source of the TTL, read on every lookup
    settings: SettingsHandle,
    clock: Arc<dyn Clock>,
    persistence: Option<Arc<dyn Persistence>>,
}

impl CacheStore {
    // == Constructors ==
    /// Creates an empty, unpersisted store on the system clock.
    pub fn new(settings: SettingsHandle) -> Self {
        Self::with_clock(settings, Arc::new(SystemClock))
    }

    /// Creates an empty, unpersisted store on the given clock.
    pub fn with_clock(settings: SettingsHandle, clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: HashMap::new(),
            stats: CacheStats::new(),
            settings,
            clock,
            persistence: None,
        }
    }

    /// Restores the store from `persistence` and writes later changes back to it.
    pub fn load(
        persistence: Arc<dyn Persistence>,
        settings: SettingsHandle,
        clock: Arc<dyn Clock>,
    ) -> Result<Self> {
        let entries: HashMap<String, CacheEntry> =
            persistence.load(CACHE_NAMESPACE, HashMap::new())?;
        debug!("Restored {} cache entries", entries.len());

        Ok(Self {
            entries,
            stats: CacheStats::new(),
            settings,
            clock,
            persistence: Some(persistence),
        })
    }

    // == Get ==
    /// Returns the cached outcome for `key` if it exists and has not expired.
    ///
    /// An expired entry is deleted before `None` is returned.
    pub fn get(&mut self, key: &str) -> Option<CachedValue> {
        let now = self.clock.now_ms();
        let ttl_ms = self.settings.ttl_ms();

        let expired = match self.entries.get(key) {
            None => {
                self.stats.record_miss();
                return None;
            }
            Some(entry) => entry.is_expired(now, ttl_ms),
        };

        if expired {
            self.entries.remove(key);
            self.stats.record_expiration();
            debug!("Cache entry for {} expired", key);
            if let Err(e) = self.flush() {
                warn!("Failed to persist eviction of {}: {}", key, e);
            }
            return None;
        }

        self.stats.record_hit();
        self.entries.get(key).map(|entry| entry.value.clone())
    }

    // == Put ==
    /// Inserts or overwrites the entry for `key`, stamped with the current time.
    ///
    /// The in-memory map is updated even when persisting fails.
    pub fn put(&mut self, key: impl Into<String>, value: CachedValue) -> Result<()> {
        let entry = CacheEntry::new(value, self.clock.now_ms());
        self.entries.insert(key.into(), entry);
        self.flush()
    }

    // == Clear ==
    /// Removes every entry.
    pub fn clear(&mut self) -> Result<()> {
        self.entries.clear();
        self.flush()
    }

    // == Size ==
    /// Number of stored entries, expired-but-unread ones included.
    pub fn size(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    // == Stats ==
    /// Returns current cache statistics.
    pub fn stats(&self) -> CacheStats {
        let mut stats = self.stats.clone();
        stats.total_entries = self.entries.len();
        stats
    }

    fn flush(&self) -> Result<()> {
        match &self.persistence {
            Some(persistence) => persistence.store(CACHE_NAMESPACE, &self.entries),
            None => Ok(()),
        }
    }
}
