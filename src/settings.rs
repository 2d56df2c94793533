//! Runtime Settings
//!
//! Process-wide, externally mutable settings shared by handle. Every read is
//! fresh, so a change takes effect on the next cache lookup or the next delay.

use std::sync::{Arc, RwLock};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::Result;
use crate::persistence::Persistence;

// == Defaults ==
pub const DEFAULT_TTL_DAYS: u64 = 7;
pub const DEFAULT_INTER_CALL_DELAY_MS: u64 = 250;

const MS_PER_DAY: u64 = 24 * 60 * 60 * 1000;

// Persistence namespaces, one per setting
const NS_TTL_DAYS: &str = "cache_days";
const NS_DELAY_MS: &str = "rate_limit_ms";
const NS_SEARCH: &str = "enable_search";
const NS_LISTING: &str = "enable_listing";

/// Snapshot of all runtime settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// Cache validity window in days
    pub ttl_days: u64,
    /// Pause after every lookup that was not served from cache
    pub inter_call_delay_ms: u64,
    /// Whether the search path accepts submissions
    pub search_enabled: bool,
    /// Whether the single-listing path accepts submissions
    pub listing_enabled: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            ttl_days: DEFAULT_TTL_DAYS,
            inter_call_delay_ms: DEFAULT_INTER_CALL_DELAY_MS,
            search_enabled: true,
            listing_enabled: true,
        }
    }
}

impl Settings {
    /// Cache validity window in milliseconds.
    pub fn ttl_ms(&self) -> u64 {
        self.ttl_days.saturating_mul(MS_PER_DAY)
    }

    pub fn inter_call_delay(&self) -> Duration {
        Duration::from_millis(self.inter_call_delay_ms)
    }
}

/// Partial update; absent fields are left untouched.
///
/// Numeric fields that are zero or negative fall back to their defaults.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SettingsPatch {
    #[serde(default)]
    pub ttl_days: Option<i64>,
    #[serde(default)]
    pub inter_call_delay_ms: Option<i64>,
    #[serde(default)]
    pub search_enabled: Option<bool>,
    #[serde(default)]
    pub listing_enabled: Option<bool>,
}

fn positive_or(value: i64, default: u64) -> u64 {
    if value > 0 {
        value as u64
    } else {
        default
    }
}

// == Settings Handle ==
/// Cloneable handle to the shared settings.
#[derive(Clone)]
pub struct SettingsHandle {
    current: Arc<RwLock<Settings>>,
    persistence: Option<Arc<dyn Persistence>>,
}

impl SettingsHandle {
    /// Creates an unpersisted handle holding `settings`.
    pub fn new(settings: Settings) -> Self {
        Self {
            current: Arc::new(RwLock::new(settings)),
            persistence: None,
        }
    }

    /// Loads every setting from `persistence`, using defaults for missing ones.
    ///
    /// Later updates are written back to the same persistence.
    pub fn load(persistence: Arc<dyn Persistence>) -> Result<Self> {
        let defaults = Settings::default();
        let settings = Settings {
            ttl_days: persistence.load(NS_TTL_DAYS, defaults.ttl_days)?,
            inter_call_delay_ms: persistence.load(NS_DELAY_MS, defaults.inter_call_delay_ms)?,
            search_enabled: persistence.load(NS_SEARCH, defaults.search_enabled)?,
            listing_enabled: persistence.load(NS_LISTING, defaults.listing_enabled)?,
        };

        Ok(Self {
            current: Arc::new(RwLock::new(settings)),
            persistence: Some(persistence),
        })
    }

    /// Returns a copy of the current settings.
    pub fn snapshot(&self) -> Settings {
        *self.current.read().unwrap_or_else(|e| e.into_inner())
    }

    pub fn ttl_ms(&self) -> u64 {
        self.snapshot().ttl_ms()
    }

    pub fn inter_call_delay(&self) -> Duration {
        self.snapshot().inter_call_delay()
    }

    pub fn search_enabled(&self) -> bool {
        self.snapshot().search_enabled
    }

    pub fn listing_enabled(&self) -> bool {
        self.snapshot().listing_enabled
    }

    pub fn set_ttl_days(&self, days: u64) -> Result<Settings> {
        self.apply(|s| s.ttl_days = days)
    }

    pub fn set_inter_call_delay_ms(&self, ms: u64) -> Result<Settings> {
        self.apply(|s| s.inter_call_delay_ms = ms)
    }

    /// Applies a partial update and persists the result.
    pub fn update(&self, patch: &SettingsPatch) -> Result<Settings> {
        self.apply(|s| {
            if let Some(days) = patch.ttl_days {
                s.ttl_days = positive_or(days, DEFAULT_TTL_DAYS);
            }
            if let Some(ms) = patch.inter_call_delay_ms {
                s.inter_call_delay_ms = positive_or(ms, DEFAULT_INTER_CALL_DELAY_MS);
            }
            if let Some(enabled) = patch.search_enabled {
                s.search_enabled = enabled;
            }
            if let Some(enabled) = patch.listing_enabled {
                s.listing_enabled = enabled;
            }
        })
    }

    fn apply(&self, change: impl FnOnce(&mut Settings)) -> Result<Settings> {
        let updated = {
            let mut guard = self.current.write().unwrap_or_else(|e| e.into_inner());
            change(&mut guard);
            *guard
        };

        if let Some(persistence) = &self.persistence {
            persistence.store(NS_TTL_DAYS, &updated.ttl_days)?;
            persistence.store(NS_DELAY_MS, &updated.inter_call_delay_ms)?;
            persistence.store(NS_SEARCH, &updated.search_enabled)?;
            persistence.store(NS_LISTING, &updated.listing_enabled)?;
        }

        info!(
            "Settings updated: ttl_days={}, inter_call_delay_ms={}, search={}, listing={}",
            updated.ttl_days,
            updated.inter_call_delay_ms,
            updated.search_enabled,
            updated.listing_enabled
        );
        Ok(updated)
    }
}

impl Default for SettingsHandle {
    fn default() -> Self {
        Self::new(Settings::default())
    }
}
