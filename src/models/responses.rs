//! Response DTOs for the lookup API
//!
//! Defines the structure of outgoing HTTP response bodies.

use serde::Serialize;

use crate::cache::CacheStats;
use crate::fetch::{FailureKind, Resolution};
use crate::settings::Settings;

/// Outcome label shown to API clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LookupStatus {
    Found,
    NotFound,
    Failed,
}

/// Result for one listing (GET /listing/:id, and each entry of POST /search)
#[derive(Debug, Clone, Serialize)]
pub struct LookupResponse {
    /// The listing identifier
    pub key: String,
    pub status: LookupStatus,
    /// Present only when found
    #[serde(skip_serializing_if = "Option::is_none")]
    pub capital_value: Option<String>,
    /// Present only when failed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure: Option<FailureKind>,
}

impl LookupResponse {
    pub fn new(key: impl Into<String>, resolution: Resolution) -> Self {
        let (status, capital_value, failure) = match resolution {
            Resolution::Found(value) => (LookupStatus::Found, Some(value), None),
            Resolution::NotFound => (LookupStatus::NotFound, None, None),
            Resolution::Failed(kind) => (LookupStatus::Failed, None, Some(kind)),
        };
        Self {
            key: key.into(),
            status,
            capital_value,
            failure,
        }
    }
}

/// Response body for POST /search, in submission order
#[derive(Debug, Clone, Serialize)]
pub struct SearchResponse {
    pub results: Vec<LookupResponse>,
}

/// Response body for GET and PUT /settings
#[derive(Debug, Clone, Serialize)]
pub struct SettingsResponse {
    #[serde(flatten)]
    pub settings: Settings,
}

impl From<Settings> for SettingsResponse {
    fn from(settings: Settings) -> Self {
        Self { settings }
    }
}

/// Response body for GET /cache/stats
#[derive(Debug, Clone, Serialize)]
pub struct CacheStatsResponse {
    pub hits: u64,
    pub misses: u64,
    /// Entries dropped because a read found them expired
    pub expirations: u64,
    /// Stored entries, including expired ones not yet read
    pub total_entries: usize,
    /// Hit rate (hits / (hits + misses))
    pub hit_rate: f64,
    /// Lookups waiting in the request queue
    pub pending: usize,
}

impl CacheStatsResponse {
    pub fn new(stats: &CacheStats, pending: usize) -> Self {
        Self {
            hits: stats.hits,
            misses: stats.misses,
            expirations: stats.expirations,
            total_entries: stats.total_entries,
            hit_rate: stats.hit_rate(),
            pending,
        }
    }
}

/// Response body for DELETE /cache
#[derive(Debug, Clone, Serialize)]
pub struct ClearResponse {
    pub message: String,
    /// Entries removed by the clear
    pub removed: usize,
}

impl ClearResponse {
    pub fn new(removed: usize) -> Self {
        Self {
            message: format!("Cleared {} cached lookups", removed),
            removed,
        }
    }
}

/// Response body for the health endpoint (GET /health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status (e.g., "healthy")
    pub status: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
}

impl HealthResponse {
    /// Creates a new HealthResponse with current timestamp
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}
