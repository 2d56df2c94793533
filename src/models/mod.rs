//! Request and Response models for the lookup API
//!
//! This module defines the DTOs (Data Transfer Objects) used for
//! serializing/deserializing HTTP request and response bodies.

pub mod requests;
pub mod responses;

// Re-export commonly used types
pub use requests::{validate_listing_id, SearchRequest};
pub use responses::{
    CacheStatsResponse, ClearResponse, HealthResponse, LookupResponse, LookupStatus,
    SearchResponse, SettingsResponse,
};
