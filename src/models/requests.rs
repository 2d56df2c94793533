//! Request DTOs for the lookup API
//!
//! Defines the structure of incoming HTTP request bodies.

use serde::Deserialize;

/// Longest accepted listing identifier
pub const MAX_LISTING_ID_LENGTH: usize = 20;

/// Most identifiers accepted in one search submission
pub const MAX_SEARCH_IDS: usize = 200;

/// Checks that `id` looks like a listing identifier (ASCII digits only).
///
/// Returns an error message if validation fails, None if valid.
pub fn validate_listing_id(id: &str) -> Option<String> {
    if id.is_empty() {
        return Some("Listing id cannot be empty".to_string());
    }
    if id.len() > MAX_LISTING_ID_LENGTH {
        return Some(format!(
            "Listing id exceeds maximum length of {} characters",
            MAX_LISTING_ID_LENGTH
        ));
    }
    if !id.chars().all(|c| c.is_ascii_digit()) {
        return Some(format!("Listing id '{}' must be numeric", id));
    }
    None
}

/// Request body for the search path (POST /search)
///
/// Identifiers are looked up in the order given.
#[derive(Debug, Clone, Deserialize)]
pub struct SearchRequest {
    pub ids: Vec<String>,
}

impl SearchRequest {
    /// Validates the request data
    pub fn validate(&self) -> Option<String> {
        if self.ids.len() > MAX_SEARCH_IDS {
            return Some(format!("At most {} ids per search", MAX_SEARCH_IDS));
        }
        self.ids.iter().find_map(|id| validate_listing_id(id))
    }
}
