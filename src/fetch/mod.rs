//! Fetch Module
//!
//! Outbound listing lookups and the cache-aware pipeline around them.

mod pipeline;
mod source;
mod types;

pub use pipeline::FetchPipeline;
pub use source::{HttpListingSource, ListingSource};
pub use types::{
    FailureKind, ListingDetails, Lookup, PropertyAttribute, Resolution, UpstreamReply,
    CAPITAL_VALUE_ATTRIBUTE,
};
