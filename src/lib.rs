//! capval - Rate-limited capital value lookups
//!
//! Turns many concurrent "capital value for listing K" requests into one
//! ordered, paced, cache-aware stream of calls to the listing API.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod fetch;
pub mod models;
pub mod persistence;
pub mod queue;
pub mod settings;

pub use api::AppState;
pub use config::Config;
pub use fetch::{FetchPipeline, Lookup, Resolution};
pub use queue::RequestQueue;
pub use settings::{Settings, SettingsHandle};
