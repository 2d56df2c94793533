//! Configuration Module
//!
//! Handles loading process configuration from environment variables.
//! Runtime-tunable behavior (TTL, delay, feature gates) lives in [`crate::settings`].

use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Default listing API origin.
pub const DEFAULT_API_BASE: &str = "https://api.trademe.co.nz";

/// Process configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port
    pub server_port: u16,
    /// Origin of the listing API, without a trailing slash
    pub api_base: String,
    /// Directory holding persisted cache and settings
    pub data_dir: PathBuf,
    /// User-Agent sent on outbound calls
    pub user_agent: String,
    /// Upper bound on one outbound call, connect to last body byte
    pub request_timeout: Duration,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    /// - `LISTING_API_BASE` - Listing API origin (default: https://api.trademe.co.nz)
    /// - `DATA_DIR` - Persistence directory (default: .capval)
    /// - `USER_AGENT` - Outbound User-Agent (default: capval/<version>)
    /// - `REQUEST_TIMEOUT_SECS` - Outbound call timeout in seconds (default: 30)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            server_port: env::var("SERVER_PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.server_port),
            api_base: env::var("LISTING_API_BASE")
                .ok()
                .map(|v| v.trim_end_matches('/').to_string())
                .filter(|v| !v.is_empty())
                .unwrap_or(defaults.api_base),
            data_dir: env::var("DATA_DIR")
                .ok()
                .filter(|v| !v.is_empty())
                .map(PathBuf::from)
                .unwrap_or(defaults.data_dir),
            user_agent: env::var("USER_AGENT")
                .ok()
                .filter(|v| !v.is_empty())
                .unwrap_or(defaults.user_agent),
            request_timeout: env::var("REQUEST_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse::<u64>().ok())
                .filter(|secs| *secs > 0)
                .map(Duration::from_secs)
                .unwrap_or(defaults.request_timeout),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_port: 3000,
            api_base: DEFAULT_API_BASE.to_string(),
            data_dir: PathBuf::from(".capval"),
            user_agent: concat!("capval/", env!("CARGO_PKG_VERSION")).to_string(),
            request_timeout: Duration::from_secs(30),
        }
    }
}
