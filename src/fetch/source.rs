//! Listing source: the outbound network collaborator.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{
    header::{HeaderMap, HeaderValue, ACCEPT, USER_AGENT},
    Client,
};

use crate::error::{AppError, Result};

use super::types::UpstreamReply;

/// Fetches the listing document for a key.
///
/// Returns `Err` only when no HTTP reply was received. Every status code,
/// including errors, comes back as an [`UpstreamReply`].
#[async_trait]
pub trait ListingSource: Send + Sync {
    async fn fetch(&self, key: &str) -> Result<UpstreamReply>;
}

/// Listing API client over reqwest.
pub struct HttpListingSource {
    client: Client,
    base_url: String,
}

impl HttpListingSource {
    /// Create a client for the API at `base_url` (scheme and host, no trailing slash).
    ///
    /// A call that takes longer than `timeout` fails as a transport error.
    pub fn new(base_url: impl Into<String>, user_agent: &str, timeout: Duration) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(user_agent)
                .map_err(|e| AppError::InvalidRequest(format!("Bad user agent: {}", e)))?,
        );

        let client = Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// Endpoint for a listing key.
    pub fn listing_url(&self, key: &str) -> String {
        format!("{}/v1/listings/{}.json", self.base_url, key)
    }
}

#[async_trait]
impl ListingSource for HttpListingSource {
    async fn fetch(&self, key: &str) -> Result<UpstreamReply> {
        let response = self.client.get(self.listing_url(key)).send().await?;
        let status = response.status().as_u16();
        let body = response.text().await?;

        Ok(UpstreamReply { status, body })
    }
}
