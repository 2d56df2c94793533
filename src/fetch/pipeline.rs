//! Fetch Pipeline
//!
//! Resolves a key from the cache or with exactly one outbound call, classifies
//! the reply, and caches only definitive outcomes.

use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{error, info, warn};

use crate::cache::{CacheStore, CachedValue};

use super::source::ListingSource;
use super::types::{FailureKind, ListingDetails, Lookup, Resolution};

const STATUS_TOO_MANY_REQUESTS: u16 = 429;

/// Cache-aware resolver for listing keys.
#[derive(Clone)]
pub struct FetchPipeline {
    cache: Arc<RwLock<CacheStore>>,
    source: Arc<dyn ListingSource>,
}

impl FetchPipeline {
    pub fn new(cache: Arc<RwLock<CacheStore>>, source: Arc<dyn ListingSource>) -> Self {
        Self { cache, source }
    }

    /// Shared handle to the cache this pipeline reads and writes.
    pub fn cache(&self) -> &Arc<RwLock<CacheStore>> {
        &self.cache
    }

    /// Resolves `key`.
    ///
    /// Never fails: transport errors, rate limiting, error statuses and
    /// undecodable bodies come back as [`Resolution::Failed`] and leave the
    /// cache untouched, so a later submission retries them.
    pub async fn resolve(&self, key: &str) -> Lookup {
        // Write lock: an expired entry is evicted by the read
        if let Some(value) = self.cache.write().await.get(key) {
            return Lookup::cached(value);
        }

        info!("API call for listing {}", key);

        let reply = match self.source.fetch(key).await {
            Ok(reply) => reply,
            Err(e) => {
                error!("Fetch failed for {}: {}", key, e);
                return Lookup::fetched(Resolution::Failed(FailureKind::Transport));
            }
        };

        if reply.status == STATUS_TOO_MANY_REQUESTS {
            warn!(
                "Possibly rate limited (429) on {}. Increase the inter-call delay in settings.",
                key
            );
            return Lookup::fetched(Resolution::Failed(FailureKind::RateLimited));
        }

        if !reply.is_success() {
            error!("API error for {}: status {}", key, reply.status);
            return Lookup::fetched(Resolution::Failed(FailureKind::Upstream {
                status: reply.status,
            }));
        }

        let details: ListingDetails = match serde_json::from_str(&reply.body) {
            Ok(details) => details,
            Err(e) => {
                error!("Undecodable listing body for {}: {}", key, e);
                return Lookup::fetched(Resolution::Failed(FailureKind::Malformed));
            }
        };

        let outcome = match details.capital_value() {
            Some(value) => {
                info!("Found capital value for {}: {}", key, value);
                CachedValue::Found(value)
            }
            None => {
                info!("No capital value attribute for {}", key);
                CachedValue::NotFound
            }
        };

        if let Err(e) = self.cache.write().await.put(key, outcome.clone()) {
            warn!("Could not persist cache entry for {}: {}", key, e);
        }

        Lookup::fetched(outcome.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{AppError, Result};
    use crate::fetch::UpstreamReply;
    use crate::settings::SettingsHandle;
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// Replays a fixed script of replies and counts calls.
    struct ScriptedSource {
        replies: Mutex<VecDeque<Result<UpstreamReply>>>,
        calls: AtomicUsize,
    }

    impl ScriptedSource {
        fn new(replies: Vec<Result<UpstreamReply>>) -> Arc<Self> {
            Arc::new(Self {
                replies: Mutex::new(replies.into()),
                calls: AtomicUsize::new(0),
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl ListingSource for ScriptedSource {
        async fn fetch(&self, _key: &str) -> Result<UpstreamReply> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.replies
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(AppError::Internal("script exhausted".into())))
        }
    }

    fn pipeline(source: Arc<ScriptedSource>) -> FetchPipeline {
        let cache = Arc::new(RwLock::new(CacheStore::new(SettingsHandle::default())));
        FetchPipeline::new(cache, source)
    }

    fn found_body(value: &str) -> String {
        format!(
            r#"{{"PropertyAttributes":[{{"Name":"capital_value","Value":"{}"}}]}}"#,
            value
        )
    }

    #[tokio::test]
    async fn test_found_value_is_cached() {
        let source = ScriptedSource::new(vec![Ok(UpstreamReply::new(200, found_body("500000")))]);
        let pipeline = pipeline(source.clone());

        let first = pipeline.resolve("123").await;
        assert_eq!(first, Lookup::fetched(Resolution::Found("500000".into())));

        let second = pipeline.resolve("123").await;
        assert_eq!(second, Lookup::cached(CachedValue::Found("500000".into())));
        assert_eq!(source.calls(), 1);
    }

    #[tokio::test]
    async fn test_confirmed_absence_is_cached() {
        let source = ScriptedSource::new(vec![Ok(UpstreamReply::new(
            200,
            r#"{"PropertyAttributes":[]}"#,
        ))]);
        let pipeline = pipeline(source.clone());

        assert_eq!(pipeline.resolve("7").await.resolution, Resolution::NotFound);

        let again = pipeline.resolve("7").await;
        assert_eq!(again.resolution, Resolution::NotFound);
        assert!(again.was_cached);
        assert_eq!(source.calls(), 1);
    }

    #[tokio::test]
    async fn test_value_found_despite_unexpected_fields() {
        let body = r#"{"ListingId":"abc","PropertyAttributes":[
            {"Name":null,"Value":"x"},
            {"Name":"capital_value","Value":"500000"}
        ]}"#;
        let source = ScriptedSource::new(vec![Ok(UpstreamReply::new(200, body))]);
        let pipeline = pipeline(source.clone());

        let lookup = pipeline.resolve("321").await;
        assert_eq!(lookup, Lookup::fetched(Resolution::Found("500000".into())));
        assert_eq!(
            pipeline.cache().write().await.get("321"),
            Some(CachedValue::Found("500000".into()))
        );
    }

    #[tokio::test]
    async fn test_preseeded_not_found_needs_no_call() {
        let source = ScriptedSource::new(vec![]);
        let pipeline = pipeline(source.clone());
        pipeline
            .cache()
            .write()
            .await
            .put("7", CachedValue::NotFound)
            .unwrap();

        let lookup = pipeline.resolve("7").await;
        assert_eq!(lookup, Lookup::cached(CachedValue::NotFound));
        assert_eq!(source.calls(), 0);
    }

    #[tokio::test]
    async fn test_rate_limited_is_not_cached() {
        let source = ScriptedSource::new(vec![
            Ok(UpstreamReply::new(429, "")),
            Ok(UpstreamReply::new(200, found_body("1"))),
        ]);
        let pipeline = pipeline(source.clone());

        let lookup = pipeline.resolve("9").await;
        assert_eq!(lookup, Lookup::fetched(Resolution::Failed(FailureKind::RateLimited)));
        assert!(pipeline.cache().write().await.get("9").is_none());

        // Retried on the next submission
        assert_eq!(pipeline.resolve("9").await.resolution, Resolution::Found("1".into()));
        assert_eq!(source.calls(), 2);
    }

    #[tokio::test]
    async fn test_transient_failures_are_not_cached() {
        let source = ScriptedSource::new(vec![
            Err(AppError::Internal("connection reset".into())),
            Ok(UpstreamReply::new(503, "unavailable")),
            Ok(UpstreamReply::new(404, "")),
            Ok(UpstreamReply::new(200, "<html>")),
        ]);
        let pipeline = pipeline(source);

        let expected = [
            FailureKind::Transport,
            FailureKind::Upstream { status: 503 },
            FailureKind::Upstream { status: 404 },
            FailureKind::Malformed,
        ];
        for kind in expected {
            let lookup = pipeline.resolve("5").await;
            assert_eq!(lookup, Lookup::fetched(Resolution::Failed(kind)));
        }

        assert_eq!(pipeline.cache().read().await.size(), 0);
    }
}
