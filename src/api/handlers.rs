//! API Handlers
//!
//! HTTP request handlers for each lookup service endpoint.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};
use tokio::sync::{oneshot, RwLock};
use tracing::info;

use crate::cache::{CacheStore, SystemClock};
use crate::config::Config;
use crate::error::{AppError, Result};
use crate::fetch::{FetchPipeline, HttpListingSource, ListingSource, Resolution};
use crate::models::{
    validate_listing_id, CacheStatsResponse, ClearResponse, HealthResponse, LookupResponse,
    SearchRequest, SearchResponse, SettingsResponse,
};
use crate::persistence::{JsonFileStore, Persistence};
use crate::queue::{RequestQueue, Ticket};
use crate::settings::{SettingsHandle, SettingsPatch};

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Rate-limited lookup queue; owns the pipeline and cache
    pub queue: RequestQueue,
    /// Runtime settings
    pub settings: SettingsHandle,
}

impl AppState {
    pub fn new(queue: RequestQueue, settings: SettingsHandle) -> Self {
        Self { queue, settings }
    }

    /// Wires an unpersisted cache and queue around `source`.
    pub fn in_memory(source: Arc<dyn ListingSource>, settings: SettingsHandle) -> Self {
        let cache = Arc::new(RwLock::new(CacheStore::new(settings.clone())));
        let pipeline = FetchPipeline::new(cache, source);
        Self::new(RequestQueue::new(pipeline, settings.clone()), settings)
    }

    /// Builds the full service from configuration.
    ///
    /// Settings and cache are restored from `config.data_dir`; lookups go to
    /// `config.api_base`.
    pub fn from_config(config: &Config) -> Result<Self> {
        let persistence: Arc<dyn Persistence> =
            Arc::new(JsonFileStore::open(config.data_dir.clone())?);
        let settings = SettingsHandle::load(persistence.clone())?;
        let cache = CacheStore::load(persistence, settings.clone(), Arc::new(SystemClock))?;
        info!("Restored {} cached lookups", cache.size());

        let source = HttpListingSource::new(
            config.api_base.clone(),
            &config.user_agent,
            config.request_timeout,
        )?;
        let pipeline = FetchPipeline::new(Arc::new(RwLock::new(cache)), Arc::new(source));

        Ok(Self::new(
            RequestQueue::new(pipeline, settings.clone()),
            settings,
        ))
    }

    pub fn cache(&self) -> &Arc<RwLock<CacheStore>> {
        self.queue.pipeline().cache()
    }
}

/// Withdraws still-queued lookups if the request future is dropped early.
///
/// Cancelling a ticket whose item already ran is a no-op, so the guard can
/// fire unconditionally.
struct CancelOnDrop(Vec<Ticket>);

impl Drop for CancelOnDrop {
    fn drop(&mut self) {
        for ticket in &self.0 {
            ticket.cancel();
        }
    }
}

async fn await_resolution(key: &str, rx: oneshot::Receiver<Resolution>) -> Result<Resolution> {
    rx.await
        .map_err(|_| AppError::Cancelled(format!("lookup for {} was withdrawn", key)))
}

/// Handler for GET /listing/:id
///
/// Single-listing path. Goes through the queue like every other lookup.
pub async fn listing_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<LookupResponse>> {
    if !state.settings.listing_enabled() {
        return Err(AppError::Disabled("listing lookups are turned off".to_string()));
    }
    if let Some(error_msg) = validate_listing_id(&id) {
        return Err(AppError::InvalidRequest(error_msg));
    }

    let (ticket, rx) = state.queue.submit(id.clone());
    let _guard = CancelOnDrop(vec![ticket]);
    let resolution = await_resolution(&id, rx).await?;

    Ok(Json(LookupResponse::new(id, resolution)))
}

/// Handler for POST /search
///
/// Search-results path. Every id is queued up front; results come back in
/// the order given.
pub async fn search_handler(
    State(state): State<AppState>,
    Json(req): Json<SearchRequest>,
) -> Result<Json<SearchResponse>> {
    if !state.settings.search_enabled() {
        return Err(AppError::Disabled("search lookups are turned off".to_string()));
    }
    if let Some(error_msg) = req.validate() {
        return Err(AppError::InvalidRequest(error_msg));
    }

    let mut tickets = Vec::with_capacity(req.ids.len());
    let mut receivers = Vec::with_capacity(req.ids.len());
    for id in &req.ids {
        let (ticket, rx) = state.queue.submit(id.clone());
        tickets.push(ticket);
        receivers.push(rx);
    }
    let _guard = CancelOnDrop(tickets);

    let mut results = Vec::with_capacity(receivers.len());
    for (id, rx) in req.ids.into_iter().zip(receivers) {
        let resolution = await_resolution(&id, rx).await?;
        results.push(LookupResponse::new(id, resolution));
    }

    Ok(Json(SearchResponse { results }))
}

/// Handler for GET /settings
pub async fn get_settings_handler(State(state): State<AppState>) -> Json<SettingsResponse> {
    Json(state.settings.snapshot().into())
}

/// Handler for PUT /settings
///
/// Partial update; takes effect on the next lookup and the next delay.
pub async fn update_settings_handler(
    State(state): State<AppState>,
    Json(patch): Json<SettingsPatch>,
) -> Result<Json<SettingsResponse>> {
    let updated = state.settings.update(&patch)?;
    Ok(Json(updated.into()))
}

/// Handler for GET /cache/stats
pub async fn cache_stats_handler(State(state): State<AppState>) -> Json<CacheStatsResponse> {
    let stats = state.cache().read().await.stats();
    Json(CacheStatsResponse::new(&stats, state.queue.pending()))
}

/// Handler for DELETE /cache
pub async fn clear_cache_handler(State(state): State<AppState>) -> Result<Json<ClearResponse>> {
    let mut cache = state.cache().write().await;
    let removed = cache.size();
    cache.clear()?;
    info!("Cache cleared ({} entries)", removed);

    Ok(Json(ClearResponse::new(removed)))
}

/// Handler for GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::CachedValue;
    use crate::fetch::UpstreamReply;
    use crate::models::LookupStatus;
    use async_trait::async_trait;

    /// Every listing has no capital value.
    struct EmptySource;

    #[async_trait]
    impl ListingSource for EmptySource {
        async fn fetch(&self, _key: &str) -> Result<UpstreamReply> {
            Ok(UpstreamReply::new(200, "{}"))
        }
    }

    fn test_state() -> AppState {
        AppState::in_memory(Arc::new(EmptySource), SettingsHandle::default())
    }

    #[tokio::test]
    async fn test_listing_handler_uses_cache() {
        let state = test_state();
        state
            .cache()
            .write()
            .await
            .put("123", CachedValue::Found("500000".into()))
            .unwrap();

        let response = listing_handler(State(state), Path("123".to_string()))
            .await
            .unwrap();
        assert_eq!(response.status, LookupStatus::Found);
        assert_eq!(response.capital_value.as_deref(), Some("500000"));
    }

    #[tokio::test]
    async fn test_listing_handler_disabled() {
        let state = test_state();
        state
            .settings
            .update(&SettingsPatch {
                listing_enabled: Some(false),
                ..SettingsPatch::default()
            })
            .unwrap();

        let result = listing_handler(State(state), Path("1".to_string())).await;
        assert!(matches!(result, Err(AppError::Disabled(_))));
    }

    #[tokio::test]
    async fn test_listing_handler_invalid_id() {
        let result = listing_handler(State(test_state()), Path("abc".to_string())).await;
        assert!(matches!(result, Err(AppError::InvalidRequest(_))));
    }

    #[tokio::test]
    async fn test_search_handler_empty_ids() {
        let response = search_handler(State(test_state()), Json(SearchRequest { ids: vec![] }))
            .await
            .unwrap();
        assert!(response.results.is_empty());
    }

    #[tokio::test]
    async fn test_clear_cache_handler() {
        let state = test_state();
        state
            .cache()
            .write()
            .await
            .put("1", CachedValue::NotFound)
            .unwrap();

        let response = clear_cache_handler(State(state.clone())).await.unwrap();
        assert_eq!(response.removed, 1);

        let stats = cache_stats_handler(State(state)).await;
        assert_eq!(stats.total_entries, 0);
    }

    #[tokio::test]
    async fn test_health_handler() {
        let response = health_handler().await;
        assert_eq!(response.status, "healthy");
    }
}
