//! API Routes
//!
//! Configures the Axum router with all lookup service endpoints.

use axum::{
    routing::{delete, get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{
    cache_stats_handler, clear_cache_handler, get_settings_handler, health_handler,
    listing_handler, search_handler, update_settings_handler, AppState,
};

/// Creates the main router with all endpoints configured.
///
/// # Endpoints
/// - `GET /listing/:id` - Capital value for one listing
/// - `POST /search` - Capital values for many listings, in order
/// - `GET /settings`, `PUT /settings` - Read or change runtime settings
/// - `GET /cache/stats` - Cache statistics and queue depth
/// - `DELETE /cache` - Drop every cached lookup
/// - `GET /health` - Health check endpoint
///
/// # Middleware
/// - CORS: Allows any origin, so browser-side scripts can call in
/// - Tracing: Logs all requests for debugging
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/listing/:id", get(listing_handler))
        .route("/search", post(search_handler))
        .route(
            "/settings",
            get(get_settings_handler).put(update_settings_handler),
        )
        .route("/cache/stats", get(cache_stats_handler))
        .route("/cache", delete(clear_cache_handler))
        .route("/health", get(health_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
