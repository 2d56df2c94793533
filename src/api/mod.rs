//! API Module
//!
//! HTTP handlers and routing for the lookup service REST API.
//!
//! # Endpoints
//! - `GET /listing/:id` - Look up one listing
//! - `POST /search` - Look up many listings in order
//! - `GET|PUT /settings` - Runtime settings
//! - `GET /cache/stats` - Cache statistics
//! - `DELETE /cache` - Clear the cache
//! - `GET /health` - Health check endpoint

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
