//! HTTP router setup
//!
//! Wires the REST control endpoints and the SSE stream onto one axum
//! router with permissive CORS so a browser UI served from anywhere on
//! the LAN can drive the daemon.

use crate::directory::StationCatalog;
use crate::playback::PlaybackController;
use crate::state::SharedState;
use axum::{
    routing::{delete, get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;

/// Shared application context passed to all handlers
#[derive(Clone)]
pub struct AppContext {
    pub state: Arc<SharedState>,
    pub controller: Arc<PlaybackController>,
    pub catalog: Arc<dyn StationCatalog>,
}

/// Create the API router
pub fn create_router(ctx: AppContext) -> Router {
    Router::new()
        // Health check
        .route("/health", get(super::handlers::health))

        // Player control
        .route("/player/state", get(super::handlers::get_state))
        .route("/player/shuffle", post(super::handlers::shuffle))
        .route("/player/play", post(super::handlers::play))
        .route("/player/toggle", post(super::handlers::toggle_play_pause))
        .route("/player/volume", get(super::handlers::get_volume))
        .route("/player/volume", post(super::handlers::set_volume))
        .route("/player/clear-error", post(super::handlers::clear_error))

        // Station browsing (read-only pass-through to the directory)
        .route("/stations/random", get(super::handlers::random_stations))
        .route("/stations/diverse", get(super::handlers::diverse_stations))

        // Favorites
        .route("/favorites", get(super::handlers::list_favorites))
        .route("/favorites", post(super::handlers::add_favorite))
        .route("/favorites/:station_id", get(super::handlers::is_favorite))
        .route("/favorites/:station_id", delete(super::handlers::remove_favorite))

        // SSE event stream
        .route("/events", get(super::sse::event_stream))

        // Attach application context
        .with_state(ctx)

        // Enable CORS for browser clients
        .layer(CorsLayer::permissive())
}
