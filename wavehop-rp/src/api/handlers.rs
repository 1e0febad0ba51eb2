//! HTTP request handlers
//!
//! REST endpoints for playback control, station browsing, and favorites.
//! Playback failures never surface as HTTP errors: they land in
//! `PlayerState.error` and reach clients through the SSE stream.

use crate::api::server::AppContext;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::{error, info};
use wavehop_common::types::{PlayerState, Station};

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    status: String,
    module: String,
    version: String,
}

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    status: String,
}

#[derive(Debug, Deserialize)]
pub struct VolumeRequest {
    volume: f32,
}

#[derive(Debug, Serialize)]
pub struct VolumeResponse {
    volume: f32,
}

#[derive(Debug, Deserialize)]
pub struct StationCountQuery {
    #[serde(default = "default_station_count")]
    count: usize,
}

fn default_station_count() -> usize {
    20
}

#[derive(Debug, Serialize)]
pub struct StationListResponse {
    stations: Vec<Station>,
}

#[derive(Debug, Serialize)]
pub struct FavoriteFlagResponse {
    station_id: String,
    favorite: bool,
}

type HandlerError = (StatusCode, Json<StatusResponse>);

fn internal_error<E: std::fmt::Display>(e: E) -> HandlerError {
    error!("request failed: {}", e);
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(StatusResponse {
            status: format!("error: {}", e),
        }),
    )
}

// ============================================================================
// Health Endpoint
// ============================================================================

/// GET /health - Health check endpoint
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        module: "radio_player".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

// ============================================================================
// Player Endpoints
// ============================================================================

/// GET /player/state - Current player state snapshot
pub async fn get_state(State(ctx): State<AppContext>) -> Json<PlayerState> {
    Json(ctx.state.snapshot().await)
}

/// POST /player/shuffle - Play a new random station
///
/// Always accepted; rapid repeats inside the debounce window are dropped
/// by the controller, and failures arrive via SSE.
pub async fn shuffle(State(ctx): State<AppContext>) -> StatusCode {
    let controller = ctx.controller.clone();
    tokio::spawn(async move { controller.shuffle().await });
    StatusCode::ACCEPTED
}

/// POST /player/play - Play a specific station
pub async fn play(State(ctx): State<AppContext>, Json(station): Json<Station>) -> StatusCode {
    info!("play request: {} ({})", station.name, station.id);
    let controller = ctx.controller.clone();
    tokio::spawn(async move { controller.play(station).await });
    StatusCode::ACCEPTED
}

/// POST /player/toggle - Pause/resume the current station
pub async fn toggle_play_pause(State(ctx): State<AppContext>) -> StatusCode {
    ctx.controller.toggle_play_pause().await;
    StatusCode::OK
}

/// GET /player/volume - Current master volume
pub async fn get_volume(State(ctx): State<AppContext>) -> Json<VolumeResponse> {
    Json(VolumeResponse {
        volume: ctx.state.volume().await,
    })
}

/// POST /player/volume - Set master volume (0.0-1.0, clamped)
pub async fn set_volume(
    State(ctx): State<AppContext>,
    Json(req): Json<VolumeRequest>,
) -> Json<VolumeResponse> {
    ctx.controller.set_volume(req.volume).await;
    Json(VolumeResponse {
        volume: ctx.state.volume().await,
    })
}

/// POST /player/clear-error - Dismiss the current error
pub async fn clear_error(State(ctx): State<AppContext>) -> StatusCode {
    ctx.controller.clear_error().await;
    StatusCode::OK
}

// ============================================================================
// Station Browsing Endpoints
// ============================================================================

/// GET /stations/random?count=N - Random stations from the directory
pub async fn random_stations(
    State(ctx): State<AppContext>,
    Query(query): Query<StationCountQuery>,
) -> Result<Json<StationListResponse>, HandlerError> {
    let stations = ctx
        .catalog
        .get_random_stations(query.count)
        .await
        .map_err(internal_error)?;
    Ok(Json(StationListResponse { stations }))
}

/// GET /stations/diverse?count=N - Geographically diverse station pool
pub async fn diverse_stations(
    State(ctx): State<AppContext>,
    Query(query): Query<StationCountQuery>,
) -> Result<Json<StationListResponse>, HandlerError> {
    let stations = ctx
        .catalog
        .get_diverse_stations(query.count)
        .await
        .map_err(internal_error)?;
    Ok(Json(StationListResponse { stations }))
}

// ============================================================================
// Favorites Endpoints
// ============================================================================

/// GET /favorites - All favorited stations, newest first
pub async fn list_favorites(
    State(ctx): State<AppContext>,
) -> Result<Json<serde_json::Value>, HandlerError> {
    let favorites = ctx
        .controller
        .list_favorites()
        .await
        .map_err(internal_error)?;
    Ok(Json(serde_json::json!({ "favorites": favorites })))
}

/// POST /favorites - Add a station to favorites
pub async fn add_favorite(
    State(ctx): State<AppContext>,
    Json(station): Json<Station>,
) -> Result<StatusCode, HandlerError> {
    ctx.controller
        .add_favorite(&station)
        .await
        .map_err(internal_error)?;
    info!("favorited {} ({})", station.name, station.id);
    Ok(StatusCode::CREATED)
}

/// GET /favorites/:station_id - Whether a station is favorited
pub async fn is_favorite(
    State(ctx): State<AppContext>,
    Path(station_id): Path<String>,
) -> Result<Json<FavoriteFlagResponse>, HandlerError> {
    let favorite = ctx
        .controller
        .is_favorite(&station_id)
        .await
        .map_err(internal_error)?;
    Ok(Json(FavoriteFlagResponse {
        station_id,
        favorite,
    }))
}

/// DELETE /favorites/:station_id - Remove a station from favorites
pub async fn remove_favorite(
    State(ctx): State<AppContext>,
    Path(station_id): Path<String>,
) -> Result<StatusCode, HandlerError> {
    let removed = ctx
        .controller
        .remove_favorite(&station_id)
        .await
        .map_err(internal_error)?;
    if removed {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err((
            StatusCode::NOT_FOUND,
            Json(StatusResponse {
                status: format!("error: {} is not favorited", station_id),
            }),
        ))
    }
}
