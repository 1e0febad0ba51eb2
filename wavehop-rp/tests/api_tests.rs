//! Integration tests for the HTTP control surface
//!
//! Drives the axum router in-process with oneshot requests over a
//! controller wired to mocks.

mod helpers;

use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use helpers::{settle, station, test_player, TestPlayer};
use serde_json::{json, Value};
use tower::ServiceExt;
use wavehop_rp::api::{create_router, AppContext};

async fn setup() -> (axum::Router, TestPlayer) {
    let player = test_player(vec![station("s1"), station("s2")]).await;
    let ctx = AppContext {
        state: player.state.clone(),
        controller: player.controller.clone(),
        catalog: player.catalog.clone(),
    };
    (create_router(ctx), player)
}

async fn request(
    app: &axum::Router,
    method: Method,
    path: &str,
    body: Option<Value>,
) -> (StatusCode, Option<Value>) {
    let builder = Request::builder().method(method).uri(path);
    let request = match body {
        Some(json_body) => builder
            .header("content-type", "application/json")
            .body(Body::from(json_body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json_body = if bytes.is_empty() {
        None
    } else {
        serde_json::from_slice(&bytes).ok()
    };
    (status, json_body)
}

#[tokio::test]
async fn health_reports_module() {
    let (app, _player) = setup().await;
    let (status, body) = request(&app, Method::GET, "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    let body = body.unwrap();
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["module"], "radio_player");
}

#[tokio::test]
async fn state_snapshot_has_defaults() {
    let (app, _player) = setup().await;
    let (status, body) = request(&app, Method::GET, "/player/state", None).await;
    assert_eq!(status, StatusCode::OK);
    let body = body.unwrap();
    assert_eq!(body["is_playing"], false);
    assert_eq!(body["is_loading"], false);
    assert!(body["current_station"].is_null());
    assert!((body["volume"].as_f64().unwrap() - 0.8).abs() < 1e-6);
}

#[tokio::test]
async fn volume_round_trips_and_clamps() {
    let (app, _player) = setup().await;

    let (status, body) =
        request(&app, Method::POST, "/player/volume", Some(json!({"volume": 1.5}))).await;
    assert_eq!(status, StatusCode::OK);
    assert!((body.unwrap()["volume"].as_f64().unwrap() - 1.0).abs() < 1e-6);

    let (_, body) = request(&app, Method::GET, "/player/volume", None).await;
    assert!((body.unwrap()["volume"].as_f64().unwrap() - 1.0).abs() < 1e-6);
}

#[tokio::test]
async fn play_is_accepted_and_attaches() {
    let (app, player) = setup().await;

    let body = serde_json::to_value(station("s9")).unwrap();
    let (status, _) = request(&app, Method::POST, "/player/play", Some(body)).await;
    assert_eq!(status, StatusCode::ACCEPTED);

    settle().await;
    assert_eq!(player.source.attach_count(), 1);
    assert_eq!(player.source.last_attachment().url, "https://stream.example/s9");
}

#[tokio::test]
async fn shuffle_is_accepted() {
    let (app, player) = setup().await;

    let (status, _) = request(&app, Method::POST, "/player/shuffle", None).await;
    assert_eq!(status, StatusCode::ACCEPTED);

    settle().await;
    assert_eq!(player.source.attach_count(), 1);
}

#[tokio::test]
async fn random_stations_pass_through_catalog() {
    let (app, _player) = setup().await;
    let (status, body) = request(&app, Method::GET, "/stations/random?count=1", None).await;
    assert_eq!(status, StatusCode::OK);
    let stations = body.unwrap()["stations"].as_array().unwrap().clone();
    assert_eq!(stations.len(), 1);
    assert_eq!(stations[0]["id"], "s1");
}

#[tokio::test]
async fn favorites_crud_round_trip() {
    let (app, _player) = setup().await;
    let fav = serde_json::to_value(station("fav-1")).unwrap();

    let (status, _) = request(&app, Method::POST, "/favorites", Some(fav)).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = request(&app, Method::GET, "/favorites/fav-1", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.unwrap()["favorite"], true);

    let (status, body) = request(&app, Method::GET, "/favorites", None).await;
    assert_eq!(status, StatusCode::OK);
    let favorites = body.unwrap()["favorites"].as_array().unwrap().clone();
    assert_eq!(favorites.len(), 1);
    assert_eq!(favorites[0]["station_id"], "fav-1");

    let (status, _) = request(&app, Method::DELETE, "/favorites/fav-1", None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = request(&app, Method::DELETE, "/favorites/fav-1", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn clear_error_always_succeeds() {
    let (app, _player) = setup().await;
    let (status, _) = request(&app, Method::POST, "/player/clear-error", None).await;
    assert_eq!(status, StatusCode::OK);
}
