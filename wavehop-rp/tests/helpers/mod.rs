//! Shared test fixtures: mock audio source, mock station catalog, and a
//! fully wired controller over an in-memory database.
//!
//! Each test binary uses a different subset of these fixtures.
#![allow(dead_code)]

use async_trait::async_trait;
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::{Pool, Sqlite};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;
use wavehop_common::types::Station;
use wavehop_rp::db::{init, FavoritesStore};
use wavehop_rp::directory::StationCatalog;
use wavehop_rp::error::{PlaybackError, Result};
use wavehop_rp::playback::{
    AudioSource, ControllerConfig, PlaybackController, SessionId, SourceEvent, SourceEventKind,
    TuningEffect,
};
use wavehop_rp::state::SharedState;

pub fn station(id: &str) -> Station {
    Station {
        id: id.to_string(),
        name: format!("Station {}", id),
        country: "Iceland".to_string(),
        tags: vec!["test".to_string()],
        url: format!("https://stream.example/{}", id),
        url_resolved: None,
    }
}

// ============================================================================
// Mock audio source
// ============================================================================

/// One recorded attach call
#[derive(Clone)]
pub struct Attachment {
    pub url: String,
    pub session: SessionId,
    events: mpsc::Sender<SourceEvent>,
}

#[derive(Default)]
struct MockSourceState {
    attachments: Vec<Attachment>,
    detach_calls: usize,
    pause_calls: usize,
    resume_calls: usize,
    reject_play: bool,
    volume: f32,
}

/// Test handle observing and driving the mock source
#[derive(Clone, Default)]
pub struct MockSourceHandle(Arc<Mutex<MockSourceState>>);

impl MockSourceHandle {
    fn lock(&self) -> std::sync::MutexGuard<'_, MockSourceState> {
        self.0.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn attach_count(&self) -> usize {
        self.lock().attachments.len()
    }

    pub fn attachment(&self, index: usize) -> Attachment {
        self.lock().attachments[index].clone()
    }

    pub fn last_attachment(&self) -> Attachment {
        let state = self.lock();
        state.attachments.last().expect("no attachments yet").clone()
    }

    pub fn detach_count(&self) -> usize {
        self.lock().detach_calls
    }

    pub fn pause_count(&self) -> usize {
        self.lock().pause_calls
    }

    pub fn resume_count(&self) -> usize {
        self.lock().resume_calls
    }

    pub fn volume(&self) -> f32 {
        self.lock().volume
    }

    pub fn reject_next_play(&self, reject: bool) {
        self.lock().reject_play = reject;
    }

    /// Deliver a Ready event for the given attachment
    pub async fn emit_ready(&self, attachment: &Attachment) {
        let _ = attachment
            .events
            .send(SourceEvent {
                session: attachment.session,
                kind: SourceEventKind::Ready,
            })
            .await;
    }

    /// Deliver an Error event for the given attachment
    pub async fn emit_error(&self, attachment: &Attachment, message: &str) {
        let _ = attachment
            .events
            .send(SourceEvent {
                session: attachment.session,
                kind: SourceEventKind::Error(message.to_string()),
            })
            .await;
    }
}

/// Audio source whose events are injected by the test
pub struct MockAudioSource(MockSourceHandle);

impl MockAudioSource {
    pub fn new() -> (Self, MockSourceHandle) {
        let handle = MockSourceHandle::default();
        (Self(handle.clone()), handle)
    }
}

#[async_trait]
impl AudioSource for MockAudioSource {
    async fn attach(&mut self, url: &str, session: SessionId, events: mpsc::Sender<SourceEvent>) {
        self.0.lock().attachments.push(Attachment {
            url: url.to_string(),
            session,
            events,
        });
    }

    async fn detach(&mut self) {
        self.0.lock().detach_calls += 1;
    }

    async fn play(&mut self) -> std::result::Result<(), PlaybackError> {
        if self.0.lock().reject_play {
            return Err(PlaybackError::PlayRejected("autoplay blocked".to_string()));
        }
        Ok(())
    }

    async fn pause(&mut self) {
        self.0.lock().pause_calls += 1;
    }

    async fn resume(&mut self) {
        self.0.lock().resume_calls += 1;
    }

    fn set_volume(&mut self, volume: f32) {
        self.0.lock().volume = volume;
    }
}

// ============================================================================
// Mock station catalog
// ============================================================================

pub struct MockCatalog {
    stations: Mutex<Vec<Station>>,
    pub diverse_calls: AtomicUsize,
    play_reports: Mutex<Vec<String>>,
}

impl MockCatalog {
    pub fn new(stations: Vec<Station>) -> Arc<Self> {
        Arc::new(Self {
            stations: Mutex::new(stations),
            diverse_calls: AtomicUsize::new(0),
            play_reports: Mutex::new(Vec::new()),
        })
    }

    pub fn play_reports(&self) -> Vec<String> {
        self.play_reports
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}

#[async_trait]
impl StationCatalog for MockCatalog {
    async fn get_random_stations(&self, count: usize) -> Result<Vec<Station>> {
        let mut stations = self
            .stations
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone();
        stations.truncate(count);
        Ok(stations)
    }

    async fn get_stations_by_country(&self, _country: &str, count: usize) -> Result<Vec<Station>> {
        self.get_random_stations(count).await
    }

    async fn get_diverse_stations(&self, count: usize) -> Result<Vec<Station>> {
        self.diverse_calls.fetch_add(1, Ordering::SeqCst);
        self.get_random_stations(count).await
    }

    async fn report_play(&self, station_id: &str) {
        self.play_reports
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(station_id.to_string());
    }
}

// ============================================================================
// Wiring
// ============================================================================

pub struct TestPlayer {
    pub controller: Arc<PlaybackController>,
    pub state: Arc<SharedState>,
    pub source: MockSourceHandle,
    pub catalog: Arc<MockCatalog>,
    pub pool: Pool<Sqlite>,
}

/// Build a controller over mocks and an in-memory database
pub async fn test_player(stations: Vec<Station>) -> TestPlayer {
    let pool = SqlitePoolOptions::new()
        .connect("sqlite::memory:")
        .await
        .unwrap();
    init::initialize_database(&pool).await.unwrap();

    let state = Arc::new(SharedState::new(0.8));
    let catalog = MockCatalog::new(stations);
    let (source, handle) = MockAudioSource::new();
    let favorites = Arc::new(FavoritesStore::new(pool.clone()));

    let controller = PlaybackController::new(
        state.clone(),
        catalog.clone(),
        Box::new(source),
        TuningEffect::new(),
        favorites,
        pool.clone(),
        ControllerConfig::default(),
    );

    TestPlayer {
        controller,
        state,
        source: handle,
        catalog,
        pool,
    }
}

/// Let the event pump and any just-woken timers run
pub async fn settle() {
    for _ in 0..25 {
        tokio::task::yield_now().await;
    }
}
