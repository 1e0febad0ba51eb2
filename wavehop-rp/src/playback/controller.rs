//! Playback lifecycle controller
//!
//! Single authority over what is currently playing, loading, or erroring.
//! Arbitrates between user intent and automatic recovery: every play
//! attempt runs under a fresh session id, and every async completion
//! (source ready, source error, loading timeout, retry timer) re-checks
//! that id before touching state, so a superseded station switch can
//! never corrupt the state of a newer one.
//!
//! All mutable controller state lives behind one async mutex; entry
//! points and completions serialize through it.

use crate::db::favorites::{FavoriteStation, FavoritesStore};
use crate::db::settings;
use crate::directory::StationCatalog;
use crate::error::{PlaybackError, Result};
use crate::playback::session::{PlaybackSession, SessionCounter, SessionId};
use crate::playback::source::{AudioSource, SourceEvent, SourceEventKind};
use crate::playback::tuning::TuningEffect;
use crate::state::SharedState;
use rand::Rng;
use sqlx::{Pool, Sqlite};
use std::sync::{Arc, Weak};
use std::time::Duration;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, info, warn};
use wavehop_common::events::PlayerEvent;
use wavehop_common::types::Station;

/// Controller tunables
#[derive(Debug, Clone)]
pub struct ControllerConfig {
    /// Bounded loading window per play attempt
    pub load_timeout: Duration,
    /// Consecutive automatic failures before giving up
    pub max_retries: u32,
    /// Window within which repeated shuffle calls are dropped
    pub shuffle_debounce: Duration,
    /// Linear backoff step; attempt `n` retries after `n * retry_step`
    pub retry_step: Duration,
    /// Target size of the in-memory station pool
    pub pool_size: usize,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            load_timeout: Duration::from_secs(10),
            max_retries: 5,
            shuffle_debounce: Duration::from_secs(1),
            retry_step: Duration::from_secs(2),
            pool_size: 60,
        }
    }
}

/// Lifecycle phase of the current session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Idle,
    Loading,
    Playing,
    Paused,
    Failed,
}

/// Automatic-recovery bookkeeping
struct RetryState {
    /// Consecutive automatic failures, bounded by max_retries
    count: u32,
    /// Current attempt was user-initiated; its failure is surfaced
    /// immediately instead of entering automatic retry
    manual: bool,
    /// Pending backoff timer, if a retry is scheduled
    timer: Option<JoinHandle<()>>,
    /// Bumped on every cancellation; a fired timer with a stale epoch is
    /// discarded even if the abort raced its wakeup
    epoch: u64,
}

/// State owned exclusively by the controller
struct Core {
    source: Box<dyn AudioSource>,
    tuning: TuningEffect,
    session: Option<PlaybackSession>,
    sessions: SessionCounter,
    phase: Phase,
    pool: Vec<Station>,
    retry: RetryState,
    load_timer: Option<JoinHandle<()>>,
    last_shuffle: Option<Instant>,
}

impl Core {
    fn new(source: Box<dyn AudioSource>, tuning: TuningEffect) -> Self {
        Self {
            source,
            tuning,
            session: None,
            sessions: SessionCounter::default(),
            phase: Phase::Idle,
            pool: Vec::new(),
            retry: RetryState {
                count: 0,
                manual: false,
                timer: None,
                epoch: 0,
            },
            load_timer: None,
            last_shuffle: None,
        }
    }

    fn is_current(&self, session: SessionId) -> bool {
        self.session.as_ref().map(|s| s.id) == Some(session)
    }

    fn cancel_load_timer(&mut self) {
        if let Some(timer) = self.load_timer.take() {
            timer.abort();
        }
    }

    fn cancel_retry_timer(&mut self) {
        self.retry.epoch += 1;
        if let Some(timer) = self.retry.timer.take() {
            timer.abort();
        }
    }
}

/// Playback lifecycle controller
///
/// Constructed once at startup via [`PlaybackController::new`], which also
/// spawns the source-event pump. Shut down explicitly with
/// [`PlaybackController::shutdown`].
pub struct PlaybackController {
    state: Arc<SharedState>,
    catalog: Arc<dyn StationCatalog>,
    favorites: Arc<FavoritesStore>,
    db: Pool<Sqlite>,
    cfg: ControllerConfig,
    source_tx: mpsc::Sender<SourceEvent>,
    core: Mutex<Core>,
    pump: std::sync::Mutex<Option<JoinHandle<()>>>,
    /// Self-reference for timers; Weak so timer tasks never keep a
    /// dropped controller alive
    weak: Weak<PlaybackController>,
}

impl PlaybackController {
    pub fn new(
        state: Arc<SharedState>,
        catalog: Arc<dyn StationCatalog>,
        source: Box<dyn AudioSource>,
        tuning: TuningEffect,
        favorites: Arc<FavoritesStore>,
        db: Pool<Sqlite>,
        cfg: ControllerConfig,
    ) -> Arc<Self> {
        let (source_tx, mut source_rx) = mpsc::channel::<SourceEvent>(32);

        let controller = Arc::new_cyclic(|weak| Self {
            state,
            catalog,
            favorites,
            db,
            cfg,
            source_tx,
            core: Mutex::new(Core::new(source, tuning)),
            pump: std::sync::Mutex::new(None),
            weak: weak.clone(),
        });

        // Pump source events back into the controller; Weak so a dropped
        // controller ends the task instead of leaking it
        let weak = Arc::downgrade(&controller);
        let pump = tokio::spawn(async move {
            while let Some(event) = source_rx.recv().await {
                let Some(controller) = weak.upgrade() else { break };
                controller.on_source_event(event).await;
            }
        });
        *controller
            .pump
            .lock()
            .unwrap_or_else(|e| e.into_inner()) = Some(pump);

        controller
    }

    // ========================================================================
    // Inbound operations (Presentation boundary)
    // ========================================================================

    /// Begin a new playback session targeting `station`
    ///
    /// May be called while another session is active; that session is
    /// implicitly superseded and its pending events become no-ops. A
    /// failed attempt enters automatic recovery; only `shuffle` marks an
    /// attempt manual.
    pub async fn play(&self, station: Station) {
        self.start_session(station, false).await;
    }

    /// Play a new random station from the pool
    ///
    /// Calls within the debounce window of the previous accepted call are
    /// dropped silently. The attempt is marked manual: a failure surfaces
    /// immediately instead of entering automatic retry.
    pub async fn shuffle(&self) {
        self.shuffle_internal(true).await;
    }

    /// Pause if playing, resume if paused; no-op without a session
    ///
    /// Always clears pending failure/retry timers: manual control takes
    /// precedence over automatic recovery.
    pub async fn toggle_play_pause(&self) {
        let mut core = self.core.lock().await;
        if core.session.is_none() {
            return;
        }
        core.cancel_load_timer();
        core.cancel_retry_timer();

        match core.phase {
            Phase::Playing => {
                core.source.pause().await;
                core.phase = Phase::Paused;
                self.state.update(|s| s.is_playing = false).await;
            }
            Phase::Paused => {
                core.source.resume().await;
                core.phase = Phase::Playing;
                self.state.update(|s| s.is_playing = true).await;
            }
            Phase::Idle | Phase::Loading | Phase::Failed => {}
        }
    }

    /// Set master volume; applies to the live source and (attenuated) to
    /// the tuning static, and persists even with no active station
    pub async fn set_volume(&self, volume: f32) {
        let volume = volume.clamp(0.0, 1.0);
        {
            let mut core = self.core.lock().await;
            core.source.set_volume(volume);
            core.tuning.set_master_volume(volume);
        }
        self.state.update(|s| s.volume = volume).await;
        self.state.emit(PlayerEvent::VolumeChanged {
            volume,
            timestamp: chrono::Utc::now(),
        });

        if let Err(e) = settings::set_volume(&self.db, volume).await {
            warn!("failed to persist volume: {}", e);
        }
    }

    /// Dismiss the current error without starting a new attempt
    ///
    /// Resets the retry counter and cancels any pending automatic retry.
    pub async fn clear_error(&self) {
        let mut core = self.core.lock().await;
        core.cancel_retry_timer();
        core.retry.count = 0;
        if core.phase == Phase::Failed {
            core.phase = Phase::Idle;
        }
        self.state.update(|s| s.error = None).await;
    }

    /// Explicit teardown: detach the source, cancel timers, stop the pump
    pub async fn shutdown(&self) {
        let mut core = self.core.lock().await;
        core.cancel_load_timer();
        core.cancel_retry_timer();
        core.tuning.stop();
        core.source.detach().await;
        core.session = None;
        core.phase = Phase::Idle;
        if let Some(pump) = self
            .pump
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .take()
        {
            pump.abort();
        }
    }

    // ========================================================================
    // Favorites glue
    // ========================================================================

    pub async fn add_favorite(&self, station: &Station) -> Result<()> {
        self.favorites.add(station).await?;
        self.state.emit(PlayerEvent::FavoriteAdded {
            station_id: station.id.clone(),
            timestamp: chrono::Utc::now(),
        });
        Ok(())
    }

    pub async fn remove_favorite(&self, station_id: &str) -> Result<bool> {
        let removed = self.favorites.remove(station_id).await?;
        if removed {
            self.state.emit(PlayerEvent::FavoriteRemoved {
                station_id: station_id.to_string(),
                timestamp: chrono::Utc::now(),
            });
        }
        Ok(removed)
    }

    pub async fn is_favorite(&self, station_id: &str) -> Result<bool> {
        self.favorites.contains(station_id).await
    }

    pub async fn list_favorites(&self) -> Result<Vec<FavoriteStation>> {
        self.favorites.list().await
    }

    // ========================================================================
    // Session lifecycle
    // ========================================================================

    async fn start_session(&self, station: Station, manual: bool) {
        let mut core = self.core.lock().await;

        let session = core.sessions.next();
        info!("session {} -> {} ({})", session, station.name, station.id);

        // Supersede the previous session before anything async can run;
        // its timers and source events are now stale
        core.session = Some(PlaybackSession::new(session, station.clone()));
        core.retry.manual = manual;
        core.cancel_load_timer();
        core.cancel_retry_timer();

        // Old resource must be fully unbound before the new one attaches:
        // never two stream connections, never a delayed event from the old
        // resource firing against new state
        core.tuning.stop();
        core.source.detach().await;

        core.phase = Phase::Loading;
        self.state
            .update(|s| {
                s.is_loading = true;
                s.is_playing = false;
                s.error = None;
                s.current_station = Some(station.clone());
            })
            .await;
        self.state.emit(PlayerEvent::StationChanged {
            station: station.clone(),
            timestamp: chrono::Utc::now(),
        });

        core.tuning.start();

        // Bounded loading window
        let weak = self.weak.clone();
        let timeout = self.cfg.load_timeout;
        core.load_timer = Some(tokio::spawn(async move {
            tokio::time::sleep(timeout).await;
            if let Some(controller) = weak.upgrade() {
                controller.on_load_timeout(session).await;
            }
        }));

        core.source
            .attach(station.stream_url(), session, self.source_tx.clone())
            .await;
    }

    async fn shuffle_internal(&self, manual: bool) {
        let station = {
            let mut core = self.core.lock().await;

            if manual {
                if let Some(last) = core.last_shuffle {
                    if last.elapsed() < self.cfg.shuffle_debounce {
                        debug!("shuffle dropped inside debounce window");
                        return;
                    }
                }
                core.last_shuffle = Some(Instant::now());
                core.retry.count = 0;
                core.cancel_retry_timer();
            }
            core.retry.manual = manual;

            if core.pool.is_empty() {
                match self.catalog.get_diverse_stations(self.cfg.pool_size).await {
                    Ok(stations) => {
                        info!("station pool refreshed: {} stations", stations.len());
                        core.pool = stations;
                    }
                    Err(e) => warn!("station pool refresh failed: {}", e),
                }
            }

            if core.pool.is_empty() {
                // Pool failure: current playback (if any) is left alone
                self.apply_failure(&mut core, PlaybackError::NoStationsAvailable, false)
                    .await;
                return;
            }

            let idx = rand::thread_rng().gen_range(0..core.pool.len());
            core.pool[idx].clone()
        };

        self.start_session(station, manual).await;
    }

    // ========================================================================
    // Async completions; every one re-validates its session/epoch first
    // ========================================================================

    async fn on_source_event(&self, event: SourceEvent) {
        let mut core = self.core.lock().await;
        if !core.is_current(event.session) {
            debug!("discarding event from superseded session {}", event.session);
            return;
        }

        match event.kind {
            SourceEventKind::Ready => {
                core.cancel_load_timer();
                match core.source.play().await {
                    Ok(()) => {
                        core.phase = Phase::Playing;
                        core.retry.count = 0;
                        // The attempt completed; a later mid-play failure
                        // goes through automatic recovery
                        core.retry.manual = false;
                        core.tuning.stop();

                        let volume = self.state.volume().await;
                        core.source.set_volume(volume);

                        self.state
                            .update(|s| {
                                s.is_playing = true;
                                s.is_loading = false;
                                s.error = None;
                            })
                            .await;

                        if let Some(session) = &core.session {
                            info!("session {} playing {}", session.id, session.station.name);
                            let catalog = Arc::clone(&self.catalog);
                            let station_id = session.station.id.clone();
                            tokio::spawn(async move {
                                catalog.report_play(&station_id).await;
                            });
                        }
                    }
                    Err(e) => self.apply_failure(&mut core, e, true).await,
                }
            }
            SourceEventKind::Error(message) => {
                self.apply_failure(&mut core, PlaybackError::Resource(message), true)
                    .await;
            }
        }
    }

    async fn on_load_timeout(&self, session: SessionId) {
        let mut core = self.core.lock().await;
        if !core.is_current(session) || core.phase != Phase::Loading {
            return;
        }
        warn!("loading timed out for session {}", session);
        self.apply_failure(&mut core, PlaybackError::LoadTimeout, true)
            .await;
    }

    async fn on_retry_elapsed(&self, epoch: u64) {
        {
            let mut core = self.core.lock().await;
            if core.retry.epoch != epoch {
                return;
            }
            core.retry.timer = None;
        }
        self.shuffle_internal(false).await;
    }

    // ========================================================================
    // Failure & retry policy
    // ========================================================================

    /// Handle a failure belonging to the current session
    ///
    /// `teardown` distinguishes session failures (load timeout, stream
    /// error, play rejection), which detach the resource, from pool
    /// failures (no stations available), which leave current playback
    /// untouched.
    async fn apply_failure(&self, core: &mut Core, error: PlaybackError, teardown: bool) {
        core.tuning.stop();
        core.cancel_load_timer();

        if teardown {
            core.source.detach().await;
            core.phase = Phase::Failed;
        }

        if core.retry.manual {
            // Explicit user intent: no silent recovery
            warn!("manual attempt failed: {}", error);
            self.state
                .update(|s| {
                    s.error = Some(error.to_string());
                    s.is_loading = false;
                    if teardown {
                        s.is_playing = false;
                    }
                })
                .await;
            self.state.emit(PlayerEvent::PlaybackError {
                message: error.to_string(),
                attempt: None,
                timestamp: chrono::Utc::now(),
            });
            return;
        }

        core.retry.count += 1;
        let count = core.retry.count;

        if count >= self.cfg.max_retries {
            // Circuit breaker: stop hammering a flaky public directory
            let message = PlaybackError::RetryExhausted.to_string();
            warn!("retries exhausted after {} attempts", count);

            core.source.detach().await;
            core.phase = Phase::Failed;
            core.retry.count = 0;

            self.state
                .update(|s| {
                    s.error = Some(message.clone());
                    s.is_playing = false;
                    s.is_loading = false;
                })
                .await;
            self.state.emit(PlayerEvent::PlaybackError {
                message,
                attempt: Some(count),
                timestamp: chrono::Utc::now(),
            });
            return;
        }

        let message = format!("{} (attempt {}/{})", error, count, self.cfg.max_retries);
        info!("automatic retry scheduled: {}", message);

        self.state
            .update(|s| {
                s.error = Some(message.clone());
                s.is_loading = false;
                if teardown {
                    s.is_playing = false;
                }
            })
            .await;
        self.state.emit(PlayerEvent::PlaybackError {
            message,
            attempt: Some(count),
            timestamp: chrono::Utc::now(),
        });

        // Linear backoff, bounded by the circuit breaker above
        let delay = self.cfg.retry_step * count;
        core.cancel_retry_timer();
        let epoch = core.retry.epoch;
        let weak = self.weak.clone();
        core.retry.timer = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if let Some(controller) = weak.upgrade() {
                controller.on_retry_elapsed(epoch).await;
            }
        }));
    }
}
