//! Shared observable player state
//!
//! Single-writer (the playback controller), many-reader state with an
//! event broadcast attached: every mutation produces a `StateChanged`
//! push for SSE subscribers.

use tokio::sync::{broadcast, RwLock};
use wavehop_common::events::{EventBus, PlayerEvent};
use wavehop_common::types::PlayerState;

/// Shared state accessible by all components
///
/// Uses RwLock for concurrent read access with rare writes.
pub struct SharedState {
    /// Current player state snapshot
    player: RwLock<PlayerState>,

    /// Event broadcaster for SSE events
    events: EventBus,
}

impl SharedState {
    /// Create new shared state with the given initial volume
    pub fn new(volume: f32) -> Self {
        Self {
            player: RwLock::new(PlayerState::new(volume)),
            events: EventBus::new(100),
        }
    }

    /// Get a snapshot of the current player state
    pub async fn snapshot(&self) -> PlayerState {
        self.player.read().await.clone()
    }

    /// Get current master volume (0.0-1.0)
    pub async fn volume(&self) -> f32 {
        self.player.read().await.volume
    }

    /// Mutate the player state and broadcast the resulting snapshot
    ///
    /// All controller-driven state changes go through here so every
    /// mutation is observable by Presentation clients.
    pub async fn update<F>(&self, f: F) -> PlayerState
    where
        F: FnOnce(&mut PlayerState),
    {
        let snapshot = {
            let mut player = self.player.write().await;
            f(&mut player);
            player.clone()
        };
        self.events.emit_lossy(PlayerEvent::StateChanged {
            state: snapshot.clone(),
            timestamp: chrono::Utc::now(),
        });
        snapshot
    }

    /// Broadcast an event to all SSE listeners
    pub fn emit(&self, event: PlayerEvent) {
        self.events.emit_lossy(event);
    }

    /// Subscribe to the event stream for SSE
    pub fn subscribe_events(&self) -> broadcast::Receiver<PlayerEvent> {
        self.events.subscribe()
    }
}

impl Default for SharedState {
    fn default() -> Self {
        Self::new(0.8)
    }
}
