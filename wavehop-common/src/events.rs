//! Event types for the wavehop event system
//!
//! The daemon broadcasts `PlayerEvent`s on every observable state mutation;
//! the SSE endpoint relays them verbatim to connected Presentation clients.

use crate::types::{PlayerState, Station};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// Player event types
///
/// Serialized with a `type` tag for SSE transmission.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum PlayerEvent {
    /// Full player state snapshot, pushed on every mutation
    StateChanged {
        state: PlayerState,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// A new playback session targets a different station
    StationChanged {
        station: Station,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Master volume changed
    VolumeChanged {
        volume: f32,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// A playback failure was surfaced to the user
    PlaybackError {
        message: String,
        /// Automatic-retry attempt that produced the failure, if any
        attempt: Option<u32>,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// A station was added to favorites
    FavoriteAdded {
        station_id: String,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// A station was removed from favorites
    FavoriteRemoved {
        station_id: String,
        timestamp: chrono::DateTime<chrono::Utc>,
    },
}

impl PlayerEvent {
    /// Event type string used as the SSE `event:` field
    pub fn type_str(&self) -> &'static str {
        match self {
            PlayerEvent::StateChanged { .. } => "StateChanged",
            PlayerEvent::StationChanged { .. } => "StationChanged",
            PlayerEvent::VolumeChanged { .. } => "VolumeChanged",
            PlayerEvent::PlaybackError { .. } => "PlaybackError",
            PlayerEvent::FavoriteAdded { .. } => "FavoriteAdded",
            PlayerEvent::FavoriteRemoved { .. } => "FavoriteRemoved",
        }
    }
}

// ========================================
// EventBus
// ========================================

/// Central event distribution bus
///
/// Wraps tokio::broadcast: non-blocking publish, multiple concurrent
/// subscribers, automatic cleanup when subscribers drop.
#[derive(Clone)]
pub struct EventBus {
    tx: broadcast::Sender<PlayerEvent>,
    capacity: usize,
}

impl EventBus {
    /// Creates a new EventBus with the given channel capacity
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx, capacity }
    }

    /// Subscribe to all future events
    pub fn subscribe(&self) -> broadcast::Receiver<PlayerEvent> {
        self.tx.subscribe()
    }

    /// Emit an event to all subscribers
    ///
    /// Returns `Ok(subscriber_count)`, or `Err` when no subscriber is
    /// listening.
    pub fn emit(
        &self,
        event: PlayerEvent,
    ) -> Result<usize, broadcast::error::SendError<PlayerEvent>> {
        self.tx.send(event)
    }

    /// Emit an event, ignoring the no-subscribers case
    pub fn emit_lossy(&self, event: PlayerEvent) {
        let _ = self.tx.send(event);
    }

    /// Configured channel capacity
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of live subscribers
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn eventbus_new() {
        let bus = EventBus::new(100);
        assert_eq!(bus.capacity(), 100);
        assert_eq!(bus.subscriber_count(), 0);
    }

    #[test]
    fn eventbus_subscribe() {
        let bus = EventBus::new(100);
        let _rx = bus.subscribe();
        assert_eq!(bus.subscriber_count(), 1);

        let _rx2 = bus.subscribe();
        assert_eq!(bus.subscriber_count(), 2);
    }

    #[tokio::test]
    async fn eventbus_emit_no_subscribers() {
        let bus = EventBus::new(100);
        let event = PlayerEvent::VolumeChanged {
            volume: 0.5,
            timestamp: chrono::Utc::now(),
        };

        assert!(bus.emit(event.clone()).is_err());
        // Lossy emit must not panic without subscribers
        bus.emit_lossy(event);
    }

    #[tokio::test]
    async fn eventbus_emit_with_subscriber() {
        let bus = EventBus::new(100);
        let mut rx = bus.subscribe();

        bus.emit(PlayerEvent::VolumeChanged {
            volume: 0.25,
            timestamp: chrono::Utc::now(),
        })
        .unwrap();

        match rx.recv().await.unwrap() {
            PlayerEvent::VolumeChanged { volume, .. } => assert_eq!(volume, 0.25),
            other => panic!("Wrong event type received: {:?}", other),
        }
    }

    #[test]
    fn event_serializes_with_type_tag() {
        let event = PlayerEvent::PlaybackError {
            message: "stream unreachable".to_string(),
            attempt: Some(2),
            timestamp: chrono::Utc::now(),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "PlaybackError");
        assert_eq!(json["attempt"], 2);
        assert_eq!(event.type_str(), "PlaybackError");
    }
}
