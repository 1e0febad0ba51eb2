//! Station and player-state types shared across wavehop crates

use serde::{Deserialize, Serialize};

/// A radio station as returned by the station directory
///
/// Immutable once fetched; identified by an opaque directory-assigned id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Station {
    /// Opaque unique identifier assigned by the directory
    pub id: String,
    /// Display name
    pub name: String,
    /// Country of origin (may be empty)
    #[serde(default)]
    pub country: String,
    /// Genre/content tags
    #[serde(default)]
    pub tags: Vec<String>,
    /// Primary stream URL
    pub url: String,
    /// Directory-resolved stream URL (playlists unwrapped, scheme upgraded)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url_resolved: Option<String>,
}

impl Station {
    /// The URL playback should connect to
    ///
    /// Prefers the directory-resolved URL when one is present.
    pub fn stream_url(&self) -> &str {
        self.url_resolved.as_deref().unwrap_or(&self.url)
    }
}

/// Observable player state snapshot
///
/// Single writer (the playback controller); readers receive copies via the
/// state endpoint and SSE pushes. Never mutated outside the controller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerState {
    /// Audio is currently producing output
    pub is_playing: bool,
    /// A station switch is in flight (resource not yet playable)
    pub is_loading: bool,
    /// Master volume, 0.0-1.0
    pub volume: f32,
    /// Station targeted by the current playback session
    pub current_station: Option<Station>,
    /// User-visible error, None when healthy
    pub error: Option<String>,
}

impl PlayerState {
    pub fn new(volume: f32) -> Self {
        Self {
            is_playing: false,
            is_loading: false,
            volume: volume.clamp(0.0, 1.0),
            current_station: None,
            error: None,
        }
    }
}

impl Default for PlayerState {
    fn default() -> Self {
        Self::new(0.8)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn station(id: &str) -> Station {
        Station {
            id: id.to_string(),
            name: format!("Station {}", id),
            country: "Iceland".to_string(),
            tags: vec!["jazz".to_string()],
            url: format!("http://example.com/{}", id),
            url_resolved: None,
        }
    }

    #[test]
    fn stream_url_prefers_resolved() {
        let mut s = station("a1");
        assert_eq!(s.stream_url(), "http://example.com/a1");

        s.url_resolved = Some("https://example.com/a1".to_string());
        assert_eq!(s.stream_url(), "https://example.com/a1");
    }

    #[test]
    fn station_serde_round_trip() {
        let s = station("a2");
        let json = serde_json::to_string(&s).unwrap();
        let back: Station = serde_json::from_str(&json).unwrap();
        assert_eq!(back, s);
    }

    #[test]
    fn player_state_clamps_volume() {
        assert_eq!(PlayerState::new(1.7).volume, 1.0);
        assert_eq!(PlayerState::new(-0.2).volume, 0.0);
    }
}
