//! Playback session identity
//!
//! Every play attempt gets a fresh, monotonically increasing session id.
//! Async completions (source ready, source error, timers) carry the id
//! they were created under; the controller discards any completion whose
//! id no longer matches the current session. This is the single mechanism
//! that makes station switches safe under overlapping async work.

use wavehop_common::types::Station;

/// Identifier for one playback attempt
///
/// Ordered: a later session always compares greater than the one it
/// superseded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SessionId(u64);

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Allocates session ids; owned exclusively by the controller
#[derive(Debug, Default)]
pub struct SessionCounter(u64);

impl SessionCounter {
    pub fn next(&mut self) -> SessionId {
        self.0 += 1;
        SessionId(self.0)
    }
}

/// One attempt to load and play a specific station
///
/// At most one session is current at any time; creating a new one
/// supersedes the previous one implicitly.
#[derive(Debug, Clone)]
pub struct PlaybackSession {
    pub id: SessionId,
    pub station: Station,
    pub started_at: chrono::DateTime<chrono::Utc>,
}

impl PlaybackSession {
    pub fn new(id: SessionId, station: Station) -> Self {
        Self {
            id,
            station,
            started_at: chrono::Utc::now(),
        }
    }
}
