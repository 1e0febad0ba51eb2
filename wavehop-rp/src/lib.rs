//! # Wavehop Radio Player (wavehop-rp)
//!
//! Internet-radio shuffle player daemon.
//!
//! **Purpose:** Discover stations from a public directory, drive the single
//! audio resource through its load/play/fail lifecycle, persist favorites,
//! and expose an HTTP/SSE control surface for the browser UI.
//!
//! **Architecture:** One stateful `PlaybackController` owns the audio
//! source and all retry/debounce/session-identity logic; everything else
//! (directory client, favorites store, HTTP handlers) hangs off it.

pub mod api;
pub mod db;
pub mod directory;
pub mod error;
pub mod playback;
pub mod state;

pub use error::{Error, Result};
pub use state::SharedState;
