//! Playback subsystem
//!
//! **Module structure:**
//! - `controller.rs`: PlaybackController (session arbitration, retry
//!   policy, debounce, volume/favorites glue)
//! - `session.rs`: per-attempt session identity
//! - `source.rs`: audio source seam + HTTP stream implementation
//! - `tuning.rs`: cosmetic tuning static played during switches

pub mod controller;
pub mod session;
pub mod source;
pub mod tuning;

pub use controller::{ControllerConfig, PlaybackController};
pub use session::{PlaybackSession, SessionId};
pub use source::{AudioSource, HttpAudioSource, SourceEvent, SourceEventKind};
pub use tuning::TuningEffect;
