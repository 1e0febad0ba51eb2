//! Error types for wavehop-rp
//!
//! Two layers: `Error` covers daemon-level failures that propagate to
//! callers (database, HTTP surface, directory), `PlaybackError` is the
//! playback failure taxonomy that funnels into the controller's retry
//! policy and is never thrown across the controller boundary.

use thiserror::Error;

/// Main error type for the wavehop-rp daemon
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration loading errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Database connection or query errors
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// HTTP server errors
    #[error("HTTP server error: {0}")]
    Http(String),

    /// Station directory request errors (all mirrors failed)
    #[error("Directory error: {0}")]
    Directory(String),

    /// File I/O errors
    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Invalid request
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Other errors
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Convenience Result type using the wavehop-rp Error
pub type Result<T> = std::result::Result<T, Error>;

/// Playback failure taxonomy
///
/// Every variant is handled by the controller's failure path; the only
/// events that bypass it are those from a superseded session, which are
/// discarded. Display strings are user-visible.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PlaybackError {
    /// The loading timer elapsed before the stream became playable
    #[error("Station took too long to respond")]
    LoadTimeout,

    /// The stream failed: network, decode, unsupported or insecure source
    #[error("Stream error: {0}")]
    Resource(String),

    /// The resource loaded but refused to start playback
    #[error("Playback was rejected: {0}")]
    PlayRejected(String),

    /// The station pool is empty and the directory returned nothing
    #[error("No stations available")]
    NoStationsAvailable,

    /// Automatic recovery gave up after the retry budget was spent
    #[error("Unable to find working stations. Please try again.")]
    RetryExhausted,
}
