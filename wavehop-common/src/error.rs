//! Common error types for wavehop

use thiserror::Error;

/// Common result type for wavehop operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised by the shared wavehop library
///
/// Daemon-level failures (database, directory, HTTP surface) carry their
/// own taxonomy in the daemon crate; this covers the shared concerns.
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
