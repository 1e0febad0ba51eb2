//! Configuration loading and data folder resolution
//!
//! Bootstrap configuration is minimal by design: database path, port,
//! logging. Runtime settings (volume) live in the database settings table
//! and are managed by the daemon.
//!
//! Resolution priority for the data folder:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable
//! 3. TOML config file
//! 4. OS-dependent compiled default (fallback)

use crate::{Error, Result};
use serde::Deserialize;
use std::path::PathBuf;

/// Bootstrap configuration loaded from a TOML file
///
/// These settings cannot change during runtime; the daemon must restart to
/// pick up changes.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct BootstrapConfig {
    /// Path to the SQLite database file (relative or absolute)
    #[serde(default)]
    pub database_path: Option<PathBuf>,

    /// HTTP server port
    #[serde(default)]
    pub port: Option<u16>,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Default)]
pub struct LoggingConfig {
    /// Log filter (tracing EnvFilter syntax), e.g. "wavehop_rp=debug"
    #[serde(default)]
    pub filter: Option<String>,
}

impl BootstrapConfig {
    /// Load bootstrap configuration from the platform config file, if any
    ///
    /// A missing file is not an error; an unparsable file is.
    pub fn load() -> Result<Self> {
        let Some(path) = config_file_path() else {
            return Ok(Self::default());
        };
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = std::fs::read_to_string(&path)?;
        toml::from_str(&contents)
            .map_err(|e| Error::Config(format!("Invalid config file {}: {}", path.display(), e)))
    }
}

/// Platform config file location (~/.config/wavehop/config.toml on Linux)
fn config_file_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("wavehop").join("config.toml"))
}

/// Resolve the data folder following the priority order above
pub fn resolve_data_folder(cli_arg: Option<&str>, env_var_name: &str) -> PathBuf {
    if let Some(path) = cli_arg {
        return PathBuf::from(path);
    }

    if let Ok(path) = std::env::var(env_var_name) {
        return PathBuf::from(path);
    }

    get_default_data_folder()
}

/// OS-dependent default data folder path
fn get_default_data_folder() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("wavehop"))
        .unwrap_or_else(|| PathBuf::from("./wavehop_data"))
}
