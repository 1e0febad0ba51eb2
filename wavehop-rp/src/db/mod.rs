//! Database access layer
//!
//! SQLite persistence for favorites and runtime settings.

pub mod favorites;
pub mod init;
pub mod settings;

pub use favorites::FavoritesStore;

use crate::error::Result;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Pool, Sqlite};
use std::path::Path;

/// Open (creating if missing) the daemon database
pub async fn open_pool(path: &Path) -> Result<Pool<Sqlite>> {
    let options = SqliteConnectOptions::new()
        .filename(path)
        .create_if_missing(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await?;

    Ok(pool)
}
