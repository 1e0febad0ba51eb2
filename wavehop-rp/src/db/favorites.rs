//! Persisted favorites store
//!
//! Favorited stations keyed by station identifier; survives daemon
//! restarts. Tags are stored as a JSON array in a TEXT column.

use crate::error::Result;
use sqlx::{Pool, Row, Sqlite};
use wavehop_common::types::Station;

/// A favorited station as persisted
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct FavoriteStation {
    pub station_id: String,
    pub name: String,
    pub country: String,
    pub tags: Vec<String>,
    pub url: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl From<FavoriteStation> for Station {
    fn from(fav: FavoriteStation) -> Self {
        Station {
            id: fav.station_id,
            name: fav.name,
            country: fav.country,
            tags: fav.tags,
            url: fav.url,
            url_resolved: None,
        }
    }
}

/// SQLite-backed favorites collection
pub struct FavoritesStore {
    pool: Pool<Sqlite>,
}

impl FavoritesStore {
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }

    /// Add a station to favorites; re-adding an id refreshes its row
    pub async fn add(&self, station: &Station) -> Result<()> {
        let tags = serde_json::to_string(&station.tags).unwrap_or_else(|_| "[]".to_string());
        sqlx::query(
            r#"
            INSERT INTO favorites (station_id, name, country, tags, url, created_at)
            VALUES (?, ?, ?, ?, ?, CURRENT_TIMESTAMP)
            ON CONFLICT(station_id) DO UPDATE SET
                name = excluded.name,
                country = excluded.country,
                tags = excluded.tags,
                url = excluded.url
            "#,
        )
        .bind(&station.id)
        .bind(&station.name)
        .bind(&station.country)
        .bind(tags)
        .bind(station.stream_url())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Remove a station; returns whether a row was deleted
    pub async fn remove(&self, station_id: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM favorites WHERE station_id = ?")
            .bind(station_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Whether the station id is favorited
    pub async fn contains(&self, station_id: &str) -> Result<bool> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM favorites WHERE station_id = ?)")
                .bind(station_id)
                .fetch_one(&self.pool)
                .await?;
        Ok(exists)
    }

    /// All favorites, most recently added first
    pub async fn list(&self) -> Result<Vec<FavoriteStation>> {
        let rows = sqlx::query(
            r#"
            SELECT station_id, name, country, tags, url, created_at
            FROM favorites
            ORDER BY created_at DESC, station_id DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        let favorites = rows
            .into_iter()
            .map(|row| {
                let tags_json: String = row.get("tags");
                FavoriteStation {
                    station_id: row.get("station_id"),
                    name: row.get("name"),
                    country: row.get("country"),
                    tags: serde_json::from_str(&tags_json).unwrap_or_default(),
                    url: row.get("url"),
                    created_at: row.get("created_at"),
                }
            })
            .collect();

        Ok(favorites)
    }
}
