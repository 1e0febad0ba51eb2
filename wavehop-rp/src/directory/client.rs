//! HTTP client for the public radio directory
//!
//! The directory is served by a set of equivalent community mirrors; any
//! of them can be slow or down at a given moment, so every call walks the
//! mirror list with a bounded per-mirror retry and takes the first
//! success. Responses are security-filtered before they reach callers.

use crate::directory::filter::filter_and_dedupe;
use crate::directory::StationCatalog;
use crate::error::{Error, Result};
use async_trait::async_trait;
use rand::seq::SliceRandom;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, warn};
use wavehop_common::types::Station;

/// Default directory mirror base URLs, tried in order
pub const DEFAULT_MIRRORS: &[&str] = &[
    "https://de1.api.radio-browser.info",
    "https://nl1.api.radio-browser.info",
    "https://at1.api.radio-browser.info",
];

/// Countries fanned out over by `get_diverse_stations`
const DIVERSE_COUNTRIES: &[&str] = &[
    "France",
    "Germany",
    "Japan",
    "Brazil",
    "United Kingdom",
    "Australia",
    "India",
    "South Africa",
    "Mexico",
    "Italy",
    "Canada",
    "South Korea",
];

/// Per-request timeout against a single mirror
const REQUEST_TIMEOUT: Duration = Duration::from_secs(8);

/// Attempts per mirror before moving to the next one
const ATTEMPTS_PER_MIRROR: u32 = 2;

/// Largest station count a single query will ask for
const MAX_COUNT: usize = 200;

/// Station record as the directory serves it
#[derive(Debug, Deserialize)]
struct ApiStation {
    stationuuid: String,
    name: String,
    #[serde(default)]
    country: String,
    /// Comma-separated tag list
    #[serde(default)]
    tags: String,
    url: String,
    #[serde(default)]
    url_resolved: String,
}

impl From<ApiStation> for Station {
    fn from(api: ApiStation) -> Self {
        let url_resolved = if api.url_resolved.is_empty() || api.url_resolved == api.url {
            None
        } else {
            Some(api.url_resolved)
        };
        Station {
            id: api.stationuuid,
            name: api.name.trim().to_string(),
            country: api.country,
            tags: api
                .tags
                .split(',')
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .map(str::to_string)
                .collect(),
            url: api.url,
            url_resolved,
        }
    }
}

/// Client over the public radio directory mirrors
pub struct RadioDirectoryClient {
    client: reqwest::Client,
    mirrors: Vec<String>,
}

impl RadioDirectoryClient {
    pub fn new() -> Self {
        Self::with_mirrors(DEFAULT_MIRRORS.iter().map(|m| m.to_string()).collect())
    }

    /// Build a client against a custom mirror list (used by tests)
    pub fn with_mirrors(mirrors: Vec<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(concat!("wavehop/", env!("CARGO_PKG_VERSION")))
            .build()
            .unwrap_or_default();
        Self { client, mirrors }
    }

    /// GET `path` with `query`, walking mirrors until one succeeds
    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T> {
        let mut last_error = String::from("no mirrors configured");

        for mirror in &self.mirrors {
            for attempt in 1..=ATTEMPTS_PER_MIRROR {
                let url = format!("{mirror}{path}");
                let result = self.client.get(&url).query(query).send().await;
                match result {
                    Ok(response) if response.status().is_success() => {
                        match response.json::<T>().await {
                            Ok(parsed) => return Ok(parsed),
                            Err(e) => {
                                last_error = format!("{url}: invalid response: {e}");
                            }
                        }
                    }
                    Ok(response) => {
                        last_error = format!("{url}: HTTP {}", response.status());
                    }
                    Err(e) => {
                        last_error = format!("{url}: {e}");
                    }
                }
                debug!(
                    "directory request failed (attempt {}/{}): {}",
                    attempt, ATTEMPTS_PER_MIRROR, last_error
                );
            }
            warn!("directory mirror exhausted: {}", mirror);
        }

        Err(Error::Directory(last_error))
    }

    async fn search(&self, extra: &[(&str, String)], count: usize) -> Result<Vec<Station>> {
        let count = count.min(MAX_COUNT);
        let mut query: Vec<(&str, String)> = vec![
            ("limit", count.to_string()),
            ("hidebroken", "true".to_string()),
        ];
        query.extend(extra.iter().cloned());

        let stations: Vec<ApiStation> = self.get_json("/json/stations/search", &query).await?;
        Ok(filter_and_dedupe(
            stations.into_iter().map(Station::from).collect(),
        ))
    }
}

impl Default for RadioDirectoryClient {
    fn default() -> Self {
        Self::new()
    }
}

/// Merge result of the fan-out into the final pool: security-filter,
/// dedupe by id, shuffle, truncate
fn finalize_pool(pool: Vec<Station>, count: usize) -> Vec<Station> {
    let mut pool = filter_and_dedupe(pool);
    pool.shuffle(&mut rand::thread_rng());
    pool.truncate(count);
    pool
}

#[async_trait]
impl StationCatalog for RadioDirectoryClient {
    async fn get_random_stations(&self, count: usize) -> Result<Vec<Station>> {
        self.search(&[("order", "random".to_string())], count).await
    }

    async fn get_stations_by_country(&self, country: &str, count: usize) -> Result<Vec<Station>> {
        self.search(
            &[
                ("country", country.to_string()),
                ("order", "clickcount".to_string()),
                ("reverse", "true".to_string()),
            ],
            count,
        )
        .await
    }

    async fn get_diverse_stations(&self, count: usize) -> Result<Vec<Station>> {
        let per_country = (count / DIVERSE_COUNTRIES.len()).max(1);

        // Fan out; a failed country never fails the aggregate call
        let fetches = DIVERSE_COUNTRIES
            .iter()
            .map(|country| self.get_stations_by_country(country, per_country));
        let results = futures::future::join_all(fetches).await;

        let mut pool: Vec<Station> = Vec::with_capacity(count);
        for (country, result) in DIVERSE_COUNTRIES.iter().zip(results) {
            match result {
                Ok(stations) => pool.extend(stations),
                Err(e) => warn!("diverse fetch failed for {}: {}", country, e),
            }
        }

        // Backfill when the curated countries under-fill the pool
        if pool.len() < count {
            let missing = count - pool.len();
            match self.get_random_stations(missing * 2).await {
                Ok(stations) => pool.extend(stations),
                Err(e) => warn!("backfill fetch failed: {}", e),
            }
        }

        Ok(finalize_pool(pool, count))
    }

    async fn report_play(&self, station_id: &str) {
        // Best-effort popularity ping; failures are logged and forgotten
        for mirror in &self.mirrors {
            let url = format!("{mirror}/json/url/{station_id}");
            match self.client.get(&url).send().await {
                Ok(response) if response.status().is_success() => return,
                Ok(response) => debug!("play report got HTTP {} from {}", response.status(), url),
                Err(e) => debug!("play report failed against {}: {}", url, e),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_station_maps_tags_and_resolved_url() {
        let api = ApiStation {
            stationuuid: "uuid-1".to_string(),
            name: "  Jazz FM ".to_string(),
            country: "Iceland".to_string(),
            tags: "jazz, smooth , ,night".to_string(),
            url: "http://stream.example/jazz".to_string(),
            url_resolved: "https://stream.example/jazz".to_string(),
        };
        let station = Station::from(api);
        assert_eq!(station.id, "uuid-1");
        assert_eq!(station.name, "Jazz FM");
        assert_eq!(station.tags, vec!["jazz", "smooth", "night"]);
        assert_eq!(station.stream_url(), "https://stream.example/jazz");
    }

    #[test]
    fn identical_resolved_url_collapses_to_none() {
        let api = ApiStation {
            stationuuid: "uuid-2".to_string(),
            name: "X".to_string(),
            country: String::new(),
            tags: String::new(),
            url: "https://stream.example/x".to_string(),
            url_resolved: "https://stream.example/x".to_string(),
        };
        let station = Station::from(api);
        assert!(station.url_resolved.is_none());
    }

    fn pool_station(id: &str) -> Station {
        Station {
            id: id.to_string(),
            name: id.to_string(),
            country: String::new(),
            tags: Vec::new(),
            url: format!("https://stream.example/{}", id),
            url_resolved: None,
        }
    }

    #[test]
    fn finalize_pool_dedupes_and_truncates() {
        let pool = vec![
            pool_station("a"),
            pool_station("b"),
            pool_station("a"),
            pool_station("c"),
            pool_station("d"),
        ];
        let finalized = finalize_pool(pool, 3);
        assert_eq!(finalized.len(), 3);

        let mut ids: Vec<&str> = finalized.iter().map(|s| s.id.as_str()).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), 3, "no duplicate ids may survive");
    }

    #[test]
    fn finalize_pool_drops_insecure_backfill() {
        let mut insecure = pool_station("x");
        insecure.url = "http://stream.example/x".to_string();
        let pool = vec![pool_station("a"), insecure];
        let finalized = finalize_pool(pool, 10);
        assert_eq!(finalized.len(), 1);
        assert_eq!(finalized[0].id, "a");
    }

    #[tokio::test]
    async fn all_mirrors_failing_yields_directory_error() {
        // Unroutable mirror: connection refused immediately
        let client =
            RadioDirectoryClient::with_mirrors(vec!["http://127.0.0.1:1".to_string()]);
        let err = client.get_random_stations(5).await.unwrap_err();
        assert!(matches!(err, Error::Directory(_)));
    }

    #[tokio::test]
    async fn diverse_fetch_tolerates_failing_subrequests() {
        // Every per-country fetch and the backfill fail, yet the
        // aggregate call still succeeds with whatever it gathered
        let client =
            RadioDirectoryClient::with_mirrors(vec!["http://127.0.0.1:1".to_string()]);
        let stations = client.get_diverse_stations(10).await.unwrap();
        assert!(stations.is_empty());
    }
}
