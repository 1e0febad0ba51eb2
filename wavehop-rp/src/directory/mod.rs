//! Station directory access
//!
//! **Module structure:**
//! - `client.rs`: HTTP client over the public radio directory (mirror
//!   failover, retry, diverse-pool fan-out, play reporting)
//! - `filter.rs`: security filter applied to every fetched pool

pub mod client;
pub mod filter;

pub use client::RadioDirectoryClient;

use crate::error::Result;
use async_trait::async_trait;
use wavehop_common::types::Station;

/// Read side of the station directory, as consumed by the controller
///
/// Methods fail by returning an empty collection or an error, never by
/// silently partial-filling beyond the documented backfill behavior.
#[async_trait]
pub trait StationCatalog: Send + Sync {
    /// Fetch up to `count` random stations
    async fn get_random_stations(&self, count: usize) -> Result<Vec<Station>>;

    /// Fetch up to `count` stations from one country
    async fn get_stations_by_country(&self, country: &str, count: usize) -> Result<Vec<Station>>;

    /// Fetch a geographically diverse pool of up to `count` stations
    ///
    /// Fans out across a curated country list; individual per-country
    /// failures never fail the aggregate call. The merged pool is
    /// security-filtered, deduplicated, backfilled with random stations
    /// when under-filled, shuffled, and truncated to `count`.
    async fn get_diverse_stations(&self, count: usize) -> Result<Vec<Station>>;

    /// Report a successful playback start; best-effort, never surfaced
    async fn report_play(&self, station_id: &str);
}
