//! Security filter for fetched station pools
//!
//! Directory entries frequently point at plain-HTTP streams, which a
//! browser Presentation layer cannot load from a secure origin. The
//! filter keeps a station only when it carries a secure stream candidate,
//! normalizing it so `Station::stream_url()` returns the HTTPS one, and
//! drops duplicates by station id.

use std::collections::HashSet;
use url::Url;
use wavehop_common::types::Station;

fn is_https(candidate: &str) -> bool {
    Url::parse(candidate)
        .map(|u| u.scheme() == "https")
        .unwrap_or(false)
}

/// Upgrade a station to its secure stream URL, or drop it
///
/// Preference order: HTTPS resolved URL, then HTTPS primary URL (clearing
/// a non-secure resolved URL so it cannot shadow the secure primary).
/// Stations with no secure candidate are dropped.
pub fn secure_station(mut station: Station) -> Option<Station> {
    if station.url_resolved.as_deref().map(is_https).unwrap_or(false) {
        return Some(station);
    }
    if is_https(&station.url) {
        station.url_resolved = None;
        return Some(station);
    }
    None
}

/// Apply the security filter and drop duplicate ids, preserving order
pub fn filter_and_dedupe(stations: Vec<Station>) -> Vec<Station> {
    let mut seen: HashSet<String> = HashSet::new();
    stations
        .into_iter()
        .filter_map(secure_station)
        .filter(|s| seen.insert(s.id.clone()))
        .collect()
}
