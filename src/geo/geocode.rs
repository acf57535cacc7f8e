//! Address geocoding: OpenStreetMap Nominatim, plus an offline stand-in.

use super::types::{Coordinate, GeoError};
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

pub const DEFAULT_NOMINATIM_URL: &str = "https://nominatim.openstreetmap.org";
pub const DEFAULT_USER_AGENT: &str = concat!("hoodfinder/", env!("CARGO_PKG_VERSION"));

/// Turns a free-text address into a coordinate.
pub trait Geocoder {
    /// `Ok(None)` when the provider knows no such place.
    fn geocode(&self, address: &str) -> Result<Option<Coordinate>, GeoError>;
}

// ─── Nominatim ───────────────────────────────────────────────────

#[derive(Deserialize, Debug, Clone)]
struct NominatimResult {
    lat: String,
    lon: String,
    #[serde(default)]
    display_name: Option<String>,
}

pub struct NominatimGeocoder {
    agent: ureq::Agent,
    base_url: String,
}

impl NominatimGeocoder {
    pub fn new(base_url: &str, user_agent: &str, timeout: Duration) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout(timeout)
            .user_agent(user_agent)
            .build();
        Self {
            agent,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn search_url(&self) -> String {
        format!("{}/search", self.base_url)
    }
}

impl Geocoder for NominatimGeocoder {
    fn geocode(&self, address: &str) -> Result<Option<Coordinate>, GeoError> {
        let response = self
            .agent
            .get(&self.search_url())
            .query("q", address)
            .query("format", "json")
            .query("limit", "1")
            .call()
            .map_err(|e| GeoError::Network(e.to_string()))?;

        let results: Vec<NominatimResult> = response
            .into_json()
            .map_err(|e| GeoError::InvalidResponse(e.to_string()))?;

        let Some(top) = results.into_iter().next() else {
            debug!(address, "nominatim returned no results");
            return Ok(None);
        };
        debug!(address, display_name = ?top.display_name, "nominatim match");
        parse_result(&top).map(Some)
    }
}

fn parse_result(result: &NominatimResult) -> Result<Coordinate, GeoError> {
    let lat: f64 = result
        .lat
        .parse()
        .map_err(|_| GeoError::InvalidResponse(format!("bad latitude '{}'", result.lat)))?;
    let lon: f64 = result
        .lon
        .parse()
        .map_err(|_| GeoError::InvalidResponse(format!("bad longitude '{}'", result.lon)))?;
    Coordinate::new(lat, lon).validated()
}

// ─── Offline ─────────────────────────────────────────────────────

/// Resolves nothing; only attractions carrying coordinates can be placed.
#[derive(Debug, Clone, Copy, Default)]
pub struct OfflineGeocoder;

impl Geocoder for OfflineGeocoder {
    fn geocode(&self, _address: &str) -> Result<Option<Coordinate>, GeoError> {
        Ok(None)
    }
}
