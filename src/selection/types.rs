//! Core types for neighborhood selection.

use crate::geo::{Coordinate, GeoError};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A localised community within a larger city (e.g. "Downtown").
///
/// `latitude`/`longitude` are the neighborhood's centroid, not the point that
/// resolved to it. Identity for counting and deduplication is `name` alone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Neighborhood {
    pub name: String,
    #[serde(rename = "city_name", default)]
    pub city: String,
    #[serde(rename = "state_or_province_name", default)]
    pub state_or_province: String,
    #[serde(default)]
    pub country: String,
    pub latitude: f64,
    pub longitude: f64,
}

impl Neighborhood {
    pub fn new(
        name: impl Into<String>,
        city: impl Into<String>,
        state_or_province: impl Into<String>,
        country: impl Into<String>,
        centroid: Coordinate,
    ) -> Self {
        Self {
            name: name.into(),
            city: city.into(),
            state_or_province: state_or_province.into(),
            country: country.into(),
            latitude: centroid.latitude,
            longitude: centroid.longitude,
        }
    }

    pub fn centroid(&self) -> Coordinate {
        Coordinate::new(self.latitude, self.longitude)
    }
}

/// The selected neighborhood and how it won.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Resolution {
    pub neighborhood: Neighborhood,
    /// How many candidates carried the winning name.
    pub occurrences: usize,
    /// Names tied for the highest occurrence, in first-seen order.
    pub tied: Vec<String>,
    /// Sum of distances from the winner to every other tied neighborhood.
    pub total_distance_meters: f64,
}

/// Selection errors.
#[derive(Debug, Error)]
pub enum SelectionError {
    #[error("No candidate neighborhoods to choose from")]
    NoCandidates,

    #[error("Unable to resolve distance between '{from}' and '{to}': {source}")]
    DistanceResolution {
        from: String,
        to: String,
        #[source]
        source: GeoError,
    },
}

impl SelectionError {
    /// Whether a caller may reasonably retry the same request.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::DistanceResolution { .. })
    }
}
