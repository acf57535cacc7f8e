//! Geospatial collaborators of the selection core.
//!
//! Provides great-circle distance, a polygon-backed neighborhood store,
//! and address geocoding through OpenStreetMap Nominatim.

pub mod distance;
pub mod geocode;
pub mod store;
pub mod types;

pub use distance::{DistanceProvider, SphericalDistance};
pub use geocode::{Geocoder, NominatimGeocoder, OfflineGeocoder};
pub use store::{GeospatialLookup, NeighborhoodRecord, PolygonStore};
pub use types::{Coordinate, GeoError};
