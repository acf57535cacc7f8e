//! Attraction batches: geocode each point, place it in a neighborhood, then
//! pick the best neighborhood for the whole batch.

use crate::geo::{Coordinate, DistanceProvider, GeoError, Geocoder, GeospatialLookup};
use crate::selection::{BestNeighborhoodResolver, Neighborhood, SelectionError};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

/// A point of interest, by address or by coordinates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attraction {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,
}

impl Attraction {
    fn coordinate(&self) -> Option<Coordinate> {
        match (self.latitude, self.longitude) {
            (Some(lat), Some(lon)) => Some(Coordinate::new(lat, lon)),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AttractionsReport {
    pub successful_attractions: Vec<Attraction>,
    pub failed_attractions: Vec<Attraction>,
    /// `None` when no attraction landed in any neighborhood.
    pub closest_neighborhood: Option<Neighborhood>,
}

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Neighborhood lookup failed for '{attraction}': {source}")]
    Lookup {
        attraction: String,
        #[source]
        source: GeoError,
    },

    #[error(transparent)]
    Selection(#[from] SelectionError),
}

/// Runs a batch of attractions through geocoder, store and resolver.
pub struct AttractionPipeline<'a> {
    geocoder: &'a dyn Geocoder,
    lookup: &'a dyn GeospatialLookup,
    distance: &'a dyn DistanceProvider,
}

impl<'a> AttractionPipeline<'a> {
    pub fn new(
        geocoder: &'a dyn Geocoder,
        lookup: &'a dyn GeospatialLookup,
        distance: &'a dyn DistanceProvider,
    ) -> Self {
        Self {
            geocoder,
            lookup,
            distance,
        }
    }

    pub fn run(&self, attractions: Vec<Attraction>) -> Result<AttractionsReport, PipelineError> {
        let mut report = AttractionsReport::default();
        let mut candidates = Vec::new();

        for mut attraction in attractions {
            let Some(point) = self.place(&attraction) else {
                report.failed_attractions.push(attraction);
                continue;
            };
            attraction.latitude = Some(point.latitude);
            attraction.longitude = Some(point.longitude);

            match self.lookup.locate(point, self.distance) {
                Ok(Some(hood)) => {
                    debug!(attraction = %attraction.name, neighborhood = %hood.name, "attraction located");
                    candidates.push(hood);
                }
                Ok(None) => debug!(attraction = %attraction.name, %point, "attraction outside every neighborhood"),
                Err(source) => {
                    return Err(PipelineError::Lookup {
                        attraction: attraction.name,
                        source,
                    })
                }
            }
            report.successful_attractions.push(attraction);
        }

        let resolver = BestNeighborhoodResolver::new(self.distance);
        report.closest_neighborhood = match resolver.resolve(&candidates) {
            Ok(resolution) => Some(resolution.neighborhood),
            Err(SelectionError::NoCandidates) => None,
            Err(e) => return Err(e.into()),
        };

        info!(
            succeeded = report.successful_attractions.len(),
            failed = report.failed_attractions.len(),
            candidates = candidates.len(),
            closest = ?report.closest_neighborhood.as_ref().map(|n| n.name.as_str()),
            "attractions resolved"
        );
        Ok(report)
    }

    /// Coordinates for an attraction, geocoding its address when needed.
    fn place(&self, attraction: &Attraction) -> Option<Coordinate> {
        if let Some(c) = attraction.coordinate() {
            if c.is_valid() {
                return Some(c);
            }
            warn!(attraction = %attraction.name, "attraction carries invalid coordinates");
            return None;
        }

        let address = attraction.address.as_deref().map(str::trim).filter(|a| !a.is_empty())?;
        match self.geocoder.geocode(address) {
            Ok(found) => found,
            Err(e) => {
                warn!(attraction = %attraction.name, error = %e, "geocoding failed");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::store::tests::portland_store;
    use crate::geo::{OfflineGeocoder, SphericalDistance};
    use std::collections::HashMap;

    struct FakeGeocoder(HashMap<&'static str, Coordinate>);

    impl Geocoder for FakeGeocoder {
        fn geocode(&self, address: &str) -> Result<Option<Coordinate>, GeoError> {
            if address == "explode" {
                return Err(GeoError::Network("timed out".into()));
            }
            Ok(self.0.get(address).copied())
        }
    }

    struct BrokenLookup;

    impl GeospatialLookup for BrokenLookup {
        fn containing(&self, _point: Coordinate) -> Result<Vec<crate::geo::store::Area>, GeoError> {
            Err(GeoError::Dataset("connection refused".into()))
        }

        fn centroid(&self, _: &str, _: &str, _: &str) -> Result<Option<Coordinate>, GeoError> {
            Ok(None)
        }
    }

    struct FailingDistance;

    impl DistanceProvider for FailingDistance {
        fn distance_meters(&self, _: Coordinate, _: Coordinate) -> Result<f64, GeoError> {
            Err(GeoError::Network("distance service down".into()))
        }
    }

    fn at(name: &str, lat: f64, lon: f64) -> Attraction {
        Attraction {
            name: name.into(),
            address: None,
            latitude: Some(lat),
            longitude: Some(lon),
        }
    }

    fn by_address(name: &str, address: &str) -> Attraction {
        Attraction {
            name: name.into(),
            address: Some(address.into()),
            latitude: None,
            longitude: None,
        }
    }

    fn geocoder() -> FakeGeocoder {
        FakeGeocoder(HashMap::from([
            ("Powell's Books", Coordinate::new(45.5231, -122.6814)),
            ("Lan Su Garden", Coordinate::new(45.5253, -122.6733)),
        ]))
    }

    #[test]
    fn test_most_frequent_neighborhood_wins() {
        let store = portland_store();
        let distance = SphericalDistance::default();
        let geocoder = geocoder();
        let pipeline = AttractionPipeline::new(&geocoder, &store, &distance);

        let report = pipeline
            .run(vec![
                by_address("Powell's", "Powell's Books"),
                at("Pioneer Square", 45.5189, -122.6795),
                at("Buckman Field", 45.5180, -122.6500),
            ])
            .unwrap();

        assert_eq!(report.successful_attractions.len(), 3);
        assert!(report.failed_attractions.is_empty());
        assert_eq!(report.closest_neighborhood.unwrap().name, "Downtown");
        assert_eq!(report.successful_attractions[0].latitude, Some(45.5231));
    }

    #[test]
    fn test_failed_geocoding_is_reported() {
        let store = portland_store();
        let distance = SphericalDistance::default();
        let geocoder = geocoder();
        let pipeline = AttractionPipeline::new(&geocoder, &store, &distance);

        let report = pipeline
            .run(vec![
                by_address("Nowhere", "unknown place"),
                by_address("Timeout", "explode"),
                Attraction {
                    name: "No location".into(),
                    address: None,
                    latitude: None,
                    longitude: None,
                },
                at("Broken", 95.0, 0.0),
                at("Buckman Field", 45.5180, -122.6500),
            ])
            .unwrap();

        assert_eq!(report.failed_attractions.len(), 4);
        assert_eq!(report.successful_attractions.len(), 1);
        assert_eq!(report.closest_neighborhood.unwrap().name, "Buckman");
    }

    #[test]
    fn test_points_outside_all_polygons() {
        let store = portland_store();
        let distance = SphericalDistance::default();
        let pipeline = AttractionPipeline::new(&OfflineGeocoder, &store, &distance);

        let report = pipeline.run(vec![at("Seattle Center", 47.6205, -122.3493)]).unwrap();
        assert_eq!(report.successful_attractions.len(), 1);
        assert!(report.closest_neighborhood.is_none());
    }

    #[test]
    fn test_empty_batch() {
        let store = portland_store();
        let distance = SphericalDistance::default();
        let pipeline = AttractionPipeline::new(&OfflineGeocoder, &store, &distance);
        let report = pipeline.run(Vec::new()).unwrap();
        assert_eq!(report, AttractionsReport::default());
    }

    #[test]
    fn test_lookup_failure_propagates() {
        let distance = SphericalDistance::default();
        let pipeline = AttractionPipeline::new(&OfflineGeocoder, &BrokenLookup, &distance);
        let err = pipeline.run(vec![at("Anywhere", 45.52, -122.68)]).unwrap_err();
        assert!(matches!(err, PipelineError::Lookup { .. }));
    }

    #[test]
    fn test_failing_distance_locates_nothing() {
        // Locating measures centroid distance too, so every containing
        // area is skipped and no candidate survives.
        let store = portland_store();
        let pipeline = AttractionPipeline::new(&OfflineGeocoder, &store, &FailingDistance);
        let report = pipeline
            .run(vec![at("Pioneer Square", 45.5189, -122.6795), at("Buckman Field", 45.5180, -122.6500)])
            .unwrap();
        assert_eq!(report.successful_attractions.len(), 2);
        assert!(report.closest_neighborhood.is_none());
    }

    /// Places points by latitude sign without measuring anything.
    struct HalfPlaneLookup;

    impl GeospatialLookup for HalfPlaneLookup {
        fn containing(&self, _point: Coordinate) -> Result<Vec<crate::geo::store::Area>, GeoError> {
            Ok(Vec::new())
        }

        fn centroid(&self, _: &str, _: &str, _: &str) -> Result<Option<Coordinate>, GeoError> {
            Ok(None)
        }

        fn locate(&self, point: Coordinate, _: &dyn DistanceProvider) -> Result<Option<Neighborhood>, GeoError> {
            let name = if point.latitude >= 0.0 { "North" } else { "South" };
            Ok(Some(Neighborhood::new(name, "", "", "", Coordinate::new(point.latitude.signum(), 0.0))))
        }
    }

    #[test]
    fn test_distance_failure_during_tie_break() {
        let pipeline = AttractionPipeline::new(&OfflineGeocoder, &HalfPlaneLookup, &FailingDistance);
        let err = pipeline.run(vec![at("Up", 10.0, 0.0), at("Down", -10.0, 0.0)]).unwrap_err();
        match err {
            PipelineError::Selection(e) => assert!(e.is_retryable()),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_demo_batch_offline() {
        let root = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("demos");
        let store = crate::geo::PolygonStore::load(&root.join("portland_neighborhoods.json")).unwrap();
        let attractions: Vec<Attraction> =
            serde_json::from_str(&std::fs::read_to_string(root.join("attractions.json")).unwrap()).unwrap();
        let distance = SphericalDistance::default();
        let pipeline = AttractionPipeline::new(&OfflineGeocoder, &store, &distance);

        let report = pipeline.run(attractions).unwrap();
        // The address-only attraction cannot be geocoded offline.
        assert_eq!(report.failed_attractions.len(), 1);
        assert_eq!(report.successful_attractions.len(), 4);
        assert_eq!(report.closest_neighborhood.unwrap().name, "Downtown");
    }

    #[test]
    fn test_attraction_wire_format() {
        let a: Attraction = serde_json::from_str(r#"{"name":"Zoo","address":"4001 SW Canyon Rd"}"#).unwrap();
        assert_eq!(a.address.as_deref(), Some("4001 SW Canyon Rd"));
        let json = serde_json::to_value(&a).unwrap();
        assert!(json.get("latitude").is_none());
    }
}
