//! Great-circle distance between coordinates.

use super::types::{Coordinate, GeoError};

/// Sphere radius used by PostGIS `ST_DistanceSphere`, in meters.
pub const SPHERE_RADIUS_METERS: f64 = 6_370_986.0;

/// Computes surface distance in meters between two coordinates.
///
/// Implementations must be deterministic for identical inputs. Remote
/// implementations own their timeout and retry policy.
pub trait DistanceProvider {
    fn distance_meters(&self, from: Coordinate, to: Coordinate) -> Result<f64, GeoError>;
}

impl<T: DistanceProvider + ?Sized> DistanceProvider for &T {
    fn distance_meters(&self, from: Coordinate, to: Coordinate) -> Result<f64, GeoError> {
        (**self).distance_meters(from, to)
    }
}

/// Haversine distance on a spherical Earth.
#[derive(Debug, Clone, Copy)]
pub struct SphericalDistance {
    radius_meters: f64,
}

impl Default for SphericalDistance {
    fn default() -> Self {
        Self {
            radius_meters: SPHERE_RADIUS_METERS,
        }
    }
}

impl DistanceProvider for SphericalDistance {
    fn distance_meters(&self, from: Coordinate, to: Coordinate) -> Result<f64, GeoError> {
        let from = from.validated()?;
        let to = to.validated()?;

        let lat1 = from.latitude.to_radians();
        let lat2 = to.latitude.to_radians();
        let dlat = lat2 - lat1;
        let dlon = (to.longitude - from.longitude).to_radians();

        let h = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
        // Clamp guards asin against rounding just above 1.0 for antipodal points.
        let c = 2.0 * h.sqrt().min(1.0).asin();

        Ok(self.radius_meters * c)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_zero_distance() {
        let p = Coordinate::new(45.52, -122.68);
        assert_eq!(SphericalDistance::default().distance_meters(p, p).unwrap(), 0.0);
    }

    #[test]
    fn test_one_degree_on_equator() {
        let d = SphericalDistance::default()
            .distance_meters(Coordinate::new(0.0, 0.0), Coordinate::new(0.0, 1.0))
            .unwrap();
        assert_relative_eq!(d, SPHERE_RADIUS_METERS * std::f64::consts::PI / 180.0, epsilon = 1e-6);
    }

    #[test]
    fn test_symmetric() {
        let provider = SphericalDistance::default();
        let stockholm = Coordinate::new(59.3293, 18.0686);
        let oslo = Coordinate::new(59.9139, 10.7522);
        let ab = provider.distance_meters(stockholm, oslo).unwrap();
        let ba = provider.distance_meters(oslo, stockholm).unwrap();
        assert_relative_eq!(ab, ba, epsilon = 1e-9);
        // Roughly 416 km apart.
        assert!((410_000.0..422_000.0).contains(&ab), "got {ab}");
    }

    #[test]
    fn test_antipodal_is_half_circumference() {
        let d = SphericalDistance::default()
            .distance_meters(Coordinate::new(0.0, 0.0), Coordinate::new(0.0, 180.0))
            .unwrap();
        assert_relative_eq!(d, SPHERE_RADIUS_METERS * std::f64::consts::PI, epsilon = 1e-3);
    }

    #[test]
    fn test_rejects_invalid_coordinate() {
        let result = SphericalDistance::default()
            .distance_meters(Coordinate::new(95.0, 0.0), Coordinate::new(0.0, 0.0));
        assert!(matches!(result, Err(GeoError::InvalidCoordinate { .. })));
    }
}
