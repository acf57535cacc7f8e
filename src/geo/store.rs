//! File-backed neighborhood polygons.
//!
//! Dataset: a JSON array of records, each with one or more rings of
//! `[longitude, latitude]` pairs. Containment is even-odd ray casting in
//! degree space; centroids are area-weighted planar centroids.

use super::distance::DistanceProvider;
use super::types::{Coordinate, GeoError};
use crate::selection::Neighborhood;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::{debug, warn};

/// One neighborhood as stored in the dataset file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NeighborhoodRecord {
    pub name: String,
    pub city: String,
    pub state: String,
    #[serde(default)]
    pub country: String,
    pub polygons: Vec<Vec<[f64; 2]>>,
}

/// A neighborhood's identity, without geometry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Area {
    pub name: String,
    pub city: String,
    pub state: String,
    pub country: String,
}

/// Point-to-neighborhood resolution.
pub trait GeospatialLookup {
    /// Every area whose polygon contains `point`.
    fn containing(&self, point: Coordinate) -> Result<Vec<Area>, GeoError>;

    /// Centroid of the area matching name, city and state, ignoring case.
    fn centroid(&self, name: &str, city: &str, state: &str) -> Result<Option<Coordinate>, GeoError>;

    /// Resolve `point` to a single neighborhood.
    ///
    /// No containing area gives `None`. Several give the one whose centroid is
    /// nearest to `point`; areas whose centroid or distance cannot be
    /// resolved are skipped.
    fn locate(&self, point: Coordinate, distance: &dyn DistanceProvider) -> Result<Option<Neighborhood>, GeoError> {
        let mut best: Option<(Neighborhood, f64)> = None;

        for area in self.containing(point)? {
            let centroid = match self.centroid(&area.name, &area.city, &area.state) {
                Ok(Some(c)) => c,
                Ok(None) => {
                    warn!(name = %area.name, "no centroid for containing neighborhood");
                    continue;
                }
                Err(e) => {
                    warn!(name = %area.name, error = %e, "unable to resolve centroid");
                    continue;
                }
            };
            let meters = match distance.distance_meters(centroid, point) {
                Ok(m) => m,
                Err(e) => {
                    warn!(name = %area.name, error = %e, "unable to measure distance to centroid");
                    continue;
                }
            };
            if best.as_ref().map_or(true, |(_, d)| meters < *d) {
                let hood = Neighborhood::new(area.name, area.city, area.state, area.country, centroid);
                best = Some((hood, meters));
            }
        }

        Ok(best.map(|(hood, _)| hood))
    }
}

struct Entry {
    record: NeighborhoodRecord,
    centroid: Coordinate,
}

impl Entry {
    fn area(&self) -> Area {
        Area {
            name: self.record.name.clone(),
            city: self.record.city.clone(),
            state: self.record.state.clone(),
            country: self.record.country.clone(),
        }
    }

    fn to_neighborhood(&self) -> Neighborhood {
        Neighborhood::new(
            self.record.name.clone(),
            self.record.city.clone(),
            self.record.state.clone(),
            self.record.country.clone(),
            self.centroid,
        )
    }
}

/// In-memory polygon store.
pub struct PolygonStore {
    entries: Vec<Entry>,
}

impl PolygonStore {
    /// Load and validate a dataset file.
    pub fn load(path: &Path) -> Result<Self, GeoError> {
        let data = fs::read_to_string(path)?;
        let records: Vec<NeighborhoodRecord> = serde_json::from_str(&data)?;
        let store = Self::from_records(records)?;
        debug!(path = %path.display(), neighborhoods = store.len(), "dataset loaded");
        Ok(store)
    }

    pub fn from_records(records: Vec<NeighborhoodRecord>) -> Result<Self, GeoError> {
        let entries = records
            .into_iter()
            .map(|record| {
                validate(&record)?;
                let centroid = rings_centroid(&record.polygons);
                Ok(Entry { record, centroid })
            })
            .collect::<Result<Vec<_>, GeoError>>()?;
        Ok(Self { entries })
    }

    /// Every stored neighborhood with its centroid, in dataset order.
    pub fn neighborhoods(&self) -> Vec<Neighborhood> {
        self.entries.iter().map(Entry::to_neighborhood).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl GeospatialLookup for PolygonStore {
    fn containing(&self, point: Coordinate) -> Result<Vec<Area>, GeoError> {
        let point = point.validated()?;
        Ok(self
            .entries
            .iter()
            .filter(|e| e.record.polygons.iter().any(|ring| ring_contains(ring, point)))
            .map(Entry::area)
            .collect())
    }

    fn centroid(&self, name: &str, city: &str, state: &str) -> Result<Option<Coordinate>, GeoError> {
        Ok(self
            .entries
            .iter()
            .find(|e| {
                e.record.name.eq_ignore_ascii_case(name)
                    && e.record.city.to_lowercase() == city.to_lowercase()
                    && e.record.state.to_lowercase() == state.to_lowercase()
            })
            .map(|e| e.centroid))
    }
}

fn validate(record: &NeighborhoodRecord) -> Result<(), GeoError> {
    if record.name.trim().is_empty() {
        return Err(GeoError::Dataset("neighborhood with empty name".into()));
    }
    if record.polygons.is_empty() {
        return Err(GeoError::Dataset(format!("'{}' has no polygons", record.name)));
    }
    for ring in &record.polygons {
        if ring.len() < 3 {
            return Err(GeoError::Dataset(format!(
                "'{}' has a ring with {} points (need at least 3)",
                record.name,
                ring.len()
            )));
        }
        if let Some([lon, lat]) = ring.iter().find(|[lon, lat]| !Coordinate::new(*lat, *lon).is_valid()) {
            return Err(GeoError::Dataset(format!(
                "'{}' has an invalid vertex [{}, {}]",
                record.name, lon, lat
            )));
        }
    }
    Ok(())
}

/// Even-odd test; points on an edge may land either way.
fn ring_contains(ring: &[[f64; 2]], point: Coordinate) -> bool {
    let (x, y) = (point.longitude, point.latitude);
    let mut inside = false;
    let mut j = ring.len() - 1;
    for i in 0..ring.len() {
        let [xi, yi] = ring[i];
        let [xj, yj] = ring[j];
        if (yi > y) != (yj > y) && x < (xj - xi) * (y - yi) / (yj - yi) + xi {
            inside = !inside;
        }
        j = i;
    }
    inside
}

fn rings_centroid(rings: &[Vec<[f64; 2]>]) -> Coordinate {
    let mut weighted_x = 0.0;
    let mut weighted_y = 0.0;
    let mut total_area = 0.0;

    for ring in rings {
        // Shoelace terms relative to the first vertex; raw degrees cancel badly.
        let Some(&[ox, oy]) = ring.first() else {
            continue;
        };
        let mut area2 = 0.0;
        let mut cx = 0.0;
        let mut cy = 0.0;
        for i in 0..ring.len() {
            let [x0, y0] = ring[i];
            let [x1, y1] = ring[(i + 1) % ring.len()];
            let (x0, y0, x1, y1) = (x0 - ox, y0 - oy, x1 - ox, y1 - oy);
            let cross = x0 * y1 - x1 * y0;
            area2 += cross;
            cx += (x0 + x1) * cross;
            cy += (y0 + y1) * cross;
        }
        if area2 == 0.0 {
            continue;
        }
        // Ring centroid is origin + (cx, cy) / (3 * area2); weight it by |area2| / 2.
        let weight = area2.abs() / 2.0;
        weighted_x += (ox + cx / (3.0 * area2)) * weight;
        weighted_y += (oy + cy / (3.0 * area2)) * weight;
        total_area += weight;
    }

    if total_area > 0.0 {
        return Coordinate::new(weighted_y / total_area, weighted_x / total_area);
    }

    let vertices: Vec<&[f64; 2]> = rings.iter().flatten().collect();
    let n = vertices.len().max(1) as f64;
    let (sx, sy) = vertices.iter().fold((0.0, 0.0), |(sx, sy), [x, y]| (sx + *x, sy + *y));
    Coordinate::new(sy / n, sx / n)
}
