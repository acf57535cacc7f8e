//! Per-call memo of pairwise neighborhood distances.
//!
//! Keys are symmetric: `(A, B)` and `(B, A)` share one entry. A cache lives
//! for a single resolution and is dropped with it, so it never serves values
//! computed against an older dataset.

use super::types::Neighborhood;
use crate::geo::{DistanceProvider, GeoError};
use std::collections::HashMap;

/// Unordered pair of neighborhood names.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct PairKey(String);

impl PairKey {
    fn new(a: &str, b: &str) -> Self {
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        // Unit separator keeps "ab"+"c" distinct from "a"+"bc".
        Self(format!("{lo}\u{1f}{hi}"))
    }
}

pub struct DistanceCache<P> {
    provider: P,
    entries: HashMap<PairKey, f64>,
    provider_calls: usize,
}

impl<P: DistanceProvider> DistanceCache<P> {
    pub fn new(provider: P) -> Self {
        Self {
            provider,
            entries: HashMap::new(),
            provider_calls: 0,
        }
    }

    /// Distance in meters between the centroids of `a` and `b`.
    ///
    /// Failed lookups are not cached.
    ///
    /// # Panics
    ///
    /// Panics if `a` and `b` share a name; self-pairs never reach the cache.
    pub fn distance_between(&mut self, a: &Neighborhood, b: &Neighborhood) -> Result<f64, GeoError> {
        assert_ne!(a.name, b.name, "self-pair requested from distance cache");

        let key = PairKey::new(&a.name, &b.name);
        if let Some(&meters) = self.entries.get(&key) {
            return Ok(meters);
        }

        self.provider_calls += 1;
        let meters = self.provider.distance_meters(a.centroid(), b.centroid())?;
        if !meters.is_finite() || meters < 0.0 {
            return Err(GeoError::InvalidDistance(meters));
        }

        self.entries.insert(key, meters);
        Ok(meters)
    }

    /// Number of times the provider was consulted.
    pub fn provider_calls(&self) -> usize {
        self.provider_calls
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
