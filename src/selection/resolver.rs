//! Best-neighborhood resolver: frequency filter, then centrality tie-break.
//!
//! Flow:  candidates → tie set → distinct tied nodes → distance graph → 1-median

use super::cache::DistanceCache;
use super::frequency;
use super::graph::{self, build_graph};
use super::median::select_median;
use super::types::{Neighborhood, Resolution, SelectionError};
use crate::geo::DistanceProvider;
use tracing::debug;

/// Chooses one neighborhood to represent a batch of candidates.
///
/// Holds only the distance provider; every call gets its own cache, so one
/// resolver can serve concurrent requests when the provider allows it.
pub struct BestNeighborhoodResolver<P> {
    provider: P,
}

impl<P: DistanceProvider> BestNeighborhoodResolver<P> {
    pub fn new(provider: P) -> Self {
        Self { provider }
    }

    /// Pick the most frequent neighborhood, breaking frequency ties by the
    /// smallest total distance to the other tied neighborhoods.
    pub fn resolve(&self, candidates: &[Neighborhood]) -> Result<Resolution, SelectionError> {
        if candidates.is_empty() {
            return Err(SelectionError::NoCandidates);
        }

        let (tied, occurrences) = frequency::tally(candidates).ok_or(SelectionError::NoCandidates)?;
        if tied.is_empty() {
            return Err(SelectionError::NoCandidates);
        }
        debug!(tied = ?tied, occurrences, "frequency filter");

        let nodes = graph::dedup_by_name(candidates.iter().filter(|c| tied.contains(&c.name.as_str())));

        let mut cache = DistanceCache::new(&self.provider);
        let graph = build_graph(&nodes, &mut cache)?;
        debug!(
            nodes = graph.len(),
            edges = graph.edge_count(),
            provider_calls = cache.provider_calls(),
            "distance graph built"
        );

        let median = select_median(&graph);
        let neighborhood = graph.node(median.index).clone();
        debug!(
            selected = %neighborhood.name,
            total_distance_meters = median.total_distance_meters,
            "median selected"
        );

        Ok(Resolution {
            neighborhood,
            occurrences,
            tied: tied.into_iter().map(str::to_string).collect(),
            total_distance_meters: median.total_distance_meters,
        })
    }
}
