//! Complete weighted graph over distinct tied neighborhoods.
//!
//! Nodes live in a dense `Vec` and edges refer to them by index, so node
//! order is explicit and the median tie-break is reproducible.

use super::cache::DistanceCache;
use super::types::{Neighborhood, SelectionError};
use crate::geo::DistanceProvider;
use std::collections::HashSet;

/// Directed half of an undirected edge.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Edge {
    pub target: usize,
    pub distance_meters: f64,
}

#[derive(Debug, Clone, Default)]
pub struct Graph {
    nodes: Vec<Neighborhood>,
    edges: Vec<Vec<Edge>>,
}

impl Graph {
    pub fn node(&self, index: usize) -> &Neighborhood {
        &self.nodes[index]
    }

    /// Outgoing edges of the node at `index`.
    pub fn edges(&self, index: usize) -> &[Edge] {
        &self.edges[index]
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Total number of undirected edges.
    pub fn edge_count(&self) -> usize {
        self.edges.iter().map(Vec::len).sum::<usize>() / 2
    }
}

/// Keep the first neighborhood seen for each name, preserving order.
pub fn dedup_by_name<'a, I>(candidates: I) -> Vec<Neighborhood>
where
    I: IntoIterator<Item = &'a Neighborhood>,
{
    let mut seen = HashSet::new();
    candidates
        .into_iter()
        .filter(|&n| seen.insert(n.name.as_str()))
        .cloned()
        .collect()
}

/// Build the complete graph over `candidates`, deduplicated by name.
///
/// Fails as a whole if any pair's distance cannot be resolved.
pub fn build_graph<P: DistanceProvider>(
    candidates: &[Neighborhood],
    cache: &mut DistanceCache<P>,
) -> Result<Graph, SelectionError> {
    let nodes = dedup_by_name(candidates);
    let mut edges: Vec<Vec<Edge>> = vec![Vec::new(); nodes.len()];

    for i in 0..nodes.len() {
        for j in (i + 1)..nodes.len() {
            let distance_meters = cache.distance_between(&nodes[i], &nodes[j]).map_err(|source| {
                SelectionError::DistanceResolution {
                    from: nodes[i].name.clone(),
                    to: nodes[j].name.clone(),
                    source,
                }
            })?;
            edges[i].push(Edge { target: j, distance_meters });
            edges[j].push(Edge { target: i, distance_meters });
        }
    }

    Ok(Graph { nodes, edges })
}
