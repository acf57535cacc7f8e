//! Discrete 1-median over a complete distance graph.

use super::graph::Graph;

/// The most central node and its summed distance to all others.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Median {
    pub index: usize,
    pub total_distance_meters: f64,
}

/// Node with the smallest sum of incident edge weights.
///
/// Equal sums resolve to the earliest node in graph order. O(V·E).
///
/// # Panics
///
/// Panics on an empty graph.
pub fn select_median(graph: &Graph) -> Median {
    assert!(!graph.is_empty(), "median of an empty graph");

    let sums: Vec<f64> = (0..graph.len())
        .map(|i| graph.edges(i).iter().map(|e| e.distance_meters).sum())
        .collect();

    let mut best = Median {
        index: 0,
        total_distance_meters: sums[0],
    };
    for (index, &total) in sums.iter().enumerate().skip(1) {
        if total < best.total_distance_meters {
            best = Median {
                index,
                total_distance_meters: total,
            };
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::selection::cache::tests::{node, TableDistance};
    use crate::selection::cache::DistanceCache;
    use crate::selection::graph::build_graph;

    fn graph_of(names: &[&str], table: &[((u32, u32), f64)]) -> Graph {
        let provider = TableDistance::new(table);
        let mut cache = DistanceCache::new(&provider);
        let nodes: Vec<_> = names.iter().enumerate().map(|(i, n)| node(n, i as u32 + 1)).collect();
        build_graph(&nodes, &mut cache).unwrap()
    }

    #[test]
    fn test_single_node() {
        let graph = graph_of(&["Only"], &[]);
        let m = select_median(&graph);
        assert_eq!(m.index, 0);
        assert_eq!(m.total_distance_meters, 0.0);
    }

    #[test]
    fn test_three_way() {
        let graph = graph_of(&["A", "B", "C"], &[((1, 2), 100.0), ((1, 3), 100.0), ((2, 3), 300.0)]);
        let m = select_median(&graph);
        assert_eq!(graph.node(m.index).name, "A");
        assert_eq!(m.total_distance_meters, 200.0);
    }

    #[test]
    fn test_tie_prefers_first_node() {
        let graph = graph_of(&["B", "A"], &[((1, 2), 500.0)]);
        let m = select_median(&graph);
        assert_eq!(graph.node(m.index).name, "B");
        assert_eq!(m.total_distance_meters, 500.0);
    }

    #[test]
    fn test_later_node_can_win() {
        let graph = graph_of(
            &["Edge", "Middle", "Far"],
            &[((1, 2), 10.0), ((1, 3), 50.0), ((2, 3), 10.0)],
        );
        let m = select_median(&graph);
        assert_eq!(graph.node(m.index).name, "Middle");
        assert_eq!(m.total_distance_meters, 20.0);
    }

    #[test]
    #[should_panic(expected = "empty graph")]
    fn test_empty_graph_panics() {
        select_median(&Graph::default());
    }
}
