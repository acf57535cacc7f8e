//! Best-neighborhood selection.
//!
//! Reduces a multiset of resolved neighborhoods to one answer: the most
//! frequent name, with frequency ties broken by the discrete 1-median of the
//! tied neighborhoods' centroids.

pub mod cache;
pub mod frequency;
pub mod graph;
pub mod median;
pub mod resolver;
pub mod types;

pub use cache::DistanceCache;
pub use frequency::most_frequent_names;
pub use graph::{build_graph, Edge, Graph};
pub use median::{select_median, Median};
pub use resolver::BestNeighborhoodResolver;
pub use types::{Neighborhood, Resolution, SelectionError};
