//! Neighborhood resolution for batches of attractions.
//!
//! Each attraction is geocoded, placed inside a neighborhood polygon, and the
//! resulting candidates are reduced to one answer: the most frequent
//! neighborhood, with ties broken by minimal total distance to the other tied
//! neighborhoods.

pub mod attractions;
pub mod config;
pub mod geo;
pub mod selection;
pub mod server;
