//! Spatial indexing for O(log n) node picking.
//!
//! This module provides an R-tree based spatial index for efficient
//! nearest-neighbor and range queries on graph nodes, used by the host to
//! select start/end nodes from a world-space position.

mod rtree;

pub use rtree::SpatialIndex;
