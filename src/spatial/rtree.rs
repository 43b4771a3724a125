//! R-tree based spatial index using the rstar crate.
//!
//! Provides O(log n) spatial queries over node positions:
//! - Nearest neighbor (used to pick start/end nodes from a world-space point)
//! - Point-in-radius
//! - Box intersection

use rstar::{AABB, PointDistance, RTree, RTreeObject};

use crate::graph::NodeId;

/// A point in the spatial index with associated node ID.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NodePoint {
    /// The node identifier.
    pub id: NodeId,
    /// Position in world space.
    pub position: [f32; 3],
}

impl NodePoint {
    /// Create a new NodePoint.
    pub fn new(id: NodeId, x: f32, y: f32, z: f32) -> Self {
        Self {
            id,
            position: [x, y, z],
        }
    }
}

impl RTreeObject for NodePoint {
    type Envelope = AABB<[f32; 3]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_point(self.position)
    }
}

impl PointDistance for NodePoint {
    fn distance_2(&self, point: &[f32; 3]) -> f32 {
        let dx = self.position[0] - point[0];
        let dy = self.position[1] - point[1];
        let dz = self.position[2] - point[2];
        dx * dx + dy * dy + dz * dz
    }

    fn contains_point(&self, point: &[f32; 3]) -> bool {
        self.position
            .iter()
            .zip(point)
            .all(|(a, b)| (a - b).abs() < f32::EPSILON)
    }
}

/// Spatial index for graph nodes.
///
/// Uses an R*-tree for efficient spatial queries.
pub struct SpatialIndex {
    tree: RTree<NodePoint>,
}

impl SpatialIndex {
    /// Create a new empty spatial index.
    pub fn new() -> Self {
        Self { tree: RTree::new() }
    }

    /// Insert a node into the index.
    pub fn insert(&mut self, id: NodeId, x: f32, y: f32, z: f32) {
        self.tree.insert(NodePoint::new(id, x, y, z));
    }

    /// Find the nearest node to a point.
    pub fn nearest(&self, x: f32, y: f32, z: f32) -> Option<NodeId> {
        self.tree.nearest_neighbor(&[x, y, z]).map(|point| point.id)
    }

    /// Find the nearest node within a maximum distance.
    pub fn nearest_within(&self, x: f32, y: f32, z: f32, max_distance: f32) -> Option<NodeId> {
        let max_distance_sq = max_distance * max_distance;
        self.tree
            .nearest_neighbor(&[x, y, z])
            .filter(|point| point.distance_2(&[x, y, z]) <= max_distance_sq)
            .map(|point| point.id)
    }

    /// Find all nodes within an axis-aligned box.
    pub fn in_box(&self, min: [f32; 3], max: [f32; 3]) -> Vec<NodeId> {
        let envelope = AABB::from_corners(min, max);
        self.tree
            .locate_in_envelope(&envelope)
            .map(|point| point.id)
            .collect()
    }

    /// Find all nodes within a radius of a point.
    pub fn in_radius(&self, x: f32, y: f32, z: f32, radius: f32) -> Vec<NodeId> {
        let radius_sq = radius * radius;
        self.tree
            .locate_within_distance([x, y, z], radius_sq)
            .map(|point| point.id)
            .collect()
    }

    /// Rebuild the index from a list of (id, x, y, z) tuples.
    ///
    /// This is more efficient than incremental inserts for bulk updates.
    pub fn rebuild(&mut self, points: &[(NodeId, f32, f32, f32)]) {
        let node_points: Vec<_> = points
            .iter()
            .map(|&(id, x, y, z)| NodePoint::new(id, x, y, z))
            .collect();

        self.tree = RTree::bulk_load(node_points);
    }

    /// Clear all nodes from the index.
    pub fn clear(&mut self) {
        self.tree = RTree::new();
    }

    /// Get the number of nodes in the index.
    pub fn len(&self) -> usize {
        self.tree.size()
    }

    /// Check if the index is empty.
    pub fn is_empty(&self) -> bool {
        self.tree.size() == 0
    }
}

impl Default for SpatialIndex {
    fn default() -> Self {
        Self::new()
    }
}
