//! GraphEngine - Core graph data structure.
//!
//! The GraphEngine stores the graph topology using petgraph's StableGraph
//! and maintains SoA (Structure of Arrays) buffers for positions, search
//! state, and visual modes, so the host can upload positions directly and
//! the steppers can index per-node state in O(1).
//!
//! Edges are undirected and weightless; an edge's cost is computed on demand
//! from its endpoints' positions. Adjacency is kept in explicit per-node
//! lists so traversal order is the insertion order of connections, which
//! petgraph's neighbor iteration does not guarantee.

use petgraph::Undirected;
use petgraph::stable_graph::{EdgeIndex, NodeIndex, StableGraph};
use std::collections::HashMap;
use tracing::debug;

use super::edge::EdgeId;
use super::node::{ModeChange, NodeId, NodeMode, SearchState};
use crate::error::GraphError;
use crate::spatial::SpatialIndex;

/// The core graph engine.
///
/// This struct manages:
/// - Graph topology via petgraph
/// - Position buffers in SoA layout
/// - Insertion-ordered adjacency lists (the traversal order contract)
/// - Per-node search state and visual mode
/// - Mode-change event queue for the renderer boundary
/// - Spatial index for nearest-node picking
///
/// Nodes and edges are created by a builder and never removed; once a
/// traversal is running, only the active stepper mutates search state.
pub struct GraphEngine {
    /// The underlying graph structure.
    /// Nodes store their stable NodeId, edges store their stable EdgeId.
    graph: StableGraph<NodeId, EdgeId, Undirected>,

    /// Map from stable NodeId to petgraph NodeIndex
    node_id_to_index: HashMap<NodeId, NodeIndex>,

    /// Map from stable EdgeId to petgraph EdgeIndex
    edge_id_to_index: HashMap<EdgeId, EdgeIndex>,

    /// Next node ID to assign
    next_node_id: u32,

    /// Next edge ID to assign
    next_edge_id: u32,

    /// X positions (SoA layout)
    pos_x: Vec<f32>,

    /// Y positions (SoA layout)
    pos_y: Vec<f32>,

    /// Z positions (SoA layout)
    pos_z: Vec<f32>,

    /// Per-node neighbor lists, insertion order preserved.
    adjacency: Vec<Vec<NodeId>>,

    /// Per-node edge lists, parallel to `adjacency`.
    adjacency_edges: Vec<Vec<EdgeId>>,

    /// Per-node search state (distance, predecessor, visited).
    search: Vec<SearchState>,

    /// Per-node visual mode.
    modes: Vec<NodeMode>,

    /// Per-node animation-rate hint. Updated even when the mode is pinned.
    pulse: Vec<f32>,

    /// Pending mode-change notifications, drained by the host.
    events: Vec<ModeChange>,

    /// Spatial index for nearest-node picking
    spatial: SpatialIndex,

    /// Whether the spatial index needs rebuilding
    spatial_dirty: bool,
}

impl GraphEngine {
    /// Create a new empty graph engine.
    pub fn new() -> Self {
        Self {
            graph: StableGraph::default(),
            node_id_to_index: HashMap::new(),
            edge_id_to_index: HashMap::new(),
            next_node_id: 0,
            next_edge_id: 0,
            pos_x: Vec::new(),
            pos_y: Vec::new(),
            pos_z: Vec::new(),
            adjacency: Vec::new(),
            adjacency_edges: Vec::new(),
            search: Vec::new(),
            modes: Vec::new(),
            pulse: Vec::new(),
            events: Vec::new(),
            spatial: SpatialIndex::new(),
            spatial_dirty: false,
        }
    }

    /// Create a graph engine with pre-allocated capacity.
    pub fn with_capacity(node_capacity: usize, edge_capacity: usize) -> Self {
        Self {
            graph: StableGraph::with_capacity(node_capacity, edge_capacity),
            node_id_to_index: HashMap::with_capacity(node_capacity),
            edge_id_to_index: HashMap::with_capacity(edge_capacity),
            next_node_id: 0,
            next_edge_id: 0,
            pos_x: Vec::with_capacity(node_capacity),
            pos_y: Vec::with_capacity(node_capacity),
            pos_z: Vec::with_capacity(node_capacity),
            adjacency: Vec::with_capacity(node_capacity),
            adjacency_edges: Vec::with_capacity(node_capacity),
            search: Vec::with_capacity(node_capacity),
            modes: Vec::with_capacity(node_capacity),
            pulse: Vec::with_capacity(node_capacity),
            events: Vec::new(),
            spatial: SpatialIndex::new(),
            spatial_dirty: false,
        }
    }

    #[inline]
    fn slot(&self, id: NodeId) -> Option<usize> {
        self.node_id_to_index.get(&id).map(|index| index.index())
    }

    // =========================================================================
    // Node Operations
    // =========================================================================

    /// Add a node at the specified position.
    pub fn add_node(&mut self, x: f32, y: f32, z: f32) -> NodeId {
        let id = NodeId(self.next_node_id);
        self.next_node_id += 1;

        let index = self.graph.add_node(id);
        self.node_id_to_index.insert(id, index);

        self.pos_x.push(x);
        self.pos_y.push(y);
        self.pos_z.push(z);
        self.adjacency.push(Vec::new());
        self.adjacency_edges.push(Vec::new());
        self.search.push(SearchState::default());
        self.modes.push(NodeMode::Unvisited);
        self.pulse.push(NodeMode::Unvisited.pulse_rate());

        self.spatial_dirty = true;
        id
    }

    /// Add multiple nodes from a positions array [x0, y0, z0, x1, ...].
    pub fn add_nodes_from_positions(&mut self, positions: &[f32]) -> u32 {
        let count = positions.len() / 3;

        // Pre-allocate
        self.node_id_to_index.reserve(count);
        self.pos_x.reserve(count);
        self.pos_y.reserve(count);
        self.pos_z.reserve(count);
        self.adjacency.reserve(count);
        self.adjacency_edges.reserve(count);
        self.search.reserve(count);
        self.modes.reserve(count);
        self.pulse.reserve(count);

        for i in 0..count {
            let x = positions[i * 3];
            let y = positions[i * 3 + 1];
            let z = positions[i * 3 + 2];
            self.add_node(x, y, z);
        }

        count as u32
    }

    /// Get the number of nodes.
    pub fn node_count(&self) -> u32 {
        self.graph.node_count() as u32
    }

    /// Look up a node by its insertion position.
    ///
    /// Start and end nodes are selected this way by the host's input loop.
    pub fn node_at(&self, position: usize) -> Option<NodeId> {
        if position < self.pos_x.len() {
            Some(NodeId(position as u32))
        } else {
            None
        }
    }

    /// Get a node's position.
    pub fn position(&self, id: NodeId) -> Option<[f32; 3]> {
        self.slot(id)
            .map(|i| [self.pos_x[i], self.pos_y[i], self.pos_z[i]])
    }

    /// Set a node's position.
    pub fn set_node_position(&mut self, id: NodeId, x: f32, y: f32, z: f32) {
        if let Some(i) = self.slot(id) {
            self.pos_x[i] = x;
            self.pos_y[i] = y;
            self.pos_z[i] = z;
            self.spatial_dirty = true;
        }
    }

    /// Euclidean distance between two nodes' positions.
    ///
    /// This doubles as the edge weight for the shortest-path search: weights
    /// are never stored, only derived. Returns infinity if either node is
    /// unknown, so a bad reference can never look like a shortest path.
    pub fn distance_between(&self, a: NodeId, b: NodeId) -> f32 {
        match (self.slot(a), self.slot(b)) {
            (Some(i), Some(j)) => {
                let dx = self.pos_x[i] - self.pos_x[j];
                let dy = self.pos_y[i] - self.pos_y[j];
                let dz = self.pos_z[i] - self.pos_z[j];
                (dx * dx + dy * dy + dz * dz).sqrt()
            }
            _ => f32::INFINITY,
        }
    }

    // =========================================================================
    // Edge Operations
    // =========================================================================

    /// Add an undirected edge between two nodes.
    ///
    /// Registers the edge symmetrically into both endpoints' adjacency
    /// lists. A neighbor already present is not appended again; the
    /// adjacency list is the single de-duplication point, so the engine
    /// itself never rejects a parallel edge. Callers wanting simple-graph
    /// semantics check [`has_edge`](Self::has_edge) first.
    pub fn add_edge(&mut self, a: NodeId, b: NodeId) -> Result<EdgeId, GraphError> {
        let a_index = *self
            .node_id_to_index
            .get(&a)
            .ok_or(GraphError::InvalidReference { id: a.0 })?;
        let b_index = *self
            .node_id_to_index
            .get(&b)
            .ok_or(GraphError::InvalidReference { id: b.0 })?;

        let id = EdgeId(self.next_edge_id);
        self.next_edge_id += 1;

        let index = self.graph.add_edge(a_index, b_index, id);
        self.edge_id_to_index.insert(id, index);

        self.connect(a_index.index(), b, id);
        self.connect(b_index.index(), a, id);

        Ok(id)
    }

    /// Append `other` to a node's adjacency, unless already present.
    fn connect(&mut self, slot: usize, other: NodeId, via: EdgeId) {
        if !self.adjacency[slot].contains(&other) {
            self.adjacency[slot].push(other);
            self.adjacency_edges[slot].push(via);
        }
    }

    /// Add edges from pairs [a0, b0, a1, b1, ...].
    ///
    /// Returns the number of edges added; pairs with unknown endpoints are
    /// skipped.
    pub fn add_edges_from_pairs(&mut self, edges: &[u32]) -> u32 {
        let count = edges.len() / 2;
        let mut added = 0;

        for i in 0..count {
            let a = NodeId(edges[i * 2]);
            let b = NodeId(edges[i * 2 + 1]);
            if self.add_edge(a, b).is_ok() {
                added += 1;
            }
        }

        added
    }

    /// Get the number of edges.
    pub fn edge_count(&self) -> u32 {
        self.graph.edge_count() as u32
    }

    /// Whether `b` is already in `a`'s adjacency list.
    pub fn has_edge(&self, a: NodeId, b: NodeId) -> bool {
        self.slot(a)
            .map(|i| self.adjacency[i].contains(&b))
            .unwrap_or(false)
    }

    /// Neighbors of a node, in connection insertion order.
    pub fn neighbors(&self, id: NodeId) -> &[NodeId] {
        self.slot(id)
            .map(|i| self.adjacency[i].as_slice())
            .unwrap_or(&[])
    }

    /// Edges incident to a node, parallel to [`neighbors`](Self::neighbors).
    pub fn edges_of(&self, id: NodeId) -> &[EdgeId] {
        self.slot(id)
            .map(|i| self.adjacency_edges[i].as_slice())
            .unwrap_or(&[])
    }

    /// Endpoints of an edge (unordered pair).
    pub fn edge_endpoints(&self, id: EdgeId) -> Option<(NodeId, NodeId)> {
        let index = *self.edge_id_to_index.get(&id)?;
        let (a, b) = self.graph.edge_endpoints(index)?;
        Some((self.graph[a], self.graph[b]))
    }

    // =========================================================================
    // Modes and Events
    // =========================================================================

    /// Get a node's visual mode.
    pub fn mode(&self, id: NodeId) -> Option<NodeMode> {
        self.slot(id).map(|i| self.modes[i])
    }

    /// Get a node's animation-rate hint.
    pub fn pulse_rate(&self, id: NodeId) -> f32 {
        self.slot(id).map(|i| self.pulse[i]).unwrap_or(0.0)
    }

    /// Set a node's visual mode, honoring pinning.
    ///
    /// Start and End are pinned: a set_mode call on a pinned node refreshes
    /// the pulse hint from the requested mode but keeps the stored mode, and
    /// no event is emitted since nothing visible to the renderer changed.
    pub fn set_mode(&mut self, id: NodeId, mode: NodeMode) {
        let Some(i) = self.slot(id) else { return };
        if self.modes[i].is_pinned() {
            self.pulse[i] = mode.pulse_rate();
            return;
        }
        if self.modes[i] != mode {
            self.modes[i] = mode;
            self.pulse[i] = mode.pulse_rate();
            self.events.push(ModeChange { node: id.0, mode });
        }
    }

    /// Set a node's visual mode unconditionally, ignoring pinning.
    ///
    /// Used by search reset, which must be able to clear and re-assign
    /// Start/End markers.
    pub(crate) fn force_mode(&mut self, id: NodeId, mode: NodeMode) {
        let Some(i) = self.slot(id) else { return };
        self.pulse[i] = mode.pulse_rate();
        if self.modes[i] != mode {
            self.modes[i] = mode;
            self.events.push(ModeChange { node: id.0, mode });
        }
    }

    /// Drain the pending mode-change notifications.
    pub fn take_events(&mut self) -> Vec<ModeChange> {
        std::mem::take(&mut self.events)
    }

    // =========================================================================
    // Search State
    // =========================================================================

    /// A node's tentative distance. Infinity if unknown or not yet relaxed.
    pub fn distance(&self, id: NodeId) -> f32 {
        self.slot(id)
            .map(|i| self.search[i].distance)
            .unwrap_or(f32::INFINITY)
    }

    /// A node's current predecessor, if a search has initialized one.
    pub fn predecessor(&self, id: NodeId) -> Option<NodeId> {
        self.slot(id).and_then(|i| self.search[i].predecessor)
    }

    /// Whether a node has been popped from the frontier and relaxed.
    pub fn is_visited(&self, id: NodeId) -> bool {
        self.slot(id).map(|i| self.search[i].visited).unwrap_or(false)
    }

    /// Mutable search state, for the active stepper only.
    pub(crate) fn search_mut(&mut self, id: NodeId) -> Option<&mut SearchState> {
        self.slot(id).map(|i| &mut self.search[i])
    }

    /// Re-initialize every node for a fresh search from `start`.
    ///
    /// Distance goes to infinity, visited is cleared, the predecessor chain
    /// is seeded with the start node, and modes revert to Unvisited.
    pub(crate) fn reset_search(&mut self, start: NodeId) {
        debug!(start = start.0, "resetting search state");
        for i in 0..self.search.len() {
            self.search[i] = SearchState {
                distance: f32::INFINITY,
                predecessor: Some(start),
                visited: false,
            };
            self.force_mode(NodeId(i as u32), NodeMode::Unvisited);
        }
    }

    // =========================================================================
    // Buffer Access
    // =========================================================================

    /// Get X positions slice.
    pub fn positions_x(&self) -> &[f32] {
        &self.pos_x
    }

    /// Get Y positions slice.
    pub fn positions_y(&self) -> &[f32] {
        &self.pos_y
    }

    /// Get Z positions slice.
    pub fn positions_z(&self) -> &[f32] {
        &self.pos_z
    }

    // =========================================================================
    // Spatial Queries
    // =========================================================================

    /// Find the nearest node to a point, rebuilding the index if stale.
    pub fn find_nearest_node(&mut self, x: f32, y: f32, z: f32) -> Option<NodeId> {
        if self.spatial_dirty {
            self.rebuild_spatial_index();
        }
        self.spatial.nearest(x, y, z)
    }

    /// Find the nearest node within a maximum distance.
    pub fn find_nearest_node_within(
        &mut self,
        x: f32,
        y: f32,
        z: f32,
        max_distance: f32,
    ) -> Option<NodeId> {
        if self.spatial_dirty {
            self.rebuild_spatial_index();
        }
        self.spatial.nearest_within(x, y, z, max_distance)
    }

    /// Rebuild the spatial index from current positions.
    pub fn rebuild_spatial_index(&mut self) {
        let points: Vec<_> = (0..self.pos_x.len())
            .map(|i| (NodeId(i as u32), self.pos_x[i], self.pos_y[i], self.pos_z[i]))
            .collect();

        self.spatial.rebuild(&points);
        self.spatial_dirty = false;
    }

    // =========================================================================
    // Utilities
    // =========================================================================

    /// Get the bounding box of all nodes as (min, max) corners.
    pub fn bounds(&self) -> Option<([f32; 3], [f32; 3])> {
        if self.pos_x.is_empty() {
            return None;
        }

        let mut min = [f32::INFINITY; 3];
        let mut max = [f32::NEG_INFINITY; 3];

        for i in 0..self.pos_x.len() {
            let p = [self.pos_x[i], self.pos_y[i], self.pos_z[i]];
            for axis in 0..3 {
                if p[axis] < min[axis] {
                    min[axis] = p[axis];
                }
                if p[axis] > max[axis] {
                    max[axis] = p[axis];
                }
            }
        }

        Some((min, max))
    }

    /// Clear all nodes and edges, resetting the engine to its initial state.
    pub fn clear(&mut self) {
        self.graph.clear();
        self.node_id_to_index.clear();
        self.edge_id_to_index.clear();
        self.next_node_id = 0;
        self.next_edge_id = 0;
        self.pos_x.clear();
        self.pos_y.clear();
        self.pos_z.clear();
        self.adjacency.clear();
        self.adjacency_edges.clear();
        self.search.clear();
        self.modes.clear();
        self.pulse.clear();
        self.events.clear();
        self.spatial.clear();
        self.spatial_dirty = false;
    }
}

impl Default for GraphEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_node() {
        let mut engine = GraphEngine::new();
        let id = engine.add_node(10.0, 20.0, 30.0);

        assert_eq!(engine.node_count(), 1);
        assert_eq!(engine.position(id), Some([10.0, 20.0, 30.0]));
        assert_eq!(engine.mode(id), Some(NodeMode::Unvisited));
    }

    #[test]
    fn test_add_multiple_nodes() {
        let mut engine = GraphEngine::new();
        let positions = [0.0, 0.0, 0.0, 1.0, 1.0, 0.0, 2.0, 2.0, 0.0];

        let count = engine.add_nodes_from_positions(&positions);
        assert_eq!(count, 3);
        assert_eq!(engine.node_count(), 3);
        assert_eq!(engine.position(NodeId(2)), Some([2.0, 2.0, 0.0]));
    }

    #[test]
    fn test_add_edge_registers_both_sides() {
        let mut engine = GraphEngine::new();
        let a = engine.add_node(0.0, 0.0, 0.0);
        let b = engine.add_node(1.0, 1.0, 0.0);

        let edge = engine.add_edge(a, b).unwrap();
        assert_eq!(engine.edge_count(), 1);
        assert_eq!(engine.neighbors(a), &[b]);
        assert_eq!(engine.neighbors(b), &[a]);
        assert_eq!(engine.edges_of(a), &[edge]);
        assert_eq!(engine.edge_endpoints(edge), Some((a, b)));
    }

    #[test]
    fn test_add_edge_invalid_reference() {
        let mut engine = GraphEngine::new();
        let a = engine.add_node(0.0, 0.0, 0.0);

        let err = engine.add_edge(a, NodeId(99)).unwrap_err();
        assert_eq!(err, GraphError::InvalidReference { id: 99 });
        assert_eq!(engine.edge_count(), 0);
    }

    #[test]
    fn test_connect_deduplicates_neighbors() {
        let mut engine = GraphEngine::new();
        let a = engine.add_node(0.0, 0.0, 0.0);
        let b = engine.add_node(1.0, 0.0, 0.0);

        engine.add_edge(a, b).unwrap();
        engine.add_edge(a, b).unwrap();

        // The second edge exists in the topology but the adjacency list is
        // the single de-duplication point.
        assert_eq!(engine.edge_count(), 2);
        assert_eq!(engine.neighbors(a), &[b]);
        assert_eq!(engine.edges_of(a).len(), 1);
    }

    #[test]
    fn test_neighbors_insertion_order() {
        let mut engine = GraphEngine::new();
        let a = engine.add_node(0.0, 0.0, 0.0);
        let b = engine.add_node(1.0, 0.0, 0.0);
        let c = engine.add_node(0.0, 1.0, 0.0);
        let d = engine.add_node(1.0, 1.0, 0.0);

        engine.add_edge(a, c).unwrap();
        engine.add_edge(a, b).unwrap();
        engine.add_edge(a, d).unwrap();

        assert_eq!(engine.neighbors(a), &[c, b, d]);
    }

    #[test]
    fn test_distance_between() {
        let mut engine = GraphEngine::new();
        let a = engine.add_node(0.0, 0.0, 0.0);
        let b = engine.add_node(3.0, 4.0, 0.0);

        assert_eq!(engine.distance_between(a, b), 5.0);
        assert_eq!(engine.distance_between(a, a), 0.0);
        assert!(engine.distance_between(a, NodeId(9)).is_infinite());
    }

    #[test]
    fn test_set_mode_emits_event() {
        let mut engine = GraphEngine::new();
        let a = engine.add_node(0.0, 0.0, 0.0);

        engine.set_mode(a, NodeMode::Visiting);
        assert_eq!(engine.mode(a), Some(NodeMode::Visiting));

        let events = engine.take_events();
        assert_eq!(
            events,
            vec![ModeChange {
                node: 0,
                mode: NodeMode::Visiting
            }]
        );
        // Drained; no residue
        assert!(engine.take_events().is_empty());
    }

    #[test]
    fn test_set_mode_same_value_is_silent() {
        let mut engine = GraphEngine::new();
        let a = engine.add_node(0.0, 0.0, 0.0);

        engine.set_mode(a, NodeMode::Visited);
        engine.take_events();
        engine.set_mode(a, NodeMode::Visited);
        assert!(engine.take_events().is_empty());
    }

    #[test]
    fn test_pinned_mode_keeps_value_updates_pulse() {
        let mut engine = GraphEngine::new();
        let a = engine.add_node(0.0, 0.0, 0.0);

        engine.force_mode(a, NodeMode::Start);
        engine.take_events();

        engine.set_mode(a, NodeMode::Visiting);
        assert_eq!(engine.mode(a), Some(NodeMode::Start));
        assert_eq!(engine.pulse_rate(a), NodeMode::Visiting.pulse_rate());
        assert!(engine.take_events().is_empty());

        // force_mode overrides the pin
        engine.force_mode(a, NodeMode::Unvisited);
        assert_eq!(engine.mode(a), Some(NodeMode::Unvisited));
    }

    #[test]
    fn test_reset_search_seeds_predecessors() {
        let mut engine = GraphEngine::new();
        let a = engine.add_node(0.0, 0.0, 0.0);
        let b = engine.add_node(1.0, 0.0, 0.0);

        engine.search_mut(b).unwrap().distance = 4.2;
        engine.search_mut(b).unwrap().visited = true;
        engine.reset_search(a);

        assert!(engine.distance(b).is_infinite());
        assert_eq!(engine.predecessor(b), Some(a));
        assert!(!engine.is_visited(b));
        assert_eq!(engine.mode(b), Some(NodeMode::Unvisited));
    }

    #[test]
    fn test_node_at_insertion_order() {
        let mut engine = GraphEngine::new();
        let a = engine.add_node(0.0, 0.0, 0.0);
        let b = engine.add_node(1.0, 0.0, 0.0);

        assert_eq!(engine.node_at(0), Some(a));
        assert_eq!(engine.node_at(1), Some(b));
        assert_eq!(engine.node_at(2), None);
    }

    #[test]
    fn test_nearest_node() {
        let mut engine = GraphEngine::new();
        let a = engine.add_node(0.0, 0.0, 0.0);
        let b = engine.add_node(10.0, 10.0, 10.0);

        assert_eq!(engine.find_nearest_node(1.0, 1.0, 1.0), Some(a));
        assert_eq!(engine.find_nearest_node(9.0, 9.0, 9.0), Some(b));

        // Moving a node marks the index stale
        engine.set_node_position(a, 20.0, 20.0, 20.0);
        assert_eq!(engine.find_nearest_node(1.0, 1.0, 1.0), Some(b));
    }

    #[test]
    fn test_bounds() {
        let mut engine = GraphEngine::new();
        engine.add_node(-10.0, -5.0, 1.0);
        engine.add_node(10.0, 5.0, -1.0);

        let (min, max) = engine.bounds().unwrap();
        assert_eq!(min, [-10.0, -5.0, -1.0]);
        assert_eq!(max, [10.0, 5.0, 1.0]);
    }

    #[test]
    fn test_clear() {
        let mut engine = GraphEngine::new();
        let a = engine.add_node(0.0, 0.0, 0.0);
        let b = engine.add_node(1.0, 1.0, 0.0);
        engine.add_edge(a, b).unwrap();

        engine.clear();
        assert_eq!(engine.node_count(), 0);
        assert_eq!(engine.edge_count(), 0);
        assert!(engine.take_events().is_empty());

        // IDs restart from zero after clear
        let again = engine.add_node(2.0, 2.0, 2.0);
        assert_eq!(again, NodeId(0));
    }
}
