//! StepGraph - WASM Module
//!
//! This module provides the core data structures and algorithms for the
//! StepGraph search visualizer. It is compiled to WebAssembly and exposes a
//! JavaScript-friendly API via wasm-bindgen.
//!
//! # Architecture
//!
//! - `graph`: Graph data structure (petgraph StableGraph topology, SoA
//!   positions, per-node search state and visual modes)
//! - `traversal`: Depth-first / level-order iterators and the step-wise
//!   shortest-path state machine
//! - `spatial`: R-tree spatial indexing for start/end picking
//! - `builders`: Preset demo topologies
//!
//! The host owns the render loop and the input loop; every unit of search
//! progress happens inside an explicit `stepSearch` call, and the renderer
//! observes the engine only through drained mode-change events plus the
//! position buffers.

use js_sys::Float32Array;
use wasm_bindgen::prelude::*;

pub mod builders;
pub mod error;
pub mod graph;
pub mod spatial;
pub mod traversal;

use graph::{GraphEngine, NodeId, NodeMode};
use traversal::{DepthFirstTraversal, DoneBehavior, LevelTraversal, ShortestPathStepper};

/// Initialize the WASM module.
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
}

/// Main entry point for the search visualizer engine.
///
/// This struct wraps the internal GraphEngine and shortest-path stepper and
/// provides the public API exposed to JavaScript.
#[wasm_bindgen]
pub struct StepGraphWasm {
    engine: GraphEngine,
    stepper: ShortestPathStepper,
}

#[wasm_bindgen]
impl StepGraphWasm {
    /// Create a new empty engine. The search defaults to start node 0 and
    /// end node 0 until `resetSearch` selects real endpoints.
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        Self {
            engine: GraphEngine::new(),
            stepper: ShortestPathStepper::new(0, 0),
        }
    }

    /// Create an engine with pre-allocated capacity.
    ///
    /// # Arguments
    ///
    /// * `node_capacity` - Expected number of nodes
    /// * `edge_capacity` - Expected number of edges
    #[wasm_bindgen(js_name = withCapacity)]
    pub fn with_capacity(node_capacity: usize, edge_capacity: usize) -> Self {
        Self {
            engine: GraphEngine::with_capacity(node_capacity, edge_capacity),
            stepper: ShortestPathStepper::new(0, 0),
        }
    }

    // =========================================================================
    // Graph Construction
    // =========================================================================

    /// Add a node at the specified position.
    ///
    /// Returns the stable node ID, which is also the node's insertion index.
    #[wasm_bindgen(js_name = addNode)]
    pub fn add_node(&mut self, x: f32, y: f32, z: f32) -> u32 {
        self.engine.add_node(x, y, z).raw()
    }

    /// Add multiple nodes from a Float32Array of positions.
    ///
    /// The positions array should be [x0, y0, z0, x1, ...].
    /// Returns the number of nodes added.
    #[wasm_bindgen(js_name = addNodesFromPositions)]
    pub fn add_nodes_from_positions(&mut self, positions: &[f32]) -> u32 {
        self.engine.add_nodes_from_positions(positions)
    }

    /// Add an undirected edge between two nodes.
    ///
    /// Returns the edge ID; throws if either endpoint is not in the graph.
    #[wasm_bindgen(js_name = addEdge)]
    pub fn add_edge(&mut self, a: u32, b: u32) -> Result<u32, JsError> {
        Ok(self.engine.add_edge(NodeId(a), NodeId(b))?.raw())
    }

    /// Add edges from a Uint32Array of pairs [a0, b0, a1, b1, ...].
    ///
    /// Pairs with unknown endpoints are skipped.
    /// Returns the number of edges added.
    #[wasm_bindgen(js_name = addEdgesFromPairs)]
    pub fn add_edges_from_pairs(&mut self, edges: &[u32]) -> u32 {
        self.engine.add_edges_from_pairs(edges)
    }

    /// Whether an edge between the two nodes is already registered.
    ///
    /// Callers wanting simple-graph semantics check this before `addEdge`.
    #[wasm_bindgen(js_name = hasEdge)]
    pub fn has_edge(&self, a: u32, b: u32) -> bool {
        self.engine.has_edge(NodeId(a), NodeId(b))
    }

    /// Replace the current graph with a named preset topology.
    ///
    /// Known names: `"quad"`, `"tree"`, `"ring"`.
    #[wasm_bindgen(js_name = loadPreset)]
    pub fn load_preset(&mut self, name: &str) -> Result<(), JsError> {
        self.engine = match name {
            "quad" => builders::simple_quad()?,
            "tree" => builders::simple_tree()?,
            "ring" => builders::ring(16, 40.0)?,
            other => return Err(JsError::new(&format!("unknown preset: {other}"))),
        };
        let last = self.engine.node_count().saturating_sub(1) as usize;
        self.stepper = ShortestPathStepper::new(0, last);
        Ok(())
    }

    /// Get the number of nodes in the graph.
    #[wasm_bindgen(js_name = nodeCount)]
    pub fn node_count(&self) -> u32 {
        self.engine.node_count()
    }

    /// Get the number of edges in the graph.
    #[wasm_bindgen(js_name = edgeCount)]
    pub fn edge_count(&self) -> u32 {
        self.engine.edge_count()
    }

    /// Get neighbors of a node, in connection order.
    ///
    /// Returns a Uint32Array of neighbor node IDs.
    #[wasm_bindgen(js_name = getNeighbors)]
    pub fn get_neighbors(&self, node_id: u32) -> Vec<u32> {
        self.engine
            .neighbors(NodeId(node_id))
            .iter()
            .map(|id| id.raw())
            .collect()
    }

    /// Set a node's position.
    #[wasm_bindgen(js_name = setNodePosition)]
    pub fn set_node_position(&mut self, node_id: u32, x: f32, y: f32, z: f32) {
        self.engine.set_node_position(NodeId(node_id), x, y, z);
    }

    // =========================================================================
    // Search Control
    // =========================================================================

    /// Start (or restart) a shortest-path search between two nodes selected
    /// by insertion index. Discards any in-progress search.
    #[wasm_bindgen(js_name = resetSearch)]
    pub fn reset_search(&mut self, start_index: usize, end_index: usize) -> Result<(), JsError> {
        self.stepper.reset(&mut self.engine, start_index, end_index)?;
        Ok(())
    }

    /// Advance the search by one unit of work.
    ///
    /// Returns the state after the step: 0 Waiting, 1 Searching,
    /// 2 Returning, 3 Done.
    #[wasm_bindgen(js_name = stepSearch)]
    pub fn step_search(&mut self) -> Result<u8, JsError> {
        Ok(self.stepper.step(&mut self.engine)? as u8)
    }

    /// Current search state without advancing.
    #[wasm_bindgen(js_name = searchState)]
    pub fn search_state(&self) -> u8 {
        self.stepper.state() as u8
    }

    /// Choose whether stepping in the Done state holds (false) or restarts
    /// the search (true).
    #[wasm_bindgen(js_name = setDoneBehavior)]
    pub fn set_done_behavior(&mut self, restart: bool) {
        self.stepper.set_done_behavior(if restart {
            DoneBehavior::Restart
        } else {
            DoneBehavior::Hold
        });
    }

    /// Drain pending mode-change notifications.
    ///
    /// Returns an array of `{ node, mode }` objects; each event carries the
    /// node id and its new visual mode.
    #[wasm_bindgen(js_name = takeEvents)]
    pub fn take_events(&mut self) -> Result<JsValue, JsError> {
        let events = self.engine.take_events();
        Ok(serde_wasm_bindgen::to_value(&events)?)
    }

    /// The current path from start to end via predecessor links.
    ///
    /// Returns a Uint32Array of node IDs; meaningful once the search has
    /// entered Returning/Done, degenerate if the end is unreachable.
    #[wasm_bindgen(js_name = currentPath)]
    pub fn current_path(&self) -> Vec<u32> {
        self.stepper
            .path(&self.engine)
            .iter()
            .map(|id| id.raw())
            .collect()
    }

    // =========================================================================
    // Node Observation
    // =========================================================================

    /// A node's visual mode: 0 Unvisited, 1 Visiting, 2 Visited, 3 Path,
    /// 4 Start, 5 End.
    #[wasm_bindgen(js_name = getNodeMode)]
    pub fn get_node_mode(&self, node_id: u32) -> u8 {
        self.engine
            .mode(NodeId(node_id))
            .unwrap_or(NodeMode::Unvisited) as u8
    }

    /// A node's animation-rate hint, in pulses per second.
    #[wasm_bindgen(js_name = getPulseRate)]
    pub fn get_pulse_rate(&self, node_id: u32) -> f32 {
        self.engine.pulse_rate(NodeId(node_id))
    }

    /// A node's tentative distance from the start (Infinity until relaxed).
    #[wasm_bindgen(js_name = getDistance)]
    pub fn get_distance(&self, node_id: u32) -> f32 {
        self.engine.distance(NodeId(node_id))
    }

    /// A node's current predecessor, if a search has initialized one.
    #[wasm_bindgen(js_name = getPredecessor)]
    pub fn get_predecessor(&self, node_id: u32) -> Option<u32> {
        self.engine.predecessor(NodeId(node_id)).map(|id| id.raw())
    }

    // =========================================================================
    // Traversal Orders
    // =========================================================================

    /// Preorder depth-first order of the nodes reachable from `start_index`.
    ///
    /// Returns a Uint32Array of node IDs; nodes in other components are
    /// excluded.
    #[wasm_bindgen(js_name = depthFirstOrder)]
    pub fn depth_first_order(&self, start_index: usize) -> Result<Vec<u32>, JsError> {
        let start = self
            .engine
            .node_at(start_index)
            .ok_or_else(|| JsError::new(&format!("no node at index {start_index}")))?;
        let order = DepthFirstTraversal::new(&self.engine, start)?;
        Ok(order.map(|id| id.raw()).collect())
    }

    /// Level (breadth-first) order of the nodes reachable from
    /// `start_index`.
    #[wasm_bindgen(js_name = levelOrder)]
    pub fn level_order(&self, start_index: usize) -> Result<Vec<u32>, JsError> {
        let start = self
            .engine
            .node_at(start_index)
            .ok_or_else(|| JsError::new(&format!("no node at index {start_index}")))?;
        let order = LevelTraversal::new(&self.engine, start)?;
        Ok(order.map(|id| id.raw()).collect())
    }

    // =========================================================================
    // Position Buffer Access (Zero-Copy)
    // =========================================================================

    /// Get a zero-copy view of X positions.
    ///
    /// # Safety
    ///
    /// The returned view is invalidated if any Rust allocation occurs.
    /// Use immediately for GPU upload, do not store.
    #[wasm_bindgen(js_name = getPositionsXView)]
    pub fn get_positions_x_view(&self) -> Float32Array {
        unsafe { Float32Array::view(self.engine.positions_x()) }
    }

    /// Get a zero-copy view of Y positions.
    ///
    /// # Safety
    ///
    /// The returned view is invalidated if any Rust allocation occurs.
    /// Use immediately for GPU upload, do not store.
    #[wasm_bindgen(js_name = getPositionsYView)]
    pub fn get_positions_y_view(&self) -> Float32Array {
        unsafe { Float32Array::view(self.engine.positions_y()) }
    }

    /// Get a zero-copy view of Z positions.
    ///
    /// # Safety
    ///
    /// The returned view is invalidated if any Rust allocation occurs.
    /// Use immediately for GPU upload, do not store.
    #[wasm_bindgen(js_name = getPositionsZView)]
    pub fn get_positions_z_view(&self) -> Float32Array {
        unsafe { Float32Array::view(self.engine.positions_z()) }
    }

    /// Get the length of the position buffers.
    #[wasm_bindgen(js_name = positionsLen)]
    pub fn positions_len(&self) -> usize {
        self.engine.positions_x().len()
    }

    // =========================================================================
    // Spatial Queries
    // =========================================================================

    /// Find the nearest node to a point.
    ///
    /// Returns the node ID, or None if the graph is empty.
    #[wasm_bindgen(js_name = findNearestNode)]
    pub fn find_nearest_node(&mut self, x: f32, y: f32, z: f32) -> Option<u32> {
        self.engine.find_nearest_node(x, y, z).map(|id| id.raw())
    }

    /// Find the nearest node within a maximum distance.
    ///
    /// Returns the node ID, or None if no node is within the distance.
    #[wasm_bindgen(js_name = findNearestNodeWithin)]
    pub fn find_nearest_node_within(
        &mut self,
        x: f32,
        y: f32,
        z: f32,
        max_distance: f32,
    ) -> Option<u32> {
        self.engine
            .find_nearest_node_within(x, y, z, max_distance)
            .map(|id| id.raw())
    }

    /// Rebuild the spatial index after bulk position updates.
    #[wasm_bindgen(js_name = rebuildSpatialIndex)]
    pub fn rebuild_spatial_index(&mut self) {
        self.engine.rebuild_spatial_index();
    }

    // =========================================================================
    // Utilities
    // =========================================================================

    /// Get the bounding box of all nodes.
    ///
    /// Returns [min_x, min_y, min_z, max_x, max_y, max_z], or None if the
    /// graph is empty.
    #[wasm_bindgen(js_name = getBounds)]
    pub fn get_bounds(&self) -> Option<Vec<f32>> {
        self.engine.bounds().map(|(min, max)| {
            vec![min[0], min[1], min[2], max[0], max[1], max[2]]
        })
    }

    /// Clear all nodes and edges and forget the current search.
    pub fn clear(&mut self) {
        self.engine.clear();
        self.stepper = ShortestPathStepper::new(0, 0);
    }
}

impl Default for StepGraphWasm {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod integration_tests {
    use super::*;
    use crate::graph::ModeChange;
    use crate::traversal::TraversalState;

    /// Full pipeline: preset -> step to Done -> drained events, exactly what
    /// the host render loop does each frame, but without wasm_bindgen JS
    /// types.
    #[test]
    fn test_preset_search_event_pipeline() {
        let mut engine = builders::simple_quad().unwrap();
        let mut stepper = ShortestPathStepper::new(0, 2);

        let mut all_events: Vec<ModeChange> = Vec::new();
        let mut steps = 0;
        loop {
            let state = stepper.step(&mut engine).unwrap();
            all_events.extend(engine.take_events());
            steps += 1;
            assert!(steps < 100, "search did not terminate");
            if state == TraversalState::Done {
                break;
            }
        }

        // The reset announced every node's mode at least once
        let touched: std::collections::HashSet<u32> =
            all_events.iter().map(|e| e.node).collect();
        assert_eq!(touched.len(), 4);

        // Start/End markers arrived, and the last event for each endpoint
        // agrees with the final mode
        assert_eq!(engine.mode(NodeId(0)), Some(NodeMode::Start));
        assert_eq!(engine.mode(NodeId(2)), Some(NodeMode::End));
        assert!(all_events.iter().any(|e| e.mode == NodeMode::Start));
        assert!(all_events.iter().any(|e| e.mode == NodeMode::End));

        // Events replayed in order reproduce the engine's final modes for
        // unpinned nodes
        let mut replay = [NodeMode::Unvisited; 4];
        for event in &all_events {
            replay[event.node as usize] = event.mode;
        }
        for i in 0..4u32 {
            assert_eq!(engine.mode(NodeId(i)), Some(replay[i as usize]));
        }
    }

    /// The quad is fully connected, so any endpoint pair is one hop apart.
    #[test]
    fn test_quad_any_pair_is_direct() {
        for end in 1..4usize {
            let mut engine = builders::simple_quad().unwrap();
            let mut stepper = ShortestPathStepper::new(0, end);
            while stepper.step(&mut engine).unwrap() != TraversalState::Done {}

            let path = stepper.path(&engine);
            assert_eq!(path.len(), 2, "end {end} should be one hop from start");
            let expected = engine.distance_between(NodeId(0), NodeId(end as u32));
            assert!((engine.distance(NodeId(end as u32)) - expected).abs() < 1e-3);
        }
    }

    /// Traversal orders exposed to the host agree with the iterators.
    #[test]
    fn test_traversal_orders_on_tree() {
        let engine = builders::simple_tree().unwrap();

        let dfs: Vec<_> = DepthFirstTraversal::new(&engine, NodeId(0))
            .unwrap()
            .collect();
        let bfs: Vec<_> = LevelTraversal::new(&engine, NodeId(0)).unwrap().collect();

        assert_eq!(dfs.len(), 10);
        assert_eq!(bfs.len(), 10);
        assert_eq!(dfs[0], NodeId(0));
        assert_eq!(bfs[0], NodeId(0));
        // Root's children come straight after it in level order
        assert_eq!(&bfs[1..4], &[NodeId(1), NodeId(2), NodeId(3)]);
        // Depth-first dives through the first child's subtree before the
        // second child appears
        let pos_n2 = dfs.iter().position(|&n| n == NodeId(1)).unwrap();
        let pos_n5 = dfs.iter().position(|&n| n == NodeId(4)).unwrap();
        let pos_n3 = dfs.iter().position(|&n| n == NodeId(2)).unwrap();
        assert!(pos_n2 < pos_n5 && pos_n5 < pos_n3);
    }

    /// Re-running a search on the same engine works without rebuilding.
    #[test]
    fn test_search_reset_reuses_engine() {
        let mut engine = builders::simple_tree().unwrap();
        let mut stepper = ShortestPathStepper::new(0, 9);
        while stepper.step(&mut engine).unwrap() != TraversalState::Done {}
        let first = engine.distance(NodeId(9));
        assert!(first.is_finite());

        stepper.reset(&mut engine, 3, 9).unwrap();
        while stepper.step(&mut engine).unwrap() != TraversalState::Done {}
        let second = engine.distance(NodeId(9));
        assert!(second.is_finite());
        assert!(second > first, "farther start should mean a longer path");
    }
}
