//! Preset graph topologies.
//!
//! Small hand-laid graphs for demos and tests, plus a parametric ring. All
//! builders keep simple-graph semantics: no self-loops, and an edge between
//! an unordered pair is added at most once (checked via `has_edge`, since
//! the engine itself does not reject parallel edges).

use crate::error::GraphError;
use crate::graph::GraphEngine;

/// Depth at which the presets sit in front of the default camera.
const PRESET_Z: f32 = -100.0;

/// Four nodes in a square with both diagonals.
///
/// Every node pair is connected, so any start/end choice has a direct
/// shortest path.
pub fn simple_quad() -> Result<GraphEngine, GraphError> {
    let mut engine = GraphEngine::with_capacity(4, 6);
    let n1 = engine.add_node(-10.0, 10.0, PRESET_Z);
    let n2 = engine.add_node(10.0, 10.0, PRESET_Z);
    let n3 = engine.add_node(10.0, -10.0, PRESET_Z);
    let n4 = engine.add_node(-10.0, -10.0, PRESET_Z);

    for (a, b) in [(n1, n2), (n2, n3), (n3, n4), (n4, n1), (n3, n1), (n4, n2)] {
        if !engine.has_edge(a, b) {
            engine.add_edge(a, b)?;
        }
    }
    Ok(engine)
}

/// A ten-node, three-level tree.
pub fn simple_tree() -> Result<GraphEngine, GraphError> {
    let mut engine = GraphEngine::with_capacity(10, 9);
    let n1 = engine.add_node(0.0, 10.0, PRESET_Z);
    let n2 = engine.add_node(-20.0, 0.0, PRESET_Z);
    let n3 = engine.add_node(0.0, 0.0, PRESET_Z);
    let n4 = engine.add_node(20.0, 0.0, PRESET_Z);
    let n5 = engine.add_node(-25.0, -10.0, PRESET_Z);
    let n6 = engine.add_node(-20.0, -10.0, PRESET_Z);
    let n7 = engine.add_node(-5.0, -10.0, PRESET_Z);
    let n8 = engine.add_node(0.0, -10.0, PRESET_Z);
    let n9 = engine.add_node(5.0, -10.0, PRESET_Z);
    let n10 = engine.add_node(-30.0, -20.0, PRESET_Z);

    for (a, b) in [
        (n1, n2),
        (n1, n3),
        (n1, n4),
        (n2, n5),
        (n2, n6),
        (n3, n7),
        (n3, n8),
        (n3, n9),
        (n5, n10),
    ] {
        if !engine.has_edge(a, b) {
            engine.add_edge(a, b)?;
        }
    }
    Ok(engine)
}

/// `n` nodes evenly spaced on a circle, joined into a single cycle.
///
/// Chain topology with a closing edge; positions are reproducible so demos
/// and tests see the same graph every run.
pub fn ring(n: usize, radius: f32) -> Result<GraphEngine, GraphError> {
    let mut engine = GraphEngine::with_capacity(n, n);
    for i in 0..n {
        let angle = (i as f32) * std::f32::consts::TAU / (n as f32);
        engine.add_node(radius * angle.cos(), radius * angle.sin(), PRESET_Z);
    }

    if n < 2 {
        return Ok(engine);
    }
    for i in 1..n {
        let a = engine.node_at(i - 1).ok_or(GraphError::EmptyGraph)?;
        let b = engine.node_at(i).ok_or(GraphError::EmptyGraph)?;
        engine.add_edge(a, b)?;
    }
    // Close the loop, unless n == 2 already connected the pair
    let first = engine.node_at(0).ok_or(GraphError::EmptyGraph)?;
    let last = engine.node_at(n - 1).ok_or(GraphError::EmptyGraph)?;
    if !engine.has_edge(last, first) {
        engine.add_edge(last, first)?;
    }
    Ok(engine)
}
