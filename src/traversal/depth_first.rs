//! Depth-first traversal as a lazy pull-based iterator.
//!
//! The traversal yields reachable nodes in preorder: the start node first,
//! then each not-yet-visited neighbor's own depth-first expansion, in
//! adjacency (insertion) order. Implemented as an explicit stack worklist
//! rather than recursive generator composition.

use std::collections::HashSet;

use crate::error::GraphError;
use crate::graph::{GraphEngine, NodeId};

/// Lazy preorder depth-first traversal over a graph.
///
/// Each reachable node is yielded exactly once; nodes in other connected
/// components are never yielded. Not restartable — construct a fresh
/// instance to traverse again.
pub struct DepthFirstTraversal<'g> {
    engine: &'g GraphEngine,
    /// Pending nodes; the top of the stack is expanded next. A node may sit
    /// on the stack more than once (diamond shapes), so membership in
    /// `visited` is re-checked at yield time.
    stack: Vec<NodeId>,
    visited: HashSet<NodeId>,
}

impl<'g> DepthFirstTraversal<'g> {
    /// Create a traversal rooted at `start`.
    ///
    /// Fails with `InvalidReference` if `start` is not a member of the
    /// graph.
    pub fn new(engine: &'g GraphEngine, start: NodeId) -> Result<Self, GraphError> {
        if engine.position(start).is_none() {
            return Err(GraphError::InvalidReference { id: start.0 });
        }
        Ok(Self {
            engine,
            stack: vec![start],
            visited: HashSet::new(),
        })
    }
}

impl Iterator for DepthFirstTraversal<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        while let Some(node) = self.stack.pop() {
            if !self.visited.insert(node) {
                continue;
            }
            // Reversed so the first-connected neighbor is expanded first,
            // preserving the preorder of the adjacency lists.
            for &neighbor in self.engine.neighbors(node).iter().rev() {
                if !self.visited.contains(&neighbor) {
                    self.stack.push(neighbor);
                }
            }
            return Some(node);
        }
        None
    }
}
