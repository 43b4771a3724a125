//! Breadth-first (level-order) traversal.
//!
//! The queue-based sibling of [`DepthFirstTraversal`]: yields the start
//! node, then its neighbors, then theirs, in adjacency order within each
//! level. Nodes are marked discovered when enqueued, so each reachable node
//! is yielded exactly once.
//!
//! [`DepthFirstTraversal`]: crate::traversal::DepthFirstTraversal

use std::collections::{HashSet, VecDeque};

use crate::error::GraphError;
use crate::graph::{GraphEngine, NodeId};

/// Lazy level-order traversal over a graph.
pub struct LevelTraversal<'g> {
    engine: &'g GraphEngine,
    worklist: VecDeque<NodeId>,
    discovered: HashSet<NodeId>,
}

impl<'g> LevelTraversal<'g> {
    /// Create a traversal rooted at `start`.
    ///
    /// Fails with `InvalidReference` if `start` is not a member of the
    /// graph.
    pub fn new(engine: &'g GraphEngine, start: NodeId) -> Result<Self, GraphError> {
        if engine.position(start).is_none() {
            return Err(GraphError::InvalidReference { id: start.0 });
        }
        let mut discovered = HashSet::new();
        discovered.insert(start);
        Ok(Self {
            engine,
            worklist: VecDeque::from([start]),
            discovered,
        })
    }
}

impl Iterator for LevelTraversal<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let node = self.worklist.pop_front()?;
        for &neighbor in self.engine.neighbors(node) {
            if self.discovered.insert(neighbor) {
                self.worklist.push_back(neighbor);
            }
        }
        Some(node)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_order() {
        let mut engine = GraphEngine::new();
        let a = engine.add_node(0.0, 0.0, 0.0);
        let b = engine.add_node(1.0, 0.0, 0.0);
        let c = engine.add_node(2.0, 0.0, 0.0);
        let d = engine.add_node(3.0, 0.0, 0.0);
        let e = engine.add_node(4.0, 0.0, 0.0);

        // a -> [b, d]; b -> [c]; d -> [e]
        engine.add_edge(a, b).unwrap();
        engine.add_edge(a, d).unwrap();
        engine.add_edge(b, c).unwrap();
        engine.add_edge(d, e).unwrap();

        let order: Vec<_> = LevelTraversal::new(&engine, a).unwrap().collect();
        assert_eq!(order, vec![a, b, d, c, e]);
    }

    #[test]
    fn test_diamond_yields_each_node_once() {
        let mut engine = GraphEngine::new();
        let a = engine.add_node(0.0, 0.0, 0.0);
        let b = engine.add_node(1.0, 1.0, 0.0);
        let c = engine.add_node(1.0, -1.0, 0.0);
        let d = engine.add_node(2.0, 0.0, 0.0);

        engine.add_edge(a, b).unwrap();
        engine.add_edge(a, c).unwrap();
        engine.add_edge(b, d).unwrap();
        engine.add_edge(c, d).unwrap();

        let order: Vec<_> = LevelTraversal::new(&engine, a).unwrap().collect();
        assert_eq!(order, vec![a, b, c, d]);
    }

    #[test]
    fn test_unreachable_nodes_never_yielded() {
        let mut engine = GraphEngine::new();
        let a = engine.add_node(0.0, 0.0, 0.0);
        let b = engine.add_node(1.0, 0.0, 0.0);
        engine.add_edge(a, b).unwrap();
        let island = engine.add_node(50.0, 0.0, 0.0);

        let order: Vec<_> = LevelTraversal::new(&engine, a).unwrap().collect();
        assert_eq!(order, vec![a, b]);
        assert!(!order.contains(&island));
    }

    #[test]
    fn test_invalid_start_rejected() {
        let engine = GraphEngine::new();
        let err = LevelTraversal::new(&engine, NodeId(0)).err().unwrap();
        assert_eq!(err, GraphError::InvalidReference { id: 0 });
    }
}
