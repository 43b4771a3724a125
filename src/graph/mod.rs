//! Graph data structures and operations.
//!
//! This module provides the core graph structure using petgraph's StableGraph
//! for stable node/edge identity, with Structure of Arrays (SoA) layout for
//! positions, search state, and visual modes. Traversal algorithms live in
//! [`crate::traversal`] and drive this state one step at a time.

mod edge;
mod engine;
mod node;

pub use edge::EdgeId;
pub use engine::GraphEngine;
pub use node::{ModeChange, NodeId, NodeMode, SearchState};
