//! Traversal strategies over a [`GraphEngine`](crate::graph::GraphEngine).
//!
//! Two shapes of traversal live here:
//! - Lazy iterators ([`DepthFirstTraversal`], [`LevelTraversal`]) that yield
//!   reachable nodes one at a time and never touch node state.
//! - The [`ShortestPathStepper`] state machine, which mutates per-node
//!   search state and visual modes one externally-driven step at a time.

mod depth_first;
mod level;
mod shortest_path;

pub use depth_first::DepthFirstTraversal;
pub use level::LevelTraversal;
pub use shortest_path::{DoneBehavior, ShortestPathStepper, TraversalState};
