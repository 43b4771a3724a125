//! Node types and per-node algorithm state.
//!
//! Nodes are the vertices in the graph. Each node has:
//! - A stable unique identifier
//! - Position (x, y, z) in world space
//! - Search state (tentative distance, predecessor, visited flag)
//! - A visual mode consumed by the external renderer

use serde::Serialize;
use std::fmt;

/// Stable node identifier.
///
/// Nodes are never removed once added, so the raw value is also the node's
/// insertion position in the graph.
/// It wraps a u32 for efficient storage and WebAssembly interop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct NodeId(pub u32);

impl NodeId {
    /// Create a new NodeId from a raw u32.
    #[inline]
    pub fn new(id: u32) -> Self {
        Self(id)
    }

    /// Get the raw u32 value.
    #[inline]
    pub fn raw(self) -> u32 {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Node({})", self.0)
    }
}

impl From<u32> for NodeId {
    #[inline]
    fn from(id: u32) -> Self {
        Self(id)
    }
}

impl From<NodeId> for u32 {
    #[inline]
    fn from(id: NodeId) -> Self {
        id.0
    }
}

/// Visual mode of a node, consumed by the renderer to pick a display color.
///
/// The engine only ever exposes positions and modes across the renderer
/// boundary; modes never feed back into the algorithms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[repr(u8)]
pub enum NodeMode {
    /// Not yet discovered by the active traversal.
    #[default]
    Unvisited = 0,
    /// The node currently being expanded.
    Visiting = 1,
    /// Popped from the frontier and relaxed.
    Visited = 2,
    /// On the reconstructed shortest path.
    Path = 3,
    /// The search source. Pinned.
    Start = 4,
    /// The search target. Pinned.
    End = 5,
}

impl NodeMode {
    /// Pinned modes survive ordinary `set_mode` calls: the stored mode is
    /// kept while ancillary effects (the pulse hint) still update.
    #[inline]
    pub fn is_pinned(self) -> bool {
        matches!(self, NodeMode::Start | NodeMode::End)
    }

    /// Animation-rate hint for the renderer, in pulses per second.
    pub fn pulse_rate(self) -> f32 {
        match self {
            NodeMode::Unvisited => 0.0,
            NodeMode::Visiting => 2.0,
            NodeMode::Visited => 0.5,
            NodeMode::Path => 1.5,
            NodeMode::Start | NodeMode::End => 1.0,
        }
    }

    /// Decode from the raw wire value. Unknown values map to `Unvisited`.
    pub fn from_raw(raw: u8) -> Self {
        match raw {
            1 => NodeMode::Visiting,
            2 => NodeMode::Visited,
            3 => NodeMode::Path,
            4 => NodeMode::Start,
            5 => NodeMode::End,
            _ => NodeMode::Unvisited,
        }
    }
}

impl fmt::Display for NodeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            NodeMode::Unvisited => "Unvisited",
            NodeMode::Visiting => "Visiting",
            NodeMode::Visited => "Visited",
            NodeMode::Path => "Path",
            NodeMode::Start => "Start",
            NodeMode::End => "End",
        };
        f.write_str(name)
    }
}

/// Algorithm-mutable state of a node, stored in SoA slots beside the
/// topology.
///
/// Only the active stepper mutates this; the renderer-facing API is
/// read-only.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearchState {
    /// Tentative distance from the start node. Infinity until relaxed.
    pub distance: f32,
    /// Node from which `distance` was last improved. `None` until a search
    /// has been reset; the start node points at itself.
    pub predecessor: Option<NodeId>,
    /// True once the node has been popped from the frontier and relaxed.
    pub visited: bool,
}

impl Default for SearchState {
    fn default() -> Self {
        Self {
            distance: f32::INFINITY,
            predecessor: None,
            visited: false,
        }
    }
}

/// A mode-change notification, drained by the host once per frame.
///
/// Carries exactly the data the renderer boundary needs: which node changed
/// and what it changed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ModeChange {
    /// Raw id of the node whose mode changed.
    pub node: u32,
    /// The new mode.
    pub mode: NodeMode,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_id() {
        let id = NodeId::new(42);
        assert_eq!(id.raw(), 42);
        assert_eq!(id.0, 42);
        assert_eq!(format!("{}", id), "Node(42)");
    }

    #[test]
    fn test_node_id_conversion() {
        let id: NodeId = 123.into();
        let raw: u32 = id.into();
        assert_eq!(raw, 123);
    }

    #[test]
    fn test_mode_pinning() {
        assert!(NodeMode::Start.is_pinned());
        assert!(NodeMode::End.is_pinned());
        assert!(!NodeMode::Unvisited.is_pinned());
        assert!(!NodeMode::Visiting.is_pinned());
        assert!(!NodeMode::Path.is_pinned());
    }

    #[test]
    fn test_mode_raw_round_trip() {
        for mode in [
            NodeMode::Unvisited,
            NodeMode::Visiting,
            NodeMode::Visited,
            NodeMode::Path,
            NodeMode::Start,
            NodeMode::End,
        ] {
            assert_eq!(NodeMode::from_raw(mode as u8), mode);
        }
        assert_eq!(NodeMode::from_raw(200), NodeMode::Unvisited);
    }

    #[test]
    fn test_search_state_default() {
        let state = SearchState::default();
        assert!(state.distance.is_infinite());
        assert_eq!(state.predecessor, None);
        assert!(!state.visited);
    }

    #[test]
    fn test_visiting_pulses_fastest() {
        assert!(NodeMode::Visiting.pulse_rate() > NodeMode::Path.pulse_rate());
        assert_eq!(NodeMode::Unvisited.pulse_rate(), 0.0);
    }
}
