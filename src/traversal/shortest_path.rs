//! Step-wise single-source shortest-path search.
//!
//! A Dijkstra-style search driven one discrete unit of work per external
//! call (typically a key press in the host), rather than running to
//! completion. The stepper is an explicit state machine:
//!
//! ```text
//! Waiting -> Searching -> Returning -> Done
//! ```
//!
//! `Searching` pops and relaxes one frontier node per step. When the
//! frontier empties the stepper switches to `Returning` and walks the
//! predecessor chain backward from the end node, marking one `Path` node per
//! step, until it reaches the start. The frontier is a plain vector scanned
//! linearly for the minimum distance; at one pop per keypress the
//! O(frontier) scan is deliberate and keeps the first-encountered tie-break
//! stable.

use serde::Serialize;
use tracing::{debug, trace};

use crate::error::GraphError;
use crate::graph::{GraphEngine, NodeId, NodeMode};

/// State of a [`ShortestPathStepper`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[repr(u8)]
pub enum TraversalState {
    /// No search has started; the first step performs the reset.
    #[default]
    Waiting = 0,
    /// Popping and relaxing frontier nodes.
    Searching = 1,
    /// Walking the predecessor chain backward, marking the path.
    Returning = 2,
    /// Path fully marked.
    Done = 3,
}

/// What `step` does once the stepper is [`TraversalState::Done`].
///
/// Source material disagreed on this (no-op vs. automatic restart), so it
/// is explicit configuration rather than a silent choice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum DoneBehavior {
    /// Further steps are no-ops; node state stays frozen.
    #[default]
    Hold,
    /// The next step re-runs the reset and starts a fresh search.
    Restart,
}

/// The step-wise shortest-path stepper.
///
/// Start and end nodes are selected by insertion position, matching the
/// host's index-based selection. All progress happens inside
/// [`step`](Self::step); there is no internal clock, and a stepper never
/// mutates the engine outside a `step` or `reset` call.
pub struct ShortestPathStepper {
    start_index: usize,
    end_index: usize,
    start: Option<NodeId>,
    end: Option<NodeId>,
    /// The node currently highlighted as `Visiting` (or being walked during
    /// `Returning`).
    current: Option<NodeId>,
    /// Mode to restore on `current` when the highlight moves on.
    saved_mode: NodeMode,
    /// Discovered but not yet finalized nodes.
    frontier: Vec<NodeId>,
    state: TraversalState,
    done_behavior: DoneBehavior,
}

impl ShortestPathStepper {
    /// Create a stepper targeting the given start/end insertion positions.
    ///
    /// Index validation happens at reset time, so a stepper may be created
    /// before the builder has finished populating the graph.
    pub fn new(start_index: usize, end_index: usize) -> Self {
        Self {
            start_index,
            end_index,
            start: None,
            end: None,
            current: None,
            saved_mode: NodeMode::Start,
            frontier: Vec::new(),
            state: TraversalState::Waiting,
            done_behavior: DoneBehavior::default(),
        }
    }

    /// Current state of the state machine.
    pub fn state(&self) -> TraversalState {
        self.state
    }

    /// The configured done behavior.
    pub fn done_behavior(&self) -> DoneBehavior {
        self.done_behavior
    }

    /// Configure what happens on steps after the search completes.
    pub fn set_done_behavior(&mut self, behavior: DoneBehavior) {
        self.done_behavior = behavior;
    }

    /// The resolved start node, once a reset has run.
    pub fn start(&self) -> Option<NodeId> {
        self.start
    }

    /// The resolved end node, once a reset has run.
    pub fn end(&self) -> Option<NodeId> {
        self.end
    }

    #[cfg(test)]
    pub(crate) fn frontier(&self) -> &[NodeId] {
        &self.frontier
    }

    /// Re-initialize the search, selecting start and end by insertion
    /// position.
    ///
    /// Every node's distance goes to the infinite sentinel, visited flags
    /// clear, predecessors seed to the start node, and modes revert to
    /// `Unvisited`; the start node is then marked (distance zero, visited,
    /// pushed onto the frontier) and the end node pinned. Calling this
    /// mid-search discards the in-progress frontier: cancellation is just a
    /// reset.
    pub fn reset(
        &mut self,
        engine: &mut GraphEngine,
        start_index: usize,
        end_index: usize,
    ) -> Result<(), GraphError> {
        if engine.node_count() == 0 {
            return Err(GraphError::EmptyGraph);
        }
        let start = engine
            .node_at(start_index)
            .ok_or(GraphError::InvalidReference {
                id: start_index as u32,
            })?;
        let end = engine.node_at(end_index).ok_or(GraphError::InvalidReference {
            id: end_index as u32,
        })?;

        self.start_index = start_index;
        self.end_index = end_index;
        self.start = Some(start);
        self.end = Some(end);

        engine.reset_search(start);
        self.frontier.clear();
        self.current = Some(start);
        self.saved_mode = NodeMode::Start;

        if let Some(state) = engine.search_mut(start) {
            state.distance = 0.0;
            state.predecessor = Some(start);
            state.visited = true;
        }
        engine.force_mode(start, NodeMode::Start);
        self.frontier.push(start);

        // Marked after the start so that a coincident start/end shows as End;
        // the end node's distance is left untouched.
        engine.force_mode(end, NodeMode::End);

        debug!(start = start.0, end = end.0, "searching");
        self.state = TraversalState::Searching;
        Ok(())
    }

    /// Advance the search by one unit of work.
    ///
    /// Synchronous and non-blocking; returns the state after the step.
    pub fn step(&mut self, engine: &mut GraphEngine) -> Result<TraversalState, GraphError> {
        match self.state {
            TraversalState::Waiting => {
                self.reset(engine, self.start_index, self.end_index)?;
            }

            TraversalState::Searching => {
                if self.frontier.is_empty() {
                    // Out of nodes to look at: the search is complete (or the
                    // end was unreachable). Either way, start walking back.
                    debug!("returning");
                    if let Some(current) = self.current {
                        engine.set_mode(current, self.saved_mode);
                    }
                    self.current = self.end.and_then(|end| engine.predecessor(end));
                    self.state = TraversalState::Returning;
                } else {
                    self.visit_next_node(engine);
                }
            }

            TraversalState::Returning => {
                if self.current.is_some() && self.current != self.start {
                    trace!("stepping back");
                    if let Some(current) = self.current {
                        engine.set_mode(current, NodeMode::Path);
                        self.current = engine.predecessor(current);
                    }
                } else {
                    debug!("done");
                    self.state = TraversalState::Done;
                }
            }

            TraversalState::Done => match self.done_behavior {
                DoneBehavior::Hold => {}
                DoneBehavior::Restart => {
                    self.reset(engine, self.start_index, self.end_index)?;
                }
            },
        }

        Ok(self.state)
    }

    /// Pop the closest frontier node, relax its neighbors, and move the
    /// `Visiting` highlight onto it.
    fn visit_next_node(&mut self, engine: &mut GraphEngine) {
        let selected = self.next_shortest(engine);
        trace!(node = selected.0, "visiting next node");

        // The previously highlighted node reverts to whatever it was before
        // the highlight landed on it.
        if let Some(current) = self.current {
            engine.set_mode(current, self.saved_mode);
        }
        self.current = Some(selected);

        if self.start != Some(selected) && self.end != Some(selected) {
            engine.set_mode(selected, NodeMode::Visited);
            self.saved_mode = NodeMode::Visited;
        } else {
            // Start/End keep their pinned mode once the highlight moves on.
            self.saved_mode = engine.mode(selected).unwrap_or_default();
        }
        engine.set_mode(selected, NodeMode::Visiting);

        if let Some(state) = engine.search_mut(selected) {
            state.visited = true;
        }

        let neighbors = engine.neighbors(selected).to_vec();
        for neighbor in neighbors {
            if !engine.is_visited(neighbor) && !self.frontier.contains(&neighbor) {
                self.frontier.push(neighbor);
            }

            let candidate =
                engine.distance(selected) + engine.distance_between(selected, neighbor);
            if candidate < engine.distance(neighbor) {
                if let Some(state) = engine.search_mut(neighbor) {
                    state.distance = candidate;
                    state.predecessor = Some(selected);
                }
            }
        }
    }

    /// Remove and return the unvisited frontier node with minimum distance.
    ///
    /// Linear scan; strict comparison keeps the first-encountered node on
    /// ties, so selection order is stable for a given insertion order.
    /// Callers guarantee the frontier is non-empty.
    fn next_shortest(&mut self, engine: &GraphEngine) -> NodeId {
        let mut best = 0;
        for (i, &node) in self.frontier.iter().enumerate() {
            if !engine.is_visited(node)
                && engine.distance(node) < engine.distance(self.frontier[best])
            {
                best = i;
            }
        }
        self.frontier.remove(best)
    }

    /// The current path from start to end, following predecessor links
    /// backward from the end node.
    ///
    /// With an unreachable end this degenerates to `[start, end]`, since
    /// the reset seeds every predecessor with the start node; the caller can
    /// tell the cases apart by the end node's distance. The walk is capped
    /// at the node count, so it is bounded even on degenerate chains.
    pub fn path(&self, engine: &GraphEngine) -> Vec<NodeId> {
        let (Some(start), Some(end)) = (self.start, self.end) else {
            return Vec::new();
        };

        let mut path = vec![end];
        let mut cursor = end;
        for _ in 0..engine.node_count() {
            if cursor == start {
                break;
            }
            match engine.predecessor(cursor) {
                Some(prev) => {
                    path.push(prev);
                    cursor = prev;
                }
                None => break,
            }
        }
        path.reverse();
        path
    }
}
