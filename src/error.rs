//! Error types for graph construction and search control.

use thiserror::Error;

/// Errors raised by graph construction and stepper control.
///
/// All failures are immediate and local to the call that caused them; there
/// is nothing to retry. An unreachable search target is deliberately *not*
/// an error — the stepper still runs to completion and surfaces the
/// degenerate result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum GraphError {
    /// An edge endpoint or a start/end index refers to a node that is not a
    /// member of the graph.
    #[error("node {id} is not a member of the graph")]
    InvalidReference { id: u32 },

    /// A search was reset on a graph with zero nodes, so no start or end
    /// node can be selected.
    #[error("cannot search an empty graph")]
    EmptyGraph,
}
