//! Typed errors for graph construction and route queries

use thiserror::Error;

use crate::graph::VertexId;

/// A structural defect found while building or validating a graph.
///
/// Any of these points at a bug in the data layer, not at the caller.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GraphDefect {
    #[error("vertex {0} is listed more than once")]
    DuplicateVertex(VertexId),

    #[error("edge {0} -> {0} is a self-loop")]
    SelfLoop(VertexId),

    #[error("edge {from} -> {to} references a vertex that is not in the graph")]
    DanglingEdge { from: VertexId, to: VertexId },

    #[error("edge {from} -> {to} is declared more than once")]
    DuplicateEdge { from: VertexId, to: VertexId },

    #[error("edge {from} -> {to} has invalid weights (distance {distance}, time {time})")]
    InvalidWeight {
        from: VertexId,
        to: VertexId,
        distance: f64,
        time: f64,
    },

    #[error("edge {from} -> {to} has no reverse edge")]
    MissingReverse { from: VertexId, to: VertexId },

    #[error("edge {from} -> {to} weights differ from its reverse")]
    AsymmetricWeights { from: VertexId, to: VertexId },
}

/// Errors surfaced by graph construction and `find_shortest_path`.
///
/// An unreachable destination is not an error; it is an empty `RouteResult`.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RouteError {
    #[error("unknown vertex {0}")]
    UnknownVertex(VertexId),

    #[error("malformed graph: {0}")]
    MalformedGraph(#[from] GraphDefect),

    #[error("graph has {count} {what}, limit is {limit}")]
    LimitExceeded {
        what: &'static str,
        count: usize,
        limit: usize,
    },

    #[error("unknown cost metric '{0}' (expected 'distance' or 'time')")]
    UnknownMetric(String),
}
