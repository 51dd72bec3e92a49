//! Error types for graph construction, scheduling, and evaluation.
//!
//! Every error is fatal for the pass that raised it. Nothing is retried and no
//! partial result is returned; the caller fixes the graph or the feed and runs
//! again.

use thiserror::Error;

use crate::graph::NodeId;
use crate::numeric::NumericError;

/// The main error type for kahnflow operations.
#[derive(Error, Debug)]
pub enum GraphError {
    /// A node id that was never created in this graph.
    #[error("node {0} does not belong to this graph")]
    UnknownNode(NodeId),

    /// An operator was given the wrong number of predecessors.
    #[error("{op} node expects {expected} predecessors, got {got}")]
    Arity {
        op: &'static str,
        expected: &'static str,
        got: usize,
    },

    /// A value was fed to a node that derives its value from predecessors.
    #[error("node {node} is not a source node and cannot be fed a value")]
    NotASource { node: NodeId },

    /// A node was computed while one of its predecessors had no value.
    #[error("node {node} read predecessor {dependency} before it had a value")]
    UnreadyDependency { node: NodeId, dependency: NodeId },

    /// A scheduled node reads from a node that the feed cannot reach.
    #[error("node {node} depends on {missing}, which is not reachable from the feed")]
    IncompleteFeed { node: NodeId, missing: NodeId },

    /// Peeling stopped before every discovered node reached in-degree zero.
    #[error("graph not acyclic: scheduled {scheduled} of {discovered} reachable nodes")]
    CycleDetected {
        scheduled: usize,
        discovered: usize,
        unscheduled: Vec<NodeId>,
    },

    /// The requested output is not part of the evaluation order.
    #[error("output node {0} is not part of the evaluation order")]
    OutputNotScheduled(NodeId),

    /// The output node still has no value after the pass.
    #[error("output node {0} has no value after the forward pass")]
    MissingOutput(NodeId),

    /// The node's operator rejected its inputs.
    #[error("node {node} failed to compute: {source}")]
    Compute {
        node: NodeId,
        #[source]
        source: NumericError,
    },

    /// Scheduler configuration could not be parsed.
    #[error("invalid scheduler configuration: {0}")]
    Config(#[from] serde_json::Error),
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, GraphError>;
