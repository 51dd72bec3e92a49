//! Forward Executor
//!
//! Walks an evaluation order produced by the scheduler and computes each node
//! in turn.

use super::builder::Graph;
use super::node::NodeId;
use crate::error::{GraphError, Result};
use crate::numeric::Value;

/// Compute every node in `order`, strictly in that order, and return the value
/// of `output`.
///
/// `output` must appear in `order`. Any node may be read, not only a sink.
#[tracing::instrument(skip_all, fields(nodes = order.len(), output = %output))]
pub fn evaluate(graph: &mut Graph, order: &[NodeId], output: NodeId) -> Result<Value> {
    if !order.contains(&output) {
        return Err(GraphError::OutputNotScheduled(output));
    }

    for &node_id in order {
        graph.compute(node_id)?;
        tracing::trace!(node = %node_id, "Computed node");
    }

    let value = graph
        .value(output)
        .cloned()
        .ok_or(GraphError::MissingOutput(output))?;
    tracing::debug!(value = %value, "Forward pass complete");
    Ok(value)
}
