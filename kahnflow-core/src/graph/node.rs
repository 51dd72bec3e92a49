//! Graph Nodes
//!
//! This module defines the vertices of the computation graph and the closed
//! set of operators a vertex can perform.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use indexmap::IndexSet;
use smallvec::SmallVec;

use crate::numeric::{self, NumericError, Value};

/// Unique identifier for a node.
///
/// Ids come from a process-wide counter, so an id minted by one graph is never
/// mistaken for a node of another.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u64);

impl NodeId {
    /// Generate a new unique node ID.
    pub(crate) fn next() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(0);
        Self(COUNTER.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// What a node computes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Op {
    /// A source node. Its value is pushed in from the feed; it has no
    /// predecessors and computing it does nothing.
    Input,

    /// Sums the values of all predecessors, in declared order.
    Add,

    /// Affine transform of three positional predecessors:
    /// features, weights, bias.
    Linear,

    /// Element-wise logistic function of a single predecessor.
    Sigmoid,
}

impl Op {
    pub fn name(&self) -> &'static str {
        match self {
            Op::Input => "input",
            Op::Add => "add",
            Op::Linear => "linear",
            Op::Sigmoid => "sigmoid",
        }
    }

    /// Whether values for this operator come from the feed.
    pub fn is_source(&self) -> bool {
        matches!(self, Op::Input)
    }

    /// Check a predecessor count. On failure, returns a description of what
    /// the operator expects.
    pub(crate) fn check_arity(&self, count: usize) -> Result<(), &'static str> {
        let ok = match self {
            Op::Input => count == 0,
            Op::Add => count >= 1,
            Op::Linear => count == 3,
            Op::Sigmoid => count == 1,
        };
        if ok {
            return Ok(());
        }
        Err(match self {
            Op::Input => "exactly 0",
            Op::Add => "at least 1",
            Op::Linear => "exactly 3",
            Op::Sigmoid => "exactly 1",
        })
    }

    /// Compute this operator over predecessor values given in declared order.
    ///
    /// Returns `None` for source nodes, which keep whatever was pushed. The
    /// graph checks operand counts when a node is created, so
    /// [`NumericError::OperandCount`] only shows up when calling this directly.
    pub fn apply(&self, inputs: &[&Value]) -> Result<Option<Value>, NumericError> {
        let value = match self {
            Op::Input => return Ok(None),
            Op::Add => numeric::sum(inputs)?,
            Op::Linear => match inputs {
                [x, w, b] => numeric::affine(x, w, b)?,
                _ => {
                    return Err(NumericError::OperandCount {
                        op: "linear",
                        expected: 3,
                        got: inputs.len(),
                    })
                }
            },
            Op::Sigmoid => match inputs {
                [z] => numeric::sigmoid(z),
                _ => {
                    return Err(NumericError::OperandCount {
                        op: "sigmoid",
                        expected: 1,
                        got: inputs.len(),
                    })
                }
            },
        };
        Ok(Some(value))
    }
}

impl fmt::Display for Op {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A node in the computation graph.
#[derive(Debug)]
pub struct Node {
    /// Unique identifier for this node.
    id: NodeId,

    /// What this node computes.
    op: Op,

    /// Nodes this node reads from, in positional order. May repeat.
    predecessors: SmallVec<[NodeId; 3]>,

    /// Nodes that read from this node. The inverse of `predecessors`,
    /// maintained by the graph when a reader is created.
    successors: IndexSet<NodeId>,

    /// Result of the last computation, or the fed value for sources.
    value: Option<Value>,
}

impl Node {
    pub(crate) fn new(op: Op, predecessors: &[NodeId]) -> Self {
        Self {
            id: NodeId::next(),
            op,
            predecessors: SmallVec::from_slice(predecessors),
            successors: IndexSet::new(),
            value: None,
        }
    }

    /// Get the node's ID.
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// Get the node's operator.
    pub fn op(&self) -> Op {
        self.op
    }

    pub fn is_source(&self) -> bool {
        self.op.is_source()
    }

    /// Get all predecessors in declared order.
    pub fn predecessors(&self) -> &[NodeId] {
        &self.predecessors
    }

    /// Get all successors.
    pub fn successors(&self) -> &IndexSet<NodeId> {
        &self.successors
    }

    /// The node's current value, if it has one.
    pub fn value(&self) -> Option<&Value> {
        self.value.as_ref()
    }

    pub(crate) fn add_successor(&mut self, node_id: NodeId) {
        self.successors.insert(node_id);
    }

    pub(crate) fn set_value(&mut self, value: Value) {
        self.value = Some(value);
    }

    pub(crate) fn clear_value(&mut self) {
        self.value = None;
    }
}
