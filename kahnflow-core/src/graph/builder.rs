//! Graph Builder
//!
//! The graph owns every node in an arena keyed by [`NodeId`]. Creating a node
//! with predecessors records the reverse edge on each predecessor at the same
//! time, so the predecessor and successor relations always mirror each other.
//!
//! Predecessors have to exist before the node that reads from them, which
//! means a graph assembled through this API cannot contain a cycle.

use indexmap::IndexMap;
use smallvec::SmallVec;

use super::node::{Node, NodeId, Op};
use crate::error::{GraphError, Result};
use crate::numeric::Value;

/// A computation graph.
#[derive(Debug, Default)]
pub struct Graph {
    /// All nodes, in creation order.
    nodes: IndexMap<NodeId, Node>,
}

impl Graph {
    /// Create a new empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a source node.
    pub fn input(&mut self) -> NodeId {
        let node = Node::new(Op::Input, &[]);
        let id = node.id();
        self.nodes.insert(id, node);
        id
    }

    /// Create an accumulator over one or more predecessors.
    pub fn add(&mut self, predecessors: &[NodeId]) -> Result<NodeId> {
        self.add_node(Op::Add, predecessors)
    }

    /// Create an affine transform `x · w + b`.
    pub fn linear(&mut self, x: NodeId, w: NodeId, b: NodeId) -> Result<NodeId> {
        self.add_node(Op::Linear, &[x, w, b])
    }

    pub fn sigmoid(&mut self, x: NodeId) -> Result<NodeId> {
        self.add_node(Op::Sigmoid, &[x])
    }

    /// Create a node of any kind and wire it to its predecessors.
    ///
    /// Nothing is modified unless every predecessor exists and the operator
    /// accepts that many of them.
    pub fn add_node(&mut self, op: Op, predecessors: &[NodeId]) -> Result<NodeId> {
        op.check_arity(predecessors.len())
            .map_err(|expected| GraphError::Arity {
                op: op.name(),
                expected,
                got: predecessors.len(),
            })?;
        if let Some(&unknown) = predecessors.iter().find(|p| !self.nodes.contains_key(*p)) {
            return Err(GraphError::UnknownNode(unknown));
        }

        let node = Node::new(op, predecessors);
        let id = node.id();
        for pred in predecessors {
            if let Some(pred_node) = self.nodes.get_mut(pred) {
                pred_node.add_successor(id);
            }
        }
        self.nodes.insert(id, node);
        Ok(id)
    }

    /// Get a reference to a node.
    pub fn node(&self, node_id: NodeId) -> Option<&Node> {
        self.nodes.get(&node_id)
    }

    pub(crate) fn node_mut(&mut self, node_id: NodeId) -> Result<&mut Node> {
        self.nodes
            .get_mut(&node_id)
            .ok_or(GraphError::UnknownNode(node_id))
    }

    /// The current value of a node.
    pub fn value(&self, node_id: NodeId) -> Option<&Value> {
        self.nodes.get(&node_id).and_then(Node::value)
    }

    /// Push a value into a source node.
    ///
    /// This is separate from [`compute`](Self::compute): a source's compute
    /// step leaves the pushed value untouched.
    pub fn push(&mut self, node_id: NodeId, value: Value) -> Result<()> {
        let node = self.node_mut(node_id)?;
        if !node.is_source() {
            return Err(GraphError::NotASource { node: node_id });
        }
        node.set_value(value);
        Ok(())
    }

    /// Compute one node from its predecessors' current values.
    ///
    /// Fails with [`GraphError::UnreadyDependency`] if any predecessor has no
    /// value yet, rather than reading a stale or missing one.
    pub fn compute(&mut self, node_id: NodeId) -> Result<()> {
        // Input borrows must end before the node is written back.
        let computed = {
            let node = self
                .nodes
                .get(&node_id)
                .ok_or(GraphError::UnknownNode(node_id))?;

            let mut inputs: SmallVec<[&Value; 3]> = SmallVec::new();
            for &pred in node.predecessors() {
                let value = self
                    .value(pred)
                    .ok_or(GraphError::UnreadyDependency {
                        node: node_id,
                        dependency: pred,
                    })?;
                inputs.push(value);
            }

            let computed = node
                .op()
                .apply(&inputs)
                .map_err(|source| GraphError::Compute {
                    node: node_id,
                    source,
                })?;
            computed
        };

        if let Some(value) = computed {
            self.node_mut(node_id)?.set_value(value);
        }
        Ok(())
    }

    /// Drop a node's value ahead of a fresh pass.
    pub(crate) fn clear_value(&mut self, node_id: NodeId) -> Result<()> {
        self.node_mut(node_id)?.clear_value();
        Ok(())
    }

    /// Nodes with no successors.
    pub fn sinks(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes
            .values()
            .filter(|node| node.successors().is_empty())
            .map(Node::id)
    }

    /// Get the total number of nodes in the graph.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Splice in a successor edge without touching predecessor lists, so the
    /// scheduler's cycle guard can be exercised.
    #[cfg(test)]
    pub(crate) fn add_successor_unchecked(&mut self, from: NodeId, to: NodeId) {
        if let Some(node) = self.nodes.get_mut(&from) {
            node.add_successor(to);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn edges_are_symmetric() {
        let mut graph = Graph::new();
        let x = graph.input();
        let y = graph.input();
        let sum = graph.add(&[x, y]).unwrap();

        assert_eq!(graph.node(sum).unwrap().predecessors(), &[x, y]);
        assert!(graph.node(x).unwrap().successors().contains(&sum));
        assert!(graph.node(y).unwrap().successors().contains(&sum));
        assert_eq!(graph.node_count(), 3);
    }

    #[test]
    fn repeated_predecessor_is_one_edge() {
        let mut graph = Graph::new();
        let x = graph.input();
        let double = graph.add(&[x, x]).unwrap();

        assert_eq!(graph.node(double).unwrap().predecessors().len(), 2);
        assert_eq!(graph.node(x).unwrap().successors().len(), 1);
    }

    #[test]
    fn unknown_predecessor_is_rejected_without_side_effects() {
        let mut other = Graph::new();
        let foreign = other.input();

        let mut graph = Graph::new();
        let x = graph.input();
        let err = graph.add(&[x, foreign]).unwrap_err();

        assert!(matches!(err, GraphError::UnknownNode(id) if id == foreign));
        assert!(graph.node(x).unwrap().successors().is_empty());
        assert_eq!(graph.node_count(), 1);
    }

    #[test]
    fn arity_is_checked() {
        let mut graph = Graph::new();
        let x = graph.input();
        let err = graph.add_node(Op::Linear, &[x, x]).unwrap_err();
        assert!(matches!(
            err,
            GraphError::Arity { op: "linear", expected: "exactly 3", got: 2 }
        ));
        assert!(matches!(graph.add(&[]), Err(GraphError::Arity { .. })));
    }

    #[test]
    fn push_only_reaches_sources() {
        let mut graph = Graph::new();
        let x = graph.input();
        let sum = graph.add(&[x]).unwrap();

        graph.push(x, Value::from(3.0)).unwrap();
        assert_eq!(graph.value(x), Some(&Value::Scalar(3.0)));

        let err = graph.push(sum, Value::from(1.0)).unwrap_err();
        assert!(matches!(err, GraphError::NotASource { node } if node == sum));
    }

    #[test]
    fn compute_requires_ready_predecessors() {
        let mut graph = Graph::new();
        let x = graph.input();
        let y = graph.input();
        let sum = graph.add(&[x, y]).unwrap();

        graph.push(x, Value::from(1.0)).unwrap();
        let err = graph.compute(sum).unwrap_err();
        assert!(matches!(
            err,
            GraphError::UnreadyDependency { node, dependency } if node == sum && dependency == y
        ));
        assert!(graph.value(sum).is_none());

        graph.push(y, Value::from(2.0)).unwrap();
        graph.compute(sum).unwrap();
        assert_eq!(graph.value(sum), Some(&Value::Scalar(3.0)));
    }

    #[test]
    fn computing_a_source_is_a_no_op() {
        let mut graph = Graph::new();
        let x = graph.input();
        graph.compute(x).unwrap();
        assert!(graph.value(x).is_none());

        graph.push(x, Value::from(7.0)).unwrap();
        graph.compute(x).unwrap();
        assert_eq!(graph.value(x), Some(&Value::Scalar(7.0)));
    }

    #[test]
    fn sinks_are_nodes_without_readers() {
        let mut graph = Graph::new();
        let x = graph.input();
        let a = graph.sigmoid(x).unwrap();
        let b = graph.add(&[x]).unwrap();

        let sinks: Vec<_> = graph.sinks().collect();
        assert_eq!(sinks, vec![a, b]);
    }
}
