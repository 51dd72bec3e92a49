//! Topological Scheduler
//!
//! The scheduler turns a feed into an evaluation order.
//!
//! # Algorithm
//!
//! Kahn's algorithm, in two phases:
//!
//! 1. Discovery: breadth-first from the feed's keys along successor edges.
//!    Every edge out of a discovered node is recorded against its target,
//!    even when the target was already discovered through another path, so a
//!    node with several predecessors ends up with one unit of in-degree per
//!    distinct predecessor.
//! 2. Peeling: start with the seeds as the ready set. Repeatedly take a ready
//!    node, append it to the order, and drop its outgoing edges. A successor
//!    whose in-degree reaches zero becomes ready.
//!
//! If peeling stops with nodes left over, the reachable graph has a cycle and
//! the pass fails with [`GraphError::CycleDetected`] instead of returning a
//! truncated order. Node values are only touched once the order is complete,
//! so a rejected pass leaves the graph as it was.

use std::collections::hash_map::RandomState;
use std::collections::{HashMap, VecDeque};
use std::hash::BuildHasher;

use indexmap::{IndexMap, IndexSet};

use super::builder::Graph;
use super::executor::evaluate;
use super::node::NodeId;
use crate::config::{ReadyOrder, SchedulerConfig};
use crate::error::{GraphError, Result};
use crate::numeric::Value;

/// Values for the source nodes of one pass, keyed by node.
pub type Feed = IndexMap<NodeId, Value>;

/// Nodes whose predecessors have all been scheduled.
enum ReadySet {
    /// Pops swap-remove at a position picked from a per-pass random cursor,
    /// so ties come out in no fixed order and every pop is O(1).
    Unordered { set: IndexSet<NodeId>, cursor: u64 },
    Fifo(VecDeque<NodeId>),
}

impl ReadySet {
    fn new(order: ReadyOrder) -> Self {
        match order {
            ReadyOrder::Unordered => ReadySet::Unordered {
                set: IndexSet::new(),
                cursor: RandomState::new().hash_one(()),
            },
            ReadyOrder::Fifo => ReadySet::Fifo(VecDeque::new()),
        }
    }

    fn insert(&mut self, node_id: NodeId) {
        match self {
            ReadySet::Unordered { set, .. } => {
                set.insert(node_id);
            }
            ReadySet::Fifo(queue) => queue.push_back(node_id),
        }
    }

    fn pop(&mut self) -> Option<NodeId> {
        match self {
            ReadySet::Unordered { set, cursor } => {
                if set.is_empty() {
                    return None;
                }
                let index = (*cursor % set.len() as u64) as usize;
                set.swap_remove_index(index)
            }
            ReadySet::Fifo(queue) => queue.pop_front(),
        }
    }
}

/// Schedules and runs forward passes over a [`Graph`].
#[derive(Debug, Clone, Default)]
pub struct Scheduler {
    config: SchedulerConfig,
}

impl Scheduler {
    /// Create a scheduler with the given configuration.
    pub fn new(config: SchedulerConfig) -> Self {
        Self { config }
    }

    /// Compute the evaluation order for a feed and push the fed values.
    ///
    /// Returns every node reachable from the feed's keys, each after all of
    /// its predecessors. Values of the other reachable nodes are cleared so
    /// the coming pass starts fresh. On error no value in the graph changes.
    #[tracing::instrument(skip_all, fields(seeds = feed.len()))]
    pub fn schedule(&self, graph: &mut Graph, feed: &Feed) -> Result<Vec<NodeId>> {
        for &seed in feed.keys() {
            let node = graph.node(seed).ok_or(GraphError::UnknownNode(seed))?;
            if !node.is_source() {
                return Err(GraphError::NotASource { node: seed });
            }
        }

        let incoming = discover(graph, feed);

        if self.config.strict_feed {
            check_feed(graph, &incoming)?;
        }

        let order = self.peel(graph, feed, &incoming)?;

        for &node_id in &order {
            match feed.get(&node_id) {
                Some(value) => graph.push(node_id, value.clone())?,
                None => graph.clear_value(node_id)?,
            }
        }

        tracing::debug!(nodes = order.len(), "Scheduled forward pass");
        Ok(order)
    }

    /// Kahn peeling over the discovered subgraph. Reads the graph only.
    fn peel(
        &self,
        graph: &Graph,
        feed: &Feed,
        incoming: &IndexMap<NodeId, IndexSet<NodeId>>,
    ) -> Result<Vec<NodeId>> {
        let mut in_degree: HashMap<NodeId, usize> = incoming
            .iter()
            .map(|(&node_id, preds)| (node_id, preds.len()))
            .collect();
        let mut ready = ReadySet::new(self.config.ready_order);
        for &seed in feed.keys() {
            ready.insert(seed);
        }

        let mut order = Vec::with_capacity(incoming.len());
        while let Some(node_id) = ready.pop() {
            order.push(node_id);

            let node = graph.node(node_id).ok_or(GraphError::UnknownNode(node_id))?;
            for successor in node.successors() {
                match in_degree.get_mut(successor) {
                    Some(degree) if *degree > 0 => {
                        *degree -= 1;
                        if *degree == 0 {
                            ready.insert(*successor);
                        }
                    }
                    _ => {}
                }
            }
        }

        if order.len() != incoming.len() {
            let unscheduled: Vec<NodeId> = in_degree
                .into_iter()
                .filter(|&(_, degree)| degree > 0)
                .map(|(node_id, _)| node_id)
                .collect();
            tracing::warn!(
                scheduled = order.len(),
                discovered = incoming.len(),
                "Cycle left nodes unscheduled"
            );
            return Err(GraphError::CycleDetected {
                scheduled: order.len(),
                discovered: incoming.len(),
                unscheduled,
            });
        }

        Ok(order)
    }

    /// Schedule a feed, evaluate every scheduled node, and return the value
    /// of `output`.
    pub fn run(&self, graph: &mut Graph, feed: &Feed, output: NodeId) -> Result<Value> {
        let order = self.schedule(graph, feed)?;
        evaluate(graph, &order, output)
    }
}

/// Breadth-first discovery from the feed's keys.
///
/// Maps every reachable node to the set of discovered predecessors with an
/// edge into it. Seeds come first; the rest follow in discovery order.
fn discover(graph: &Graph, feed: &Feed) -> IndexMap<NodeId, IndexSet<NodeId>> {
    let mut incoming: IndexMap<NodeId, IndexSet<NodeId>> = IndexMap::new();
    let mut queue: VecDeque<NodeId> = VecDeque::new();

    for &seed in feed.keys() {
        incoming.entry(seed).or_default();
        queue.push_back(seed);
    }

    while let Some(node_id) = queue.pop_front() {
        let Some(node) = graph.node(node_id) else {
            continue;
        };
        for &successor in node.successors() {
            if !incoming.contains_key(&successor) {
                queue.push_back(successor);
            }
            incoming.entry(successor).or_default().insert(node_id);
        }
    }

    incoming
}

/// Every predecessor of a scheduled node must itself be scheduled.
fn check_feed(graph: &Graph, incoming: &IndexMap<NodeId, IndexSet<NodeId>>) -> Result<()> {
    for &node_id in incoming.keys() {
        let Some(node) = graph.node(node_id) else {
            continue;
        };
        if let Some(&missing) = node
            .predecessors()
            .iter()
            .find(|pred| !incoming.contains_key(*pred))
        {
            tracing::warn!(node = %node_id, missing = %missing, "Feed does not reach predecessor");
            return Err(GraphError::IncompleteFeed {
                node: node_id,
                missing,
            });
        }
    }
    Ok(())
}
