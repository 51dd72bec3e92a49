//! Shared Graph
//!
//! A [`Graph`] behind a graph-wide read-write lock, for callers that run
//! passes from more than one thread. A pass mutates every scheduled node, so
//! each [`run`](SharedGraph::run) holds the write lock from scheduling until
//! the output value is read. Readers never observe a half-finished pass.

use std::sync::Arc;

use parking_lot::RwLock;

use super::builder::Graph;
use super::node::NodeId;
use super::scheduler::{Feed, Scheduler};
use crate::error::Result;
use crate::numeric::Value;

/// Cloneable handle to a graph shared between threads.
#[derive(Debug, Clone, Default)]
pub struct SharedGraph {
    inner: Arc<RwLock<Graph>>,
}

impl SharedGraph {
    pub fn new(graph: Graph) -> Self {
        Self {
            inner: Arc::new(RwLock::new(graph)),
        }
    }

    /// Modify the graph under the write lock, e.g. to add nodes.
    pub fn build<R>(&self, f: impl FnOnce(&mut Graph) -> R) -> R {
        f(&mut self.inner.write())
    }

    /// Inspect the graph under the read lock.
    pub fn read<R>(&self, f: impl FnOnce(&Graph) -> R) -> R {
        f(&self.inner.read())
    }

    /// Run one full pass while holding the write lock.
    pub fn run(&self, scheduler: &Scheduler, feed: &Feed, output: NodeId) -> Result<Value> {
        let mut graph = self.inner.write();
        scheduler.run(&mut graph, feed, output)
    }

    /// A copy of a node's current value.
    pub fn value(&self, node_id: NodeId) -> Option<Value> {
        self.inner.read().value(node_id).cloned()
    }
}
