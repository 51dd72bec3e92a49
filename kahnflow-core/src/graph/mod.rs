//! Computation Graph
//!
//! This module implements the computation graph and the machinery that
//! evaluates it.
//!
//! # Overview
//!
//! The graph is a directed acyclic graph (DAG) where:
//!
//! - Nodes are source values or operators over other nodes
//! - Edges point from a node to the nodes that read it: if A reads B, there is
//!   an edge from B to A
//!
//! A pass starts from a feed of source values, discovers everything reachable
//! from those sources, orders it topologically, and computes each node once.
//!
//! # Design Decisions
//!
//! 1. Nodes live in a single arena owned by the [`Graph`] and refer to each
//!    other by [`NodeId`] only.
//!
//! 2. Each node keeps both its ordered predecessors (operator arguments) and
//!    its successor set (for forward discovery). Both are written in the same
//!    call that creates the node.
//!
//! 3. The operator set is a closed enum, [`Op`].

mod builder;
mod executor;
mod node;
mod scheduler;
mod shared;

pub use builder::Graph;
pub use executor::evaluate;
pub use node::{Node, NodeId, Op};
pub use scheduler::{Feed, Scheduler};
pub use shared::SharedGraph;
