//! Kahnflow Core
//!
//! Small typed computation graphs evaluated in dependency order. Values are
//! fed into source nodes, propagate through operator nodes, and are read back
//! from any node the caller picks as output.
//!
//! # Architecture
//!
//! - `graph`: nodes, graph construction, scheduling, and forward evaluation
//! - `numeric`: the values carried along edges and the arithmetic on them
//! - `config`: scheduler configuration
//! - `error`: the crate error type
//!
//! # Example
//!
//! ```rust
//! use kahnflow_core::{run, Feed, Graph, Value};
//!
//! let mut graph = Graph::new();
//! let x = graph.input();
//! let y = graph.input();
//! let sum = graph.add(&[x, y]).unwrap();
//!
//! let feed: Feed = [(x, Value::from(10.0)), (y, Value::from(5.0))]
//!     .into_iter()
//!     .collect();
//! assert_eq!(run(&mut graph, &feed, sum).unwrap(), Value::Scalar(15.0));
//! ```

pub mod config;
pub mod error;
pub mod graph;
pub mod numeric;

pub use config::{ReadyOrder, SchedulerConfig};
pub use error::{GraphError, Result};
pub use graph::{evaluate, Feed, Graph, Node, NodeId, Op, Scheduler, SharedGraph};
pub use numeric::{NumericError, Value};

/// Run one forward pass with the default scheduler configuration.
///
/// Schedules everything reachable from `feed`, computes it, and returns the
/// value of `output`.
pub fn run(graph: &mut Graph, feed: &Feed, output: NodeId) -> Result<Value> {
    Scheduler::default().run(graph, feed, output)
}
