//! Scheduler Configuration
//!
//! Knobs that change how a pass is scheduled without changing what it
//! computes. Configurations can be built in code or parsed from JSON.

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// How the scheduler picks the next node among several that are ready.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReadyOrder {
    /// Ready nodes live in a hash set. Ties are broken in no particular order
    /// and callers must not depend on it.
    #[default]
    Unordered,

    /// Ready nodes are queued first in, first out, starting from the feed's
    /// key order. The same graph and feed always give the same order.
    Fifo,
}

/// Configuration for a [`Scheduler`](crate::graph::Scheduler).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SchedulerConfig {
    /// Tie-breaking policy for the ready set.
    pub ready_order: ReadyOrder,

    /// Reject a feed up front when a scheduled node reads from a node the
    /// feed cannot reach. When off, the problem surfaces during evaluation.
    pub strict_feed: bool,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            ready_order: ReadyOrder::default(),
            strict_feed: true,
        }
    }
}

impl SchedulerConfig {
    /// Parse a configuration from JSON. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn with_ready_order(mut self, ready_order: ReadyOrder) -> Self {
        self.ready_order = ready_order;
        self
    }

    pub fn with_strict_feed(mut self, strict_feed: bool) -> Self {
        self.strict_feed = strict_feed;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GraphError;

    #[test]
    fn defaults_are_unordered_and_strict() {
        let config = SchedulerConfig::default();
        assert_eq!(config.ready_order, ReadyOrder::Unordered);
        assert!(config.strict_feed);
    }

    #[test]
    fn parse_partial_json() {
        let config = SchedulerConfig::from_json(r#"{"ready_order": "fifo"}"#).unwrap();
        assert_eq!(config.ready_order, ReadyOrder::Fifo);
        assert!(config.strict_feed);

        let config = SchedulerConfig::from_json("{}").unwrap();
        assert_eq!(config, SchedulerConfig::default());
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let err = SchedulerConfig::from_json(r#"{"parallel": true}"#).unwrap_err();
        assert!(matches!(err, GraphError::Config(_)));
    }

    #[test]
    fn builder_setters() {
        let config = SchedulerConfig::default()
            .with_ready_order(ReadyOrder::Fifo)
            .with_strict_feed(false);
        assert_eq!(config.ready_order, ReadyOrder::Fifo);
        assert!(!config.strict_feed);
    }
}
