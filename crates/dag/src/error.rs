//! DAG-specific error types
//!
//! All errors are explicit, typed, and recoverable. A failed call always
//! leaves the graph in its last known-good state, except for incremental
//! imports (see [`crate::config::ImportMode::Incremental`]).

use thiserror::Error;

use crate::edge::{EdgeLabel, NodeId};

/// DAG-specific error types
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DagError {
    #[error("Node already exists: {0}")]
    DuplicateNode(NodeId),

    #[error("Node not found: {0}")]
    NodeNotFound(NodeId),

    #[error("Edge not found: {from} -> {to} (label: {label:?})")]
    EdgeNotFound {
        from: NodeId,
        to: NodeId,
        label: Option<EdgeLabel>,
    },

    #[error("Edge from {from} to {to} would create a cycle: {cycle:?}")]
    CycleDetected {
        from: NodeId,
        to: NodeId,
        /// Path the proposed edge would close, from `to` back to `from`
        cycle: Vec<NodeId>,
    },

    #[error("Graph is not acyclic: ordered {sorted} of {total} nodes")]
    CycleNotAcyclic { sorted: usize, total: usize },

    #[error("Invalid adjacency description: {reason}")]
    InvalidDescription { reason: String },

    #[error("JSON parse error: {reason}")]
    JsonParseFailed { reason: String },

    #[error("YAML parse error: {reason}")]
    YamlParseFailed { reason: String },

    #[error("TOML parse error: {reason}")]
    TomlParseFailed { reason: String },
}

impl DagError {
    pub fn duplicate_node(id: impl Into<NodeId>) -> Self {
        Self::DuplicateNode(id.into())
    }

    pub fn node_not_found(id: impl Into<NodeId>) -> Self {
        Self::NodeNotFound(id.into())
    }

    pub fn edge_not_found(
        from: impl Into<NodeId>,
        to: impl Into<NodeId>,
        label: Option<&str>,
    ) -> Self {
        Self::EdgeNotFound {
            from: from.into(),
            to: to.into(),
            label: label.map(str::to_string),
        }
    }

    pub fn cycle_detected(
        from: impl Into<NodeId>,
        to: impl Into<NodeId>,
        cycle: Vec<NodeId>,
    ) -> Self {
        Self::CycleDetected {
            from: from.into(),
            to: to.into(),
            cycle,
        }
    }

    #[must_use]
    pub const fn not_acyclic(sorted: usize, total: usize) -> Self {
        Self::CycleNotAcyclic { sorted, total }
    }

    pub fn invalid_description(reason: impl Into<String>) -> Self {
        Self::InvalidDescription {
            reason: reason.into(),
        }
    }

    pub fn json_parse_failed(reason: impl Into<String>) -> Self {
        Self::JsonParseFailed {
            reason: reason.into(),
        }
    }

    pub fn yaml_parse_failed(reason: impl Into<String>) -> Self {
        Self::YamlParseFailed {
            reason: reason.into(),
        }
    }

    pub fn toml_parse_failed(reason: impl Into<String>) -> Self {
        Self::TomlParseFailed {
            reason: reason.into(),
        }
    }

    /// Whether this error reports a cycle, either from edge insertion or from sorting
    #[must_use]
    pub const fn is_cycle(&self) -> bool {
        matches!(self, Self::CycleDetected { .. } | Self::CycleNotAcyclic { .. })
    }
}

/// Result type for DAG operations
pub type DagResult<T> = std::result::Result<T, DagError>;
