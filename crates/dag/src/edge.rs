//! Node identifiers, edges, and edge descriptors.

use std::fmt;

use serde_json::Value;

use crate::error::{DagError, DagResult};

/// Type alias for a node identifier
pub type NodeId = String;

/// Type alias for an edge label
pub type EdgeLabel = String;

/// An outgoing edge: target node plus optional label.
///
/// Two edges between the same pair of nodes are distinct when their labels differ.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Edge {
    pub target: NodeId,
    pub label: Option<EdgeLabel>,
}

impl Edge {
    pub fn unlabeled(target: impl Into<NodeId>) -> Self {
        Self {
            target: target.into(),
            label: None,
        }
    }

    pub fn labeled(target: impl Into<NodeId>, label: impl Into<EdgeLabel>) -> Self {
        Self {
            target: target.into(),
            label: Some(label.into()),
        }
    }
}

impl fmt::Display for Edge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.label {
            Some(label) => write!(f, "{} ({label})", self.target),
            None => write!(f, "{}", self.target),
        }
    }
}

/// One entry in an adjacency list, resolved at parse time.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum EdgeSpec {
    Unlabeled(NodeId),
    Labeled(NodeId, EdgeLabel),
}

impl EdgeSpec {
    #[must_use]
    pub fn target(&self) -> &str {
        match self {
            Self::Unlabeled(target) | Self::Labeled(target, _) => target,
        }
    }

    #[must_use]
    pub fn label(&self) -> Option<&str> {
        match self {
            Self::Unlabeled(_) => None,
            Self::Labeled(_, label) => Some(label),
        }
    }

    /// Parse a descriptor: a bare target, or a `[target, label]` pair.
    ///
    /// A `null` label in a pair means the edge is unlabeled.
    ///
    /// # Errors
    ///
    /// Returns `InvalidDescription` for arrays whose length is not 2, for
    /// objects, for `null` targets, and for scalar targets when
    /// `coerce_scalars` is off.
    pub fn from_value(value: &Value, coerce_scalars: bool) -> DagResult<Self> {
        match value {
            Value::Array(pair) => match pair.as_slice() {
                [target, Value::Null] => Ok(Self::Unlabeled(scalar(target, coerce_scalars)?)),
                [target, label] => Ok(Self::Labeled(
                    scalar(target, coerce_scalars)?,
                    scalar(label, coerce_scalars)?,
                )),
                _ => Err(DagError::invalid_description(format!(
                    "{value} is not a pair in the form of [\"target\", \"label\"]"
                ))),
            },
            other => Ok(Self::Unlabeled(scalar(other, coerce_scalars)?)),
        }
    }
}

impl From<Edge> for EdgeSpec {
    fn from(edge: Edge) -> Self {
        match edge.label {
            Some(label) => Self::Labeled(edge.target, label),
            None => Self::Unlabeled(edge.target),
        }
    }
}

impl From<EdgeSpec> for Edge {
    fn from(spec: EdgeSpec) -> Self {
        match spec {
            EdgeSpec::Unlabeled(target) => Self::unlabeled(target),
            EdgeSpec::Labeled(target, label) => Self::labeled(target, label),
        }
    }
}

impl From<&str> for EdgeSpec {
    fn from(target: &str) -> Self {
        Self::Unlabeled(target.to_string())
    }
}

impl From<(&str, &str)> for EdgeSpec {
    fn from((target, label): (&str, &str)) -> Self {
        Self::Labeled(target.to_string(), label.to_string())
    }
}

fn scalar(value: &Value, coerce: bool) -> DagResult<String> {
    match value {
        Value::String(s) => Ok(s.clone()),
        Value::Number(_) | Value::Bool(_) if coerce => Ok(value.to_string()),
        other => Err(DagError::invalid_description(format!(
            "{other} is not a valid node identifier or label"
        ))),
    }
}
