//! Validation and topological sort (Kahn's algorithm)
//!
//! The sort runs over a [`SortView`]: the live arena plus, optionally, one
//! proposed edge that is not stored anywhere. `add_edge` validates that view
//! and commits only on success, so speculative checks never copy the graph.
//!
//! # Tie-break
//!
//! The ready queue is FIFO. Zero in-degree seeds enter in key insertion
//! order, and successors unblocked by the same node enter in key insertion
//! order too.

use std::collections::{HashMap, VecDeque};
use std::fmt;

use itertools::Itertools;
use petgraph::Direction;
use petgraph::stable_graph::{NodeIndex, StableDiGraph};

use crate::edge::{EdgeLabel, NodeId};
use crate::error::{DagError, DagResult};

/// Arena holding node ids as weights and optional labels on edges
pub(crate) type Arena = StableDiGraph<NodeId, Option<EdgeLabel>>;

/// Outcome of [`crate::Dag::validate`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Validation {
    Valid,
    /// A nonempty graph where every node has an incoming edge
    NoIndependentNodes,
    /// Kahn's algorithm could not order every node
    FailedTopologicalSort,
}

impl Validation {
    #[must_use]
    pub const fn is_valid(self) -> bool {
        matches!(self, Self::Valid)
    }

    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::Valid => "valid",
            Self::NoIndependentNodes => "no independent nodes detected",
            Self::FailedTopologicalSort => "failed topological sort",
        }
    }
}

impl fmt::Display for Validation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

/// Read-only view of an arena with an optional extra edge
#[derive(Debug, Clone, Copy)]
pub(crate) struct SortView<'a> {
    graph: &'a Arena,
    order: &'a [NodeIndex],
    proposed: Option<(NodeIndex, NodeIndex)>,
}

impl<'a> SortView<'a> {
    pub(crate) const fn new(graph: &'a Arena, order: &'a [NodeIndex]) -> Self {
        Self {
            graph,
            order,
            proposed: None,
        }
    }

    /// Same view, with `from -> to` treated as present
    pub(crate) const fn with_edge(self, from: NodeIndex, to: NodeIndex) -> Self {
        Self {
            proposed: Some((from, to)),
            ..self
        }
    }

    /// Direct successors, one entry per edge (parallel labeled edges repeat)
    fn successors(&self, node: NodeIndex) -> impl Iterator<Item = NodeIndex> + '_ {
        let extra = self
            .proposed
            .filter(|(from, _)| *from == node)
            .map(|(_, to)| to);
        self.graph
            .neighbors_directed(node, Direction::Outgoing)
            .chain(extra)
    }

    /// Count of edges targeting each node, across all labels
    fn in_degrees(&self) -> HashMap<NodeIndex, usize> {
        let mut in_degree: HashMap<NodeIndex, usize> =
            self.order.iter().map(|node| (*node, 0)).collect();
        for node in self.order {
            for successor in self.successors(*node) {
                if let Some(count) = in_degree.get_mut(&successor) {
                    *count = count.saturating_add(1);
                }
            }
        }
        in_degree
    }

    /// Nodes with no incoming edges, in key insertion order
    pub(crate) fn independent(&self) -> Vec<NodeIndex> {
        let in_degree = self.in_degrees();
        self.order
            .iter()
            .filter(|node| in_degree.get(node).copied() == Some(0))
            .copied()
            .collect()
    }

    /// Kahn's algorithm with a FIFO ready queue.
    ///
    /// # Errors
    ///
    /// Returns `CycleNotAcyclic` when fewer nodes were ordered than exist.
    pub(crate) fn kahn(&self) -> DagResult<Vec<NodeIndex>> {
        let rank: HashMap<NodeIndex, usize> = self
            .order
            .iter()
            .enumerate()
            .map(|(position, node)| (*node, position))
            .collect();
        let mut in_degree = self.in_degrees();
        let mut queue: VecDeque<NodeIndex> = self
            .order
            .iter()
            .filter(|node| in_degree.get(node).copied() == Some(0))
            .copied()
            .collect();

        let mut sorted = Vec::with_capacity(self.order.len());
        while let Some(node) = queue.pop_front() {
            sorted.push(node);

            let mut unblocked = Vec::new();
            for successor in self.successors(node) {
                match in_degree.get_mut(&successor) {
                    Some(count) if *count > 0 => {
                        *count = count.saturating_sub(1);
                        if *count == 0 {
                            unblocked.push(successor);
                        }
                    }
                    _ => {}
                }
            }
            queue.extend(
                unblocked
                    .into_iter()
                    .sorted_by_key(|n| rank.get(n).copied().unwrap_or(usize::MAX)),
            );
        }

        if sorted.len() == self.order.len() {
            Ok(sorted)
        } else {
            Err(DagError::not_acyclic(sorted.len(), self.order.len()))
        }
    }

    pub(crate) fn validate(&self) -> Validation {
        if !self.order.is_empty() && self.independent().is_empty() {
            return Validation::NoIndependentNodes;
        }
        match self.kahn() {
            Ok(_) => Validation::Valid,
            Err(_) => Validation::FailedTopologicalSort,
        }
    }
}
