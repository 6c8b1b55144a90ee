//! # Dag
//!
//! Directed acyclic graph over string node ids, backed by petgraph's
//! `StableDiGraph` as an arena. Every successful mutation leaves the graph
//! acyclic; rejected edges never touch the arena.

use std::collections::{BTreeSet, HashMap, HashSet, VecDeque};
use std::fmt;

use itertools::Itertools;
use petgraph::Direction;
use petgraph::stable_graph::NodeIndex;
use petgraph::visit::EdgeRef;
use tracing::{debug, warn};

use crate::config::DagConfig;
use crate::edge::{Edge, EdgeLabel, NodeId};
use crate::error::{DagError, DagResult};
use crate::sort::{Arena, SortView, Validation};

/// Directed acyclic graph with optional edge labels
#[derive(Debug, Clone, Default)]
pub struct Dag {
    /// Node weights are ids, edge weights are labels
    graph: Arena,
    /// Map from NodeId to NodeIndex for O(1) lookups
    node_map: HashMap<NodeId, NodeIndex>,
    /// Key insertion order; arena slots are reused after removal
    order: Vec<NodeIndex>,
    config: DagConfig,
}

impl Dag {
    /// Create a new empty Dag
    ///
    /// # Examples
    ///
    /// ```
    /// use dagkit::Dag;
    ///
    /// let dag = Dag::new();
    /// assert_eq!(dag.size(), 0);
    /// ```
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_config(config: DagConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    #[must_use]
    pub const fn config(&self) -> &DagConfig {
        &self.config
    }

    // ------------------------------------------------------------------
    // Mutation
    // ------------------------------------------------------------------

    /// Add a node with no edges
    ///
    /// # Errors
    ///
    /// Returns `DuplicateNode` if the id is already present.
    ///
    /// # Examples
    ///
    /// ```
    /// use dagkit::Dag;
    ///
    /// let mut dag = Dag::new();
    /// assert!(dag.add_node("a").is_ok());
    /// assert!(dag.add_node("a").is_err());
    /// ```
    pub fn add_node(&mut self, id: impl Into<NodeId>) -> DagResult<()> {
        let id = id.into();
        if self.node_map.contains_key(&id) {
            return Err(DagError::duplicate_node(id));
        }

        let index = self.graph.add_node(id.clone());
        self.order.push(index);
        debug!(node = %id, "added node");
        self.node_map.insert(id, index);

        Ok(())
    }

    /// Add a node unless it exists. Returns whether it was inserted.
    pub fn add_node_if_not_exists(&mut self, id: impl Into<NodeId>) -> bool {
        self.add_node(id).is_ok()
    }

    /// Remove a node together with every edge into or out of it
    ///
    /// # Errors
    ///
    /// Returns `NodeNotFound` if the id is absent.
    pub fn delete_node(&mut self, id: &str) -> DagResult<()> {
        let index = self
            .node_map
            .remove(id)
            .ok_or_else(|| DagError::node_not_found(id))?;

        // StableGraph drops incident edges with the node
        self.graph.remove_node(index);
        self.order.retain(|n| *n != index);
        debug!(node = %id, "deleted node");

        Ok(())
    }

    /// Remove a node if present. Returns whether it was removed.
    pub fn delete_node_if_exists(&mut self, id: &str) -> bool {
        self.delete_node(id).is_ok()
    }

    /// Add `from -> to`, optionally labeled.
    ///
    /// The edge is proposed against the live arena, the proposal is validated,
    /// and only a valid proposal is committed. Adding an edge that is already
    /// present is a no-op.
    ///
    /// # Errors
    ///
    /// * `NodeNotFound` if either endpoint is absent
    /// * `CycleDetected` if the edge would close a cycle; the graph is unchanged
    ///
    /// # Examples
    ///
    /// ```
    /// use dagkit::Dag;
    ///
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// let mut dag = Dag::new();
    /// dag.add_node("a")?;
    /// dag.add_node("b")?;
    /// dag.add_edge("a", "b", None)?;
    /// assert!(dag.add_edge("b", "a", None).is_err());
    /// assert_eq!(dag.edge_count(), 1);
    /// # Ok(())
    /// # }
    /// ```
    pub fn add_edge(&mut self, from: &str, to: &str, label: Option<&str>) -> DagResult<()> {
        let from_index = self.index_of(from)?;
        let to_index = self.index_of(to)?;

        if self.find_edge(from_index, to_index, label).is_some() {
            debug!(from, to, ?label, "edge already present");
            return Ok(());
        }

        let proposal = self.view().with_edge(from_index, to_index);
        let validation = proposal.validate();
        if !validation.is_valid() {
            let cycle = self.path(to_index, from_index).unwrap_or_default();
            warn!(from, to, ?label, reason = %validation, "rejected edge that would create a cycle");
            return Err(DagError::cycle_detected(from, to, cycle));
        }

        self.graph
            .add_edge(from_index, to_index, label.map(str::to_string));
        debug!(from, to, ?label, "added edge");

        Ok(())
    }

    /// Remove the exact `from -> to` edge with `label` (`None` is the unlabeled edge)
    ///
    /// # Errors
    ///
    /// Returns `EdgeNotFound` if no such edge exists, including when `from` is absent.
    pub fn delete_edge(&mut self, from: &str, to: &str, label: Option<&str>) -> DagResult<()> {
        let edge = match (self.node_map.get(from), self.node_map.get(to)) {
            (Some(a), Some(b)) => self.find_edge(*a, *b, label),
            _ => None,
        }
        .ok_or_else(|| DagError::edge_not_found(from, to, label))?;

        self.graph.remove_edge(edge);
        debug!(from, to, ?label, "deleted edge");

        Ok(())
    }

    /// Remove an edge if present. Returns whether it was removed.
    pub fn delete_edge_if_exists(&mut self, from: &str, to: &str, label: Option<&str>) -> bool {
        self.delete_edge(from, to, label).is_ok()
    }

    /// Rename a node in place.
    ///
    /// Outgoing edges stay with the node and every incoming edge keeps its
    /// label. The node keeps its position in the key order. Renaming an
    /// absent node, or a node to itself, does nothing.
    ///
    /// # Errors
    ///
    /// Returns `DuplicateNode` if `new_id` already names another node.
    pub fn rename_node(&mut self, old_id: &str, new_id: impl Into<NodeId>) -> DagResult<()> {
        let new_id = new_id.into();
        if old_id == new_id {
            return Ok(());
        }
        let Some(index) = self.node_map.get(old_id).copied() else {
            return Ok(());
        };
        if self.node_map.contains_key(&new_id) {
            return Err(DagError::duplicate_node(new_id));
        }

        self.node_map.remove(old_id);
        if let Some(weight) = self.graph.node_weight_mut(index) {
            weight.clone_from(&new_id);
        }
        debug!(from = old_id, to = %new_id, "renamed node");
        self.node_map.insert(new_id, index);

        Ok(())
    }

    /// Drop every node and edge. The config is kept.
    pub fn reset(&mut self) {
        self.graph.clear();
        self.node_map.clear();
        self.order.clear();
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    /// Number of nodes
    #[must_use]
    pub fn size(&self) -> usize {
        self.order.len()
    }

    /// Number of edges, counting each label separately
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    #[must_use]
    pub fn contains_node(&self, id: &str) -> bool {
        self.node_map.contains_key(id)
    }

    /// Node ids in key insertion order
    pub fn nodes(&self) -> impl Iterator<Item = &NodeId> {
        self.order
            .iter()
            .filter_map(|index| self.graph.node_weight(*index))
    }

    /// Every edge as `(from, to, label)`, grouped by source in key order
    pub fn edges(&self) -> impl Iterator<Item = (&NodeId, &NodeId, Option<&EdgeLabel>)> {
        self.order.iter().flat_map(move |index| {
            self.graph.edges(*index).filter_map(move |edge| {
                let from = self.graph.node_weight(edge.source())?;
                let to = self.graph.node_weight(edge.target())?;
                Some((from, to, edge.weight().as_ref()))
            })
        })
    }

    /// Outgoing edges of `id`
    ///
    /// # Errors
    ///
    /// Returns `NodeNotFound` if the id is absent.
    pub fn outgoing(&self, id: &str) -> DagResult<BTreeSet<Edge>> {
        let index = self.index_of(id)?;
        Ok(self
            .graph
            .edges(index)
            .filter_map(|edge| {
                let target = self.graph.node_weight(edge.target())?;
                Some(Edge {
                    target: target.clone(),
                    label: edge.weight().clone(),
                })
            })
            .collect())
    }

    /// Nodes that no edge points at, in key insertion order
    #[must_use]
    pub fn independent_nodes(&self) -> Vec<NodeId> {
        self.names(self.view().independent())
    }

    /// Nodes with no outgoing edges, in key insertion order
    #[must_use]
    pub fn leaves(&self) -> Vec<NodeId> {
        self.order
            .iter()
            .filter(|index| {
                self.graph
                    .neighbors_directed(**index, Direction::Outgoing)
                    .next()
                    .is_none()
            })
            .filter_map(|index| self.graph.node_weight(*index).cloned())
            .collect()
    }

    /// Distinct direct targets of `id`, in key insertion order.
    ///
    /// With `Some(label)`, only edges carrying exactly that label are followed.
    ///
    /// # Errors
    ///
    /// Returns `NodeNotFound` if the id is absent.
    pub fn downstream(&self, id: &str, label: Option<&str>) -> DagResult<Vec<NodeId>> {
        let index = self.index_of(id)?;
        let targets: HashSet<NodeIndex> = self.follow(index, label).collect();
        Ok(self.names(self.in_key_order(&targets)))
    }

    /// Nodes with at least one edge into `id`, in key insertion order.
    ///
    /// An absent id has no predecessors; this returns an empty list rather
    /// than `NodeNotFound`.
    #[must_use]
    pub fn predecessors(&self, id: &str, label: Option<&str>) -> Vec<NodeId> {
        let Some(index) = self.node_map.get(id).copied() else {
            return Vec::new();
        };
        let sources: HashSet<NodeIndex> = self
            .graph
            .edges_directed(index, Direction::Incoming)
            .filter(|edge| label_matches(edge.weight().as_deref(), label))
            .map(|edge| edge.source())
            .collect();
        self.names(self.in_key_order(&sources))
    }

    /// Every node reachable from `id`, excluding `id`, in topological order
    ///
    /// # Errors
    ///
    /// Returns `NodeNotFound` if the id is absent.
    pub fn all_downstreams(&self, id: &str, label: Option<&str>) -> DagResult<Vec<NodeId>> {
        let start = self.index_of(id)?;

        let mut seen: HashSet<NodeIndex> = HashSet::new();
        let mut queue: VecDeque<NodeIndex> = VecDeque::from([start]);
        while let Some(current) = queue.pop_front() {
            for next in self.follow(current, label) {
                if seen.insert(next) {
                    queue.push_back(next);
                }
            }
        }

        let sorted = self.view().kahn()?;
        Ok(self.names(sorted.into_iter().filter(|index| seen.contains(index))))
    }

    // ------------------------------------------------------------------
    // Validation
    // ------------------------------------------------------------------

    /// Check acyclicity without mutating the graph
    #[must_use]
    pub fn validate(&self) -> Validation {
        self.view().validate()
    }

    /// Linear order of all nodes where every edge points forward
    ///
    /// # Errors
    ///
    /// Returns `CycleNotAcyclic` if the nodes cannot all be ordered.
    ///
    /// # Examples
    ///
    /// ```
    /// use dagkit::Dag;
    ///
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// let mut dag = Dag::new();
    /// for id in ["a", "b", "c"] {
    ///     dag.add_node(id)?;
    /// }
    /// dag.add_edge("b", "a", None)?;
    /// dag.add_edge("c", "b", None)?;
    /// assert_eq!(dag.topological_sort()?, vec!["c", "b", "a"]);
    /// # Ok(())
    /// # }
    /// ```
    pub fn topological_sort(&self) -> DagResult<Vec<NodeId>> {
        let sorted = self.view().kahn()?;
        Ok(self.names(sorted))
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    fn view(&self) -> SortView<'_> {
        SortView::new(&self.graph, &self.order)
    }

    fn index_of(&self, id: &str) -> DagResult<NodeIndex> {
        self.node_map
            .get(id)
            .copied()
            .ok_or_else(|| DagError::node_not_found(id))
    }

    fn find_edge(
        &self,
        from: NodeIndex,
        to: NodeIndex,
        label: Option<&str>,
    ) -> Option<petgraph::stable_graph::EdgeIndex> {
        self.graph
            .edges(from)
            .find(|edge| edge.target() == to && edge.weight().as_deref() == label)
            .map(|edge| edge.id())
    }

    /// Targets of `from`, through edges matching the label filter
    fn follow(&self, from: NodeIndex, label: Option<&str>) -> impl Iterator<Item = NodeIndex> {
        self.graph
            .edges(from)
            .filter(move |edge| label_matches(edge.weight().as_deref(), label))
            .map(|edge| edge.target())
    }

    fn in_key_order(&self, set: &HashSet<NodeIndex>) -> Vec<NodeIndex> {
        self.order
            .iter()
            .filter(|index| set.contains(index))
            .copied()
            .collect()
    }

    fn names(&self, indices: impl IntoIterator<Item = NodeIndex>) -> Vec<NodeId> {
        indices
            .into_iter()
            .filter_map(|index| self.graph.node_weight(index).cloned())
            .collect()
    }

    /// Shortest path from `start` to `goal` (BFS), both ends included
    fn path(&self, start: NodeIndex, goal: NodeIndex) -> Option<Vec<NodeId>> {
        let mut parent: HashMap<NodeIndex, NodeIndex> = HashMap::new();
        let mut queue: VecDeque<NodeIndex> = VecDeque::from([start]);
        let mut visited: HashSet<NodeIndex> = HashSet::from([start]);

        while let Some(current) = queue.pop_front() {
            if current == goal {
                let mut path = vec![current];
                let mut cursor = current;
                while let Some(previous) = parent.get(&cursor).copied() {
                    path.push(previous);
                    cursor = previous;
                }
                path.reverse();
                return Some(self.names(path));
            }
            for next in self.graph.neighbors_directed(current, Direction::Outgoing) {
                if visited.insert(next) {
                    parent.insert(next, current);
                    queue.push_back(next);
                }
            }
        }

        None
    }
}

/// `None` as a filter accepts every edge
fn label_matches(edge_label: Option<&str>, filter: Option<&str>) -> bool {
    filter.is_none_or(|wanted| edge_label == Some(wanted))
}

impl PartialEq for Dag {
    /// Same nodes in the same key order, with the same outgoing edge sets
    fn eq(&self, other: &Self) -> bool {
        self.nodes().eq(other.nodes())
            && self
                .nodes()
                .all(|id| self.outgoing(id).ok() == other.outgoing(id).ok())
    }
}

impl Eq for Dag {}

impl fmt::Display for Dag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let body = self
            .nodes()
            .map(|id| {
                let edges = self.outgoing(id).unwrap_or_default();
                format!("{id}: [{}]", edges.iter().join(", "))
            })
            .join(", ");
        write!(f, "Dag{{{body}}}")
    }
}
