//! Adjacency descriptions: `{node: [edge, ...]}` import and export
//!
//! A description lists every node once, each with the edges leaving it.
//! Edges are bare targets or `[target, label]` pairs:
//!
//! ```json
//! {"a": ["b", ["c", "runtime"]], "b": [], "c": []}
//! ```

use serde_json::{Map, Value};
use tracing::debug;

use crate::config::{DagConfig, ImportMode};
use crate::edge::{EdgeSpec, NodeId};
use crate::error::{DagError, DagResult};
use crate::graph::Dag;

/// Ordered adjacency description
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AdjacencyDescription {
    entries: Vec<(NodeId, Vec<EdgeSpec>)>,
}

impl AdjacencyDescription {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a node and its outgoing edges
    #[must_use]
    pub fn node<I, E>(mut self, id: impl Into<NodeId>, edges: I) -> Self
    where
        I: IntoIterator<Item = E>,
        E: Into<EdgeSpec>,
    {
        self.entries
            .push((id.into(), edges.into_iter().map(Into::into).collect()));
        self
    }

    #[must_use]
    pub fn entries(&self) -> &[(NodeId, Vec<EdgeSpec>)] {
        &self.entries
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Parse a whole description up front.
    ///
    /// # Errors
    ///
    /// Returns `InvalidDescription` if the top level is not an object, a
    /// value is not an array, or any descriptor is malformed.
    pub fn from_value(value: &Value, config: &DagConfig) -> DagResult<Self> {
        let entries = as_object(value)?
            .iter()
            .map(|(id, edges)| -> DagResult<(NodeId, Vec<EdgeSpec>)> {
                let specs = as_list(id, edges)?
                    .iter()
                    .map(|edge| EdgeSpec::from_value(edge, config.coerce_scalar_targets))
                    .collect::<DagResult<Vec<_>>>()?;
                Ok((id.clone(), specs))
            })
            .collect::<DagResult<Vec<_>>>()?;
        Ok(Self { entries })
    }

    /// # Errors
    ///
    /// Returns `JsonParseFailed` for malformed JSON, then as [`Self::from_value`].
    pub fn from_json_str(input: &str, config: &DagConfig) -> DagResult<Self> {
        Self::from_value(&parse_json(input)?, config)
    }

    /// # Errors
    ///
    /// Returns `YamlParseFailed` for malformed YAML, then as [`Self::from_value`].
    pub fn from_yaml_str(input: &str, config: &DagConfig) -> DagResult<Self> {
        Self::from_value(&parse_yaml(input)?, config)
    }
}

impl Dag {
    /// Replace the graph with the one described.
    ///
    /// In [`ImportMode::Atomic`] the description is built into a staged graph
    /// that replaces this one only on success. In [`ImportMode::Incremental`]
    /// the graph is reset first and edges are applied in order, so a failure
    /// leaves a partial graph behind.
    ///
    /// # Errors
    ///
    /// * `DuplicateNode` if a node is listed twice
    /// * `NodeNotFound` if an edge targets an unlisted node
    /// * `CycleDetected` if the edges form a cycle
    pub fn import_adjacency(&mut self, description: &AdjacencyDescription) -> DagResult<()> {
        match self.config().import_mode {
            ImportMode::Atomic => {
                let mut staged = Self::with_config(self.config().clone());
                staged.apply(description)?;
                *self = staged;
            }
            ImportMode::Incremental => {
                self.reset();
                self.apply(description)?;
            }
        }
        debug!(nodes = self.size(), edges = self.edge_count(), "imported adjacency description");
        Ok(())
    }

    /// Import a raw description.
    ///
    /// Atomic mode parses everything before touching the graph. Incremental
    /// mode checks each list and descriptor only when it reaches it.
    ///
    /// # Errors
    ///
    /// `InvalidDescription` for malformed shapes, otherwise as
    /// [`Self::import_adjacency`].
    pub fn import_value(&mut self, value: &Value) -> DagResult<()> {
        match self.config().import_mode {
            ImportMode::Atomic => {
                let description = AdjacencyDescription::from_value(value, self.config())?;
                self.import_adjacency(&description)
            }
            ImportMode::Incremental => self.import_value_incrementally(value),
        }
    }

    /// # Errors
    ///
    /// `JsonParseFailed` for malformed JSON, otherwise as [`Self::import_value`].
    pub fn import_json_str(&mut self, input: &str) -> DagResult<()> {
        self.import_value(&parse_json(input)?)
    }

    /// # Errors
    ///
    /// `YamlParseFailed` for malformed YAML, otherwise as [`Self::import_value`].
    pub fn import_yaml_str(&mut self, input: &str) -> DagResult<()> {
        self.import_value(&parse_yaml(input)?)
    }

    /// Describe this graph: nodes in key order, edges sorted by target then label
    #[must_use]
    pub fn to_description(&self) -> AdjacencyDescription {
        let entries = self
            .nodes()
            .map(|id| {
                let specs = self
                    .outgoing(id)
                    .unwrap_or_default()
                    .into_iter()
                    .map(EdgeSpec::from)
                    .collect();
                (id.clone(), specs)
            })
            .collect();
        AdjacencyDescription { entries }
    }

    fn apply(&mut self, description: &AdjacencyDescription) -> DagResult<()> {
        for (id, _) in description.entries() {
            self.add_node(id.as_str())?;
        }
        for (id, specs) in description.entries() {
            for spec in specs {
                self.add_edge(id, spec.target(), spec.label())?;
            }
        }
        Ok(())
    }

    fn import_value_incrementally(&mut self, value: &Value) -> DagResult<()> {
        let object = as_object(value)?;
        let coerce = self.config().coerce_scalar_targets;

        self.reset();
        for id in object.keys() {
            self.add_node(id.as_str())?;
        }
        for (id, edges) in object {
            for edge in as_list(id, edges)? {
                let spec = EdgeSpec::from_value(edge, coerce)?;
                self.add_edge(id, spec.target(), spec.label())?;
            }
        }
        debug!(nodes = self.size(), edges = self.edge_count(), "imported adjacency description");
        Ok(())
    }
}

fn as_object(value: &Value) -> DagResult<&Map<String, Value>> {
    value
        .as_object()
        .ok_or_else(|| DagError::invalid_description("top level must map node ids to lists"))
}

fn as_list<'a>(id: &str, value: &'a Value) -> DagResult<&'a Vec<Value>> {
    value
        .as_array()
        .ok_or_else(|| DagError::invalid_description(format!("edges of {id} must be a list")))
}

fn parse_json(input: &str) -> DagResult<Value> {
    serde_json::from_str(input).map_err(|e| DagError::json_parse_failed(e.to_string()))
}

fn parse_yaml(input: &str) -> DagResult<Value> {
    serde_yaml::from_str(input).map_err(|e| DagError::yaml_parse_failed(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_builder_and_entries() {
        let description = AdjacencyDescription::new()
            .node("a", ["b"])
            .node("b", Vec::<EdgeSpec>::new());
        assert_eq!(description.len(), 2);
        assert_eq!(
            description.entries().first(),
            Some(&("a".to_string(), vec![EdgeSpec::Unlabeled("b".to_string())]))
        );
    }

    #[test]
    fn test_from_value_keeps_key_order() -> DagResult<()> {
        let value = json!({"z": ["y"], "y": [["x", "tag"]], "x": []});
        let description = AdjacencyDescription::from_value(&value, &DagConfig::default())?;
        let ids: Vec<&str> = description
            .entries()
            .iter()
            .map(|(id, _)| id.as_str())
            .collect();
        assert_eq!(ids, vec!["z", "y", "x"]);
        Ok(())
    }

    #[test]
    fn test_from_value_rejects_non_list_value() {
        let value = json!({"a": "b"});
        let result = AdjacencyDescription::from_value(&value, &DagConfig::default());
        assert!(matches!(result, Err(DagError::InvalidDescription { .. })));
    }

    #[test]
    fn test_from_value_rejects_non_object() {
        let result = AdjacencyDescription::from_value(&json!(["a"]), &DagConfig::default());
        assert!(matches!(result, Err(DagError::InvalidDescription { .. })));
    }

    #[test]
    fn test_import_then_describe() -> DagResult<()> {
        let description = AdjacencyDescription::new()
            .node("a", [EdgeSpec::from("c"), EdgeSpec::from(("b", "x"))])
            .node("b", ["c"])
            .node("c", Vec::<EdgeSpec>::new());
        let mut dag = Dag::new();
        dag.import_adjacency(&description)?;

        let expected = AdjacencyDescription::new()
            .node("a", [EdgeSpec::from(("b", "x")), EdgeSpec::from("c")])
            .node("b", ["c"])
            .node("c", Vec::<EdgeSpec>::new());
        assert_eq!(dag.to_description(), expected);
        Ok(())
    }

    #[test]
    fn test_atomic_import_keeps_previous_graph_on_failure() -> DagResult<()> {
        let mut dag = Dag::new();
        dag.add_node("keep")?;
        let before = dag.clone();

        let result = dag.import_value(&json!({"a": ["b"], "b": ["a"]}));
        assert!(matches!(result, Err(DagError::CycleDetected { .. })));
        assert_eq!(dag, before);
        Ok(())
    }

    #[test]
    fn test_incremental_import_leaves_partial_graph() {
        let config = DagConfig::new().with_import_mode(ImportMode::Incremental);
        let mut dag = Dag::with_config(config);

        let result = dag.import_value(&json!({"a": ["b"], "b": [["a", "x", "y"]]}));
        assert!(matches!(result, Err(DagError::InvalidDescription { .. })));
        assert_eq!(dag.size(), 2);
        assert_eq!(dag.edge_count(), 1);
        assert!(dag.validate().is_valid());
    }
}
