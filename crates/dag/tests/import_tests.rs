//! Adjacency description import tests (JSON, YAML, both import modes)

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

use dagkit::{AdjacencyDescription, Dag, DagConfig, DagError, DagResult, EdgeSpec, ImportMode};
use serde_json::json;

fn incremental() -> Dag {
    Dag::with_config(DagConfig::new().with_import_mode(ImportMode::Incremental))
}

#[test]
fn given_json_with_labeled_pairs_when_import_then_labels_kept() -> DagResult<()> {
    let mut dag = Dag::new();

    dag.import_json_str(r#"{"a": ["b", ["c", "runtime"]], "b": [["c", null]], "c": []}"#)?;

    assert_eq!(dag.downstream("a", Some("runtime"))?, vec!["c"]);
    assert_eq!(dag.downstream("a", None)?, vec!["b", "c"]);
    assert_eq!(dag.predecessors("c", None), vec!["a", "b"]);
    assert_eq!(dag.edge_count(), 3);
    Ok(())
}

#[test]
fn given_yaml_when_import_then_same_graph_as_json() -> DagResult<()> {
    let yaml = "a:\n  - b\n  - [c, runtime]\nb:\n  - c\nc: []\n";
    let json = r#"{"a": ["b", ["c", "runtime"]], "b": ["c"], "c": []}"#;

    let mut from_yaml = Dag::new();
    from_yaml.import_yaml_str(yaml)?;
    let mut from_json = Dag::new();
    from_json.import_json_str(json)?;

    assert_eq!(from_yaml, from_json);
    assert_eq!(from_yaml.nodes().collect::<Vec<_>>(), vec!["a", "b", "c"]);
    Ok(())
}

#[test]
fn given_numeric_targets_when_import_then_coerced_to_strings() -> DagResult<()> {
    let mut dag = Dag::new();

    dag.import_value(&json!({"1": [2], "2": []}))?;

    assert_eq!(dag.downstream("1", None)?, vec!["2"]);
    Ok(())
}

#[test]
fn given_coercion_disabled_when_numeric_target_then_invalid_description() {
    let mut dag = Dag::with_config(DagConfig::new().with_coerce_scalar_targets(false));

    let result = dag.import_value(&json!({"1": [2], "2": []}));

    assert!(matches!(result, Err(DagError::InvalidDescription { .. })));
    assert_eq!(dag.size(), 0);
}

#[test]
fn given_unlisted_target_when_import_then_node_not_found() {
    let mut dag = Dag::new();

    let result = dag.import_json_str(r#"{"a": ["zzz"]}"#);

    assert_eq!(result, Err(DagError::node_not_found("zzz")));
}

#[test]
fn given_malformed_input_when_import_then_parse_errors() {
    let mut dag = Dag::new();

    assert!(matches!(
        dag.import_json_str("{not json"),
        Err(DagError::JsonParseFailed { .. })
    ));
    assert!(matches!(
        dag.import_yaml_str("a: [b"),
        Err(DagError::YamlParseFailed { .. })
    ));
    assert!(matches!(
        dag.import_json_str(r#"["a", "b"]"#),
        Err(DagError::InvalidDescription { .. })
    ));
}

#[test]
fn given_atomic_mode_when_later_entry_malformed_then_nothing_applied() -> DagResult<()> {
    let mut dag = Dag::new();
    dag.import_json_str(r#"{"old": []}"#)?;

    let result = dag.import_value(&json!({"a": ["b"], "b": "not-a-list"}));

    assert!(matches!(result, Err(DagError::InvalidDescription { .. })));
    assert_eq!(dag.nodes().collect::<Vec<_>>(), vec!["old"]);
    Ok(())
}

#[test]
fn given_incremental_mode_when_later_entry_malformed_then_earlier_edges_kept() {
    let mut dag = incremental();

    let result = dag.import_value(&json!({"a": ["b"], "b": "not-a-list"}));

    assert!(matches!(result, Err(DagError::InvalidDescription { .. })));
    assert_eq!(dag.size(), 2);
    assert!(dag.downstream("a", None).is_ok_and(|d| d == vec!["b"]));
}

#[test]
fn given_incremental_mode_when_cycle_then_graph_still_validates() {
    let mut dag = incremental();

    let result = dag.import_json_str(r#"{"a": ["b"], "b": ["a"]}"#);

    assert!(matches!(result, Err(DagError::CycleDetected { .. })));
    // a -> b was applied before b -> a was rejected
    assert_eq!(dag.edge_count(), 1);
    assert!(dag.validate().is_valid());
}

#[test]
fn given_config_toml_when_loaded_then_drives_import_mode() -> DagResult<()> {
    let config = DagConfig::from_toml_str(
        "import_mode = \"incremental\"\ncoerce_scalar_targets = false\n",
    )?;
    assert_eq!(config.import_mode, ImportMode::Incremental);
    assert!(!config.coerce_scalar_targets);

    let mut dag = Dag::with_config(config);
    let result = dag.import_value(&json!({"a": ["b"], "b": [3]}));

    assert!(matches!(result, Err(DagError::InvalidDescription { .. })));
    assert_eq!(dag.edge_count(), 1);
    Ok(())
}

#[test]
fn given_description_parsed_separately_when_import_then_equivalent() -> DagResult<()> {
    let config = DagConfig::default();
    let parsed = AdjacencyDescription::from_json_str(r#"{"a": [["b", "x"]], "b": []}"#, &config)?;
    let built = AdjacencyDescription::new()
        .node("a", [EdgeSpec::from(("b", "x"))])
        .node("b", Vec::<EdgeSpec>::new());
    assert_eq!(parsed, built);

    let mut dag = Dag::new();
    dag.import_adjacency(&parsed)?;
    assert_eq!(dag.to_description(), built);
    Ok(())
}

#[test]
fn given_populated_dag_when_import_succeeds_then_previous_nodes_replaced() -> DagResult<()> {
    let mut dag = Dag::new();
    dag.add_node("stale")?;

    dag.import_json_str(r#"{"fresh": []}"#)?;

    assert!(!dag.contains_node("stale"));
    assert_eq!(dag.size(), 1);
    Ok(())
}
