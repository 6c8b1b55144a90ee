//! # dagkit
//!
//! In-memory directed acyclic graph with cycle-safe mutation, structural
//! queries, adjacency-description import, and topological ordering.
//!
//! ```
//! use dagkit::Dag;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut dag = Dag::new();
//! dag.import_json_str(r#"{"a": ["b", "c"], "b": ["d"], "c": ["b"], "d": []}"#)?;
//!
//! assert_eq!(dag.independent_nodes(), vec!["a"]);
//! assert_eq!(dag.all_downstreams("a", None)?, vec!["c", "b", "d"]);
//! assert_eq!(dag.leaves(), vec!["d"]);
//! assert!(dag.add_edge("d", "a", None).is_err());
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::panic)]
#![deny(clippy::expect_used)]

pub mod config;
pub mod description;
pub mod edge;
pub mod error;
pub mod graph;
pub mod sort;

pub use config::{DagConfig, ImportMode};
pub use description::AdjacencyDescription;
pub use edge::{Edge, EdgeLabel, EdgeSpec, NodeId};
pub use error::{DagError, DagResult};
pub use graph::Dag;
pub use sort::Validation;
