//! Configuration for DAG construction and import.

use serde::{Deserialize, Serialize};

use crate::error::{DagError, DagResult};

/// How `import_*` applies an adjacency description.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImportMode {
    /// Parse the whole description and build a staged graph. The live graph is
    /// replaced only when every node and edge was accepted.
    #[default]
    Atomic,
    /// Reset, add every node, then add edges one descriptor at a time. A bad
    /// descriptor leaves the earlier nodes and edges in place.
    Incremental,
}

/// Configuration for a [`crate::Dag`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DagConfig {
    /// Import atomicity.
    #[serde(default)]
    pub import_mode: ImportMode,

    /// Accept bare numbers and booleans as edge targets, using their string form.
    #[serde(default = "default_coerce_scalar_targets")]
    pub coerce_scalar_targets: bool,
}

impl Default for DagConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl DagConfig {
    /// Create a new config with defaults.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            import_mode: ImportMode::Atomic,
            coerce_scalar_targets: true,
        }
    }

    #[must_use]
    pub const fn with_import_mode(mut self, import_mode: ImportMode) -> Self {
        self.import_mode = import_mode;
        self
    }

    #[must_use]
    pub const fn with_coerce_scalar_targets(mut self, coerce: bool) -> Self {
        self.coerce_scalar_targets = coerce;
        self
    }

    /// Load a config from TOML. Missing keys take their defaults.
    ///
    /// # Errors
    ///
    /// Returns `TomlParseFailed` for malformed TOML or unknown enum values.
    pub fn from_toml_str(input: &str) -> DagResult<Self> {
        toml::from_str(input).map_err(|e| DagError::toml_parse_failed(e.to_string()))
    }
}

const fn default_coerce_scalar_targets() -> bool {
    true
}
