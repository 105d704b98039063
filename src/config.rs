//! File-backed graph settings.
//!
//! ```toml
//! [graph]
//! lightweight_edges = true
//! auto_scale_edge_type = false
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::graph::GraphOptions;
use crate::types::{GraphError, Result};

/// Settings read from a TOML file.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GraphSettings {
    /// The `[graph]` table.
    pub graph: GraphSection,
}

/// Edge storage settings.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GraphSection {
    /// See [`GraphOptions::lightweight_edges`].
    pub lightweight_edges: bool,
    /// See [`GraphOptions::auto_scale_edge_type`].
    pub auto_scale_edge_type: bool,
}

impl GraphSettings {
    /// Parses settings from TOML text. Missing keys take their defaults.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Reads settings from `path`. A missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!(path = %path.display(), "settings file not found, using defaults");
            return Ok(Self::default());
        }
        let text = fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    /// Writes the settings to `path` as TOML.
    pub fn persist(&self, path: &Path) -> Result<()> {
        let text = toml::to_string_pretty(self).map_err(|err| GraphError::Config(err.to_string()))?;
        fs::write(path, text)?;
        Ok(())
    }

    /// Copies the settings onto `opts`.
    pub fn apply(&self, opts: GraphOptions) -> GraphOptions {
        opts.lightweight_edges(self.graph.lightweight_edges)
            .auto_scale_edge_type(self.graph.auto_scale_edge_type)
    }
}
