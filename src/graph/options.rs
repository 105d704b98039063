use std::sync::Arc;

use crate::storage::{DocumentStore, MemoryStore, Schema, SchemaCatalog};

use super::metrics::GraphMetrics;

/// Configuration options supplied when opening a [`super::Graph`].
#[derive(Clone)]
pub struct GraphOptions {
    /// The document store backend to use
    pub store: Arc<dyn DocumentStore>,
    /// The schema catalog describing vertex and edge classes
    pub schema: Arc<dyn SchemaCatalog>,
    /// Whether property-less edges are stored as direct vertex references
    pub lightweight_edges: bool,
    /// Whether the first link in an unconstrained field is a single reference
    pub auto_scale_edge_type: bool,
    /// Optional metrics collection implementation
    pub metrics: Option<Arc<dyn GraphMetrics>>,
}

impl GraphOptions {
    /// Creates a new GraphOptions with default settings.
    pub fn new(store: Arc<dyn DocumentStore>, schema: Arc<dyn SchemaCatalog>) -> Self {
        Self {
            store,
            schema,
            lightweight_edges: false,
            auto_scale_edge_type: false,
            metrics: None,
        }
    }

    /// Options over a fresh [`MemoryStore`] and [`Schema`].
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStore::new()), Arc::new(Schema::new()))
    }

    /// Enables or disables lightweight edges.
    pub fn lightweight_edges(mut self, enabled: bool) -> Self {
        self.lightweight_edges = enabled;
        self
    }

    /// Enables or disables single-reference storage for first links.
    pub fn auto_scale_edge_type(mut self, enabled: bool) -> Self {
        self.auto_scale_edge_type = enabled;
        self
    }

    /// Sets the metrics collection implementation.
    pub fn metrics(mut self, metrics: Arc<dyn GraphMetrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }
}
