//! Turns adjacency entries into edge and neighbor values.

use tracing::{debug, warn};

use crate::graph::element::record_endpoint;
use crate::graph::{Edge, GraphMetrics, Neighbor, Vertex};
use crate::storage::{Document, DocumentStore, SchemaCatalog};
use crate::types::{GraphError, RecordId, Result};

use super::codec::Direction;
use super::cursor::AdjacencyEntry;

/// Resolves the references an [`super::AdjacencyCursor`] yields.
///
/// A reference to a vertex is a lightweight edge; a reference to an edge
/// record is a record-backed edge. Anything else reachable from an adjacency
/// field is [`GraphError::InvalidAdjacency`].
pub struct Materializer<'a> {
    store: &'a dyn DocumentStore,
    catalog: &'a dyn SchemaCatalog,
    metrics: &'a dyn GraphMetrics,
}

impl<'a> Materializer<'a> {
    /// Creates a materializer over the given collaborators.
    pub fn new(
        store: &'a dyn DocumentStore,
        catalog: &'a dyn SchemaCatalog,
        metrics: &'a dyn GraphMetrics,
    ) -> Self {
        Self {
            store,
            catalog,
            metrics,
        }
    }

    /// Builds the edge for `entry`, found on `source`.
    ///
    /// Returns `Ok(None)` when the reference is stale or when `target` is set
    /// and the edge's opposite endpoint is a different vertex.
    pub fn edge(
        &self,
        source: &Document,
        entry: &AdjacencyEntry<'_>,
        target: Option<RecordId>,
    ) -> Result<Option<Edge>> {
        let Some(backing) = self.resolve(entry)? else {
            return Ok(None);
        };
        let class = backing.class_name();
        let direction = entry.connection.direction;

        if self.catalog.is_vertex_type(class) {
            if target.is_some_and(|t| t != backing.id()) {
                return Ok(None);
            }
            let (out, in_) = match direction {
                Direction::In => (backing.id(), source.id()),
                _ => (source.id(), backing.id()),
            };
            return Ok(Some(Edge::lightweight(
                out,
                in_,
                entry.connection.label.clone(),
            )));
        }

        if self.catalog.is_edge_type(class) {
            if let Some(t) = target {
                let opposite = record_endpoint(&backing, direction.opposite());
                if opposite != Some(t) {
                    return Ok(None);
                }
            }
            return Edge::from_record(backing).map(Some);
        }

        Err(invalid_adjacency(entry, &backing))
    }

    /// Resolves the vertex on the far side of `entry`.
    ///
    /// For an edge record the opposite endpoint is followed. If it cannot be
    /// read, the edge record is reloaded once; if it still cannot be read the
    /// result is [`Neighbor::Unavailable`].
    pub fn vertex(&self, entry: &AdjacencyEntry<'_>) -> Result<Option<Neighbor>> {
        let Some(backing) = self.resolve(entry)? else {
            return Ok(None);
        };
        let class = backing.class_name();

        if self.catalog.is_vertex_type(class) {
            return Ok(Some(Neighbor::Vertex(Vertex::from_document(backing))));
        }

        if self.catalog.is_edge_type(class) {
            let side = entry.connection.direction.opposite();
            if let Some(vertex) = self.endpoint(&backing, side)? {
                return Ok(Some(Neighbor::Vertex(vertex)));
            }
            debug!(edge = %backing.id(), side = side.as_str(), "reloading edge record");
            let reloaded = self.store.load(&backing.id())?;
            if let Some(edge) = reloaded {
                if let Some(vertex) = self.endpoint(&edge, side)? {
                    return Ok(Some(Neighbor::Vertex(vertex)));
                }
            }
            warn!(
                edge = %backing.id(),
                side = side.as_str(),
                "edge endpoint unavailable after reload"
            );
            self.metrics.endpoint_unavailable();
            return Ok(Some(Neighbor::Unavailable {
                edge: backing.id(),
                direction: side,
            }));
        }

        Err(invalid_adjacency(entry, &backing))
    }

    fn resolve(&self, entry: &AdjacencyEntry<'_>) -> Result<Option<Document>> {
        match self.store.load(&entry.target)? {
            Some(doc) => Ok(Some(doc)),
            None => {
                warn!(field = entry.field, target = %entry.target, "skipping stale adjacency reference");
                self.metrics.stale_reference();
                Ok(None)
            }
        }
    }

    fn endpoint(&self, edge: &Document, side: Direction) -> Result<Option<Vertex>> {
        let Some(id) = record_endpoint(edge, side) else {
            return Ok(None);
        };
        let Some(doc) = self.store.load(&id)? else {
            return Ok(None);
        };
        if !self.catalog.is_vertex_type(doc.class_name()) {
            return Err(GraphError::InvalidAdjacency {
                field: side.as_str().to_string(),
                record: id,
                class: doc.class_name().to_string(),
            });
        }
        Ok(Some(Vertex::from_document(doc)))
    }
}

fn invalid_adjacency(entry: &AdjacencyEntry<'_>, backing: &Document) -> GraphError {
    GraphError::InvalidAdjacency {
        field: entry.field.to_string(),
        record: backing.id(),
        class: backing.class_name().to_string(),
    }
}
