//! Graph session over a document store.
//!
//! [`Graph`] is a thin layer: vertices and edges are documents, and every
//! connection is written through the [`crate::adjacency`] core. Traversals
//! read from the [`Vertex`] snapshot they are given; fetch a fresh one with
//! [`Graph::vertex`] after writing edges.

pub(crate) mod element;
/// Metrics hooks for adjacency operations.
pub mod metrics;
mod options;
mod traverse;
/// Adjacency symmetry checks.
pub mod verify;

use std::sync::Arc;

use tracing::debug;

use crate::adjacency::{
    attach_link, edge_class_name, field_name, is_adjacency_field, label_of_class,
    vertex_class_name, AdjacencyCursor, AttachOpts, Direction, LabelFilter, LinkChange,
    Materializer, IN_FIELD, OUT_FIELD,
};
use crate::storage::{
    Document, DocumentStore, FieldType, FieldValue, SchemaCatalog, EDGE_CLASS, VERTEX_CLASS,
};
use crate::types::{GraphError, RecordId, Result};

pub use element::{Edge, Neighbor, Vertex};
pub use metrics::{default_metrics, CounterMetrics, GraphMetrics, NoopMetrics};
pub use options::GraphOptions;
pub use traverse::{Edges, Vertices};
pub use verify::{VerifyFinding, VerifyReport, VerifySeverity};

/// Label list matching every label.
pub const ANY_LABEL: &[&str] = &[];

/// A property graph stored as documents.
pub struct Graph {
    store: Arc<dyn DocumentStore>,
    schema: Arc<dyn SchemaCatalog>,
    metrics: Arc<dyn GraphMetrics>,
    lightweight_edges: bool,
    auto_scale_edge_type: bool,
}

impl Graph {
    /// Opens a graph, creating the `V` and `E` base classes when missing.
    pub fn open(opts: GraphOptions) -> Result<Self> {
        opts.schema.create_class(VERTEX_CLASS, None)?;
        opts.schema.create_class(EDGE_CLASS, None)?;
        Ok(Self {
            store: opts.store,
            schema: opts.schema,
            metrics: opts.metrics.unwrap_or_else(default_metrics),
            lightweight_edges: opts.lightweight_edges,
            auto_scale_edge_type: opts.auto_scale_edge_type,
        })
    }

    /// Opens a graph over a fresh in-memory store and schema.
    pub fn in_memory() -> Result<Self> {
        Self::open(GraphOptions::in_memory())
    }

    /// The document store backing the graph.
    pub fn store(&self) -> &dyn DocumentStore {
        &*self.store
    }

    /// The schema catalog backing the graph.
    pub fn schema(&self) -> &dyn SchemaCatalog {
        &*self.schema
    }

    /// Whether property-less edges are stored without a record.
    pub fn uses_lightweight_edges(&self) -> bool {
        self.lightweight_edges
    }

    /// Creates a vertex without properties.
    pub fn add_vertex(&self, label: Option<&str>) -> Result<Vertex> {
        self.add_vertex_with(label, std::iter::empty::<(&str, FieldValue)>())
    }

    /// Creates a vertex in the class for `label` (the base class `V` when
    /// `None`) and saves it with `props`.
    pub fn add_vertex_with<I, K, V>(&self, label: Option<&str>, props: I) -> Result<Vertex>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<FieldValue>,
    {
        let class = vertex_class_name(label.filter(|l| !l.is_empty()));
        self.ensure_class(&class, VERTEX_CLASS)?;
        let mut doc = self.store.create(&class)?;
        for (key, value) in props {
            let key = key.as_ref();
            check_vertex_key(key)?;
            doc.set(key, value.into());
        }
        self.store.save(&doc)?;
        self.metrics.vertex_created();
        debug!(vertex = %doc.id(), class = %class, "created vertex");
        Ok(Vertex::from_document(doc))
    }

    /// Creates an edge without properties.
    pub fn add_edge(&self, out: RecordId, label: &str, in_: RecordId) -> Result<Edge> {
        self.add_edge_with(out, label, in_, std::iter::empty::<(&str, FieldValue)>())
    }

    /// Creates an edge `out -label-> in_`.
    ///
    /// With lightweight edges enabled and no properties, each endpoint stores
    /// a direct reference to the other. Otherwise an edge record is created
    /// and both endpoints reference it. Endpoints are mutated in memory first,
    /// then the edge record, the in-vertex and the out-vertex are saved in
    /// that order. The saves are not atomic: a store failure part way leaves
    /// one-sided adjacency that [`Graph::verify_vertex`] reports.
    pub fn add_edge_with<I, K, V>(
        &self,
        out: RecordId,
        label: &str,
        in_: RecordId,
        props: I,
    ) -> Result<Edge>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<FieldValue>,
    {
        if label.is_empty() {
            return Err(GraphError::InvalidArgument(
                "edge label must not be empty".into(),
            ));
        }
        let props = props
            .into_iter()
            .map(|(k, v)| {
                let key = k.as_ref();
                check_edge_key(key)?;
                Ok((key.to_string(), v.into()))
            })
            .collect::<Result<Vec<(String, FieldValue)>>>()?;

        let mut out_doc = self.load_vertex(out)?;
        let mut in_doc = if out == in_ {
            None
        } else {
            Some(self.load_vertex(in_)?)
        };

        let lightweight = self.lightweight_edges && props.is_empty();
        let class = edge_class_name(label);
        let (edge_doc, out_target, in_target) = if lightweight {
            (None, in_, out)
        } else {
            self.ensure_class(&class, EDGE_CLASS)?;
            let mut doc = self.store.create(&class)?;
            doc.set_field(OUT_FIELD, FieldValue::Link(out), FieldType::Link);
            doc.set_field(IN_FIELD, FieldValue::Link(in_), FieldType::Link);
            for (key, value) in props {
                doc.set(&key, value);
            }
            let id = doc.id();
            (Some(doc), id, id)
        };

        let opts = AttachOpts {
            auto_scale: self.auto_scale_edge_type,
        };
        let out_field = field_name(Direction::Out, label)?;
        let in_field = field_name(Direction::In, label)?;
        let out_change = attach_link(&*self.schema, &mut out_doc, out_target, &out_field, opts)?;
        let in_side = match in_doc.as_mut() {
            Some(doc) => doc,
            None => &mut out_doc,
        };
        let in_change = attach_link(&*self.schema, in_side, in_target, &in_field, opts)?;
        for change in [out_change, in_change] {
            if matches!(change, LinkChange::Upgraded(_)) {
                self.metrics.link_upgraded();
            }
        }

        if let Some(doc) = &edge_doc {
            self.store.save(doc)?;
        }
        if let Some(doc) = &in_doc {
            self.store.save(doc)?;
        }
        self.store.save(&out_doc)?;

        self.metrics.edge_created(lightweight);
        debug!(out = %out, in_ = %in_, label, lightweight, "created edge");
        match edge_doc {
            Some(doc) => Edge::from_record(doc),
            None => Ok(Edge::lightweight(out, in_, label_of_class(&class))),
        }
    }

    /// Loads a vertex. A record that is not a vertex is an error.
    pub fn vertex(&self, id: RecordId) -> Result<Option<Vertex>> {
        let Some(doc) = self.store.load(&id)? else {
            return Ok(None);
        };
        if !self.schema.is_vertex_type(doc.class_name()) {
            return Err(wrong_kind(&doc, "vertex"));
        }
        Ok(Some(Vertex::from_document(doc)))
    }

    /// Loads a record-backed edge. A record that is not an edge is an error.
    pub fn edge(&self, id: RecordId) -> Result<Option<Edge>> {
        let Some(doc) = self.store.load(&id)? else {
            return Ok(None);
        };
        if !self.schema.is_edge_type(doc.class_name()) {
            return Err(wrong_kind(&doc, "edge"));
        }
        Edge::from_record(doc).map(Some)
    }

    /// Loads every existing vertex among `ids`, in order. Missing ids are skipped.
    pub fn vertices_by_id<I>(&self, ids: I) -> Result<Vec<Vertex>>
    where
        I: IntoIterator<Item = RecordId>,
    {
        let mut out = Vec::new();
        for id in ids {
            if let Some(vertex) = self.vertex(id)? {
                out.push(vertex);
            }
        }
        Ok(out)
    }

    /// Streams the edges of `vertex` in `direction` with one of `labels`
    /// (every label when empty). Subclasses of a requested label match too.
    pub fn edges<'a, S: AsRef<str>>(
        &'a self,
        vertex: &'a Vertex,
        direction: Direction,
        labels: &[S],
    ) -> Edges<'a> {
        self.scan_edges(vertex, direction, labels, None)
    }

    /// Like [`Graph::edges`] but keeps only edges whose far endpoint is `target`.
    pub fn edges_to<'a, S: AsRef<str>>(
        &'a self,
        vertex: &'a Vertex,
        direction: Direction,
        target: RecordId,
        labels: &[S],
    ) -> Edges<'a> {
        self.scan_edges(vertex, direction, labels, Some(target))
    }

    /// Streams the neighbors of `vertex` in `direction` with one of `labels`.
    pub fn vertices<'a, S: AsRef<str>>(
        &'a self,
        vertex: &'a Vertex,
        direction: Direction,
        labels: &[S],
    ) -> Vertices<'a> {
        Vertices::new(self.cursor(vertex, direction, labels), self.materializer())
    }

    /// Sets a property on a vertex and saves it. The vertex is refreshed from
    /// the store first so adjacency written since the snapshot is kept.
    pub fn set_vertex_property(
        &self,
        vertex: &mut Vertex,
        key: &str,
        value: impl Into<FieldValue>,
    ) -> Result<()> {
        check_vertex_key(key)?;
        let id = vertex.id();
        let mut doc = self.store.load(&id)?.ok_or(GraphError::NotFound(id))?;
        doc.set(key, value.into());
        self.store.save(&doc)?;
        *vertex = Vertex::from_document(doc);
        Ok(())
    }

    /// Sets a property on a record-backed edge and saves it.
    pub fn set_edge_property(
        &self,
        edge: &mut Edge,
        key: &str,
        value: impl Into<FieldValue>,
    ) -> Result<()> {
        check_edge_key(key)?;
        let Some(id) = edge.id() else {
            return Err(GraphError::InvalidArgument(
                "lightweight edges cannot carry properties".into(),
            ));
        };
        let mut doc = self.store.load(&id)?.ok_or(GraphError::NotFound(id))?;
        doc.set(key, value.into());
        self.store.save(&doc)?;
        *edge = Edge::from_record(doc)?;
        Ok(())
    }

    /// Deletes the vertex document. Adjacency on its neighbors is left in
    /// place and reads back as stale references.
    pub fn remove_vertex(&self, id: RecordId) -> Result<bool> {
        let removed = self.store.delete(&id)?;
        debug!(vertex = %id, removed, "removed vertex");
        Ok(removed)
    }

    /// Deletes the edge record. Lightweight edges have no record, so nothing
    /// is removed and `false` is returned.
    pub fn remove_edge(&self, edge: &Edge) -> Result<bool> {
        let Some(id) = edge.id() else {
            return Ok(false);
        };
        let removed = self.store.delete(&id)?;
        debug!(edge = %id, removed, "removed edge");
        Ok(removed)
    }

    fn scan_edges<'a, S: AsRef<str>>(
        &'a self,
        vertex: &'a Vertex,
        direction: Direction,
        labels: &[S],
        target: Option<RecordId>,
    ) -> Edges<'a> {
        Edges::new(
            vertex.document(),
            self.cursor(vertex, direction, labels),
            self.materializer(),
            target,
        )
    }

    fn cursor<'a, S: AsRef<str>>(
        &self,
        vertex: &'a Vertex,
        direction: Direction,
        labels: &[S],
    ) -> AdjacencyCursor<'a> {
        self.metrics.adjacency_scan(direction.as_str());
        let filter = LabelFilter::new(&*self.schema, labels);
        AdjacencyCursor::new(vertex.document(), direction, filter)
    }

    fn materializer(&self) -> Materializer<'_> {
        Materializer::new(&*self.store, &*self.schema, &*self.metrics)
    }

    fn load_vertex(&self, id: RecordId) -> Result<Document> {
        let doc = self.store.load(&id)?.ok_or(GraphError::NotFound(id))?;
        if !self.schema.is_vertex_type(doc.class_name()) {
            return Err(wrong_kind(&doc, "vertex"));
        }
        Ok(doc)
    }

    fn ensure_class(&self, class: &str, base: &str) -> Result<()> {
        if class != base {
            self.schema.create_class(class, Some(base))?;
        }
        if !self.schema.is_subclass_of(class, base) {
            return Err(GraphError::InvalidArgument(format!(
                "class '{class}' is not a subclass of '{base}'"
            )));
        }
        Ok(())
    }
}

fn wrong_kind(doc: &Document, expected: &str) -> GraphError {
    GraphError::InvalidArgument(format!(
        "record {} of class '{}' is not a {expected}",
        doc.id(),
        doc.class_name()
    ))
}

fn check_vertex_key(key: &str) -> Result<()> {
    if key.is_empty() {
        return Err(GraphError::InvalidArgument("property key must not be empty".into()));
    }
    if is_adjacency_field(key) {
        return Err(GraphError::InvalidArgument(format!(
            "property key '{key}' is reserved for adjacency"
        )));
    }
    Ok(())
}

fn check_edge_key(key: &str) -> Result<()> {
    if key == OUT_FIELD || key == IN_FIELD {
        return Err(GraphError::InvalidArgument(format!(
            "property key '{key}' is reserved for edge endpoints"
        )));
    }
    check_vertex_key(key)
}
