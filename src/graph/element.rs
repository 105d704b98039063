use std::fmt;

use crate::adjacency::codec::{is_adjacency_field, label_of_class, Direction, IN_FIELD, OUT_FIELD};
use crate::storage::{Document, FieldValue, EDGE_CLASS, VERTEX_CLASS};
use crate::types::{GraphError, RecordId, Result};

/// Reads the endpoint an edge record stores for `direction`.
pub(crate) fn record_endpoint(doc: &Document, direction: Direction) -> Option<RecordId> {
    doc.field(direction.endpoint_field()?)?.as_link()
}

/// A vertex snapshot backed by its document.
#[derive(Clone, Debug)]
pub struct Vertex {
    doc: Document,
}

impl Vertex {
    pub(crate) fn from_document(doc: Document) -> Self {
        Self { doc }
    }

    /// Record id of the vertex.
    pub fn id(&self) -> RecordId {
        self.doc.id()
    }

    /// User label: the class name without its `V_` group prefix.
    pub fn label(&self) -> String {
        label_of_class(self.doc.class_name())
    }

    /// Schema class of the backing document.
    pub fn class_name(&self) -> &str {
        self.doc.class_name()
    }

    /// Value of a property; adjacency fields are not properties.
    pub fn property(&self, key: &str) -> Option<&FieldValue> {
        if is_adjacency_field(key) {
            return None;
        }
        self.doc.field(key)
    }

    /// Properties in stored order, adjacency fields excluded.
    pub fn properties(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.doc
            .fields()
            .iter()
            .filter(|f| !is_adjacency_field(&f.name))
            .map(|f| (f.name.as_str(), &f.value))
    }

    /// The backing document.
    pub fn document(&self) -> &Document {
        &self.doc
    }
}

impl PartialEq for Vertex {
    fn eq(&self, other: &Self) -> bool {
        self.id() == other.id()
    }
}

impl Eq for Vertex {}

impl fmt::Display for Vertex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.doc.class_name() == VERTEX_CLASS {
            write!(f, "v[{}]", self.id())
        } else {
            write!(f, "v({})[{}]", self.label(), self.id())
        }
    }
}

/// An edge, either backed by its own record or reconstructed from a direct
/// vertex-to-vertex reference.
#[derive(Clone, Debug)]
pub struct Edge {
    out: RecordId,
    in_: RecordId,
    label: String,
    record: Option<Document>,
}

impl Edge {
    pub(crate) fn lightweight(out: RecordId, in_: RecordId, label: impl Into<String>) -> Self {
        Self {
            out,
            in_,
            label: label.into(),
            record: None,
        }
    }

    pub(crate) fn from_record(doc: Document) -> Result<Self> {
        let endpoint = |direction: Direction| {
            record_endpoint(&doc, direction).ok_or_else(|| {
                GraphError::Corruption(format!(
                    "edge {} has no '{}' vertex",
                    doc.id(),
                    direction.as_str()
                ))
            })
        };
        let out = endpoint(Direction::Out)?;
        let in_ = endpoint(Direction::In)?;
        Ok(Self {
            out,
            in_,
            label: label_of_class(doc.class_name()),
            record: Some(doc),
        })
    }

    /// Record id, or `None` for a lightweight edge.
    pub fn id(&self) -> Option<RecordId> {
        self.record.as_ref().map(Document::id)
    }

    /// Whether the edge has no backing record.
    pub fn is_lightweight(&self) -> bool {
        self.record.is_none()
    }

    /// Edge label; `E` for the base edge class.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Source vertex.
    pub fn out_vertex(&self) -> RecordId {
        self.out
    }

    /// Destination vertex.
    pub fn in_vertex(&self) -> RecordId {
        self.in_
    }

    /// Endpoint on the given side; `None` for `Both`.
    pub fn vertex(&self, direction: Direction) -> Option<RecordId> {
        match direction {
            Direction::Out => Some(self.out),
            Direction::In => Some(self.in_),
            Direction::Both => None,
        }
    }

    /// Value of a property. Lightweight edges have none.
    pub fn property(&self, key: &str) -> Option<&FieldValue> {
        if key == OUT_FIELD || key == IN_FIELD {
            return None;
        }
        self.record.as_ref()?.field(key)
    }

    /// Properties in stored order, endpoint fields excluded.
    pub fn properties(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.record
            .iter()
            .flat_map(|doc| doc.fields().iter())
            .filter(|f| f.name != OUT_FIELD && f.name != IN_FIELD)
            .map(|f| (f.name.as_str(), &f.value))
    }

    /// The backing record, if any.
    pub fn document(&self) -> Option<&Document> {
        self.record.as_ref()
    }
}

impl PartialEq for Edge {
    fn eq(&self, other: &Self) -> bool {
        match (self.id(), other.id()) {
            (Some(a), Some(b)) => a == b,
            (None, None) => self.out == other.out && self.in_ == other.in_ && self.label == other.label,
            _ => false,
        }
    }
}

impl Eq for Edge {}

impl fmt::Display for Edge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = if self.label == EDGE_CLASS { "" } else { self.label.as_str() };
        match self.id() {
            Some(id) => write!(f, "e[{id}][{}-{label}->{}]", self.out, self.in_),
            None => write!(f, "e[{}-{label}->{}]", self.out, self.in_),
        }
    }
}

/// Result of resolving one adjacency entry to the neighboring vertex.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Neighbor {
    /// The neighbor was found.
    Vertex(Vertex),
    /// The entry points at an edge whose opposite endpoint could not be read,
    /// even after reloading the edge record once.
    Unavailable {
        /// The edge record.
        edge: RecordId,
        /// Side of the edge that was missing.
        direction: Direction,
    },
}

impl Neighbor {
    /// The vertex, if it was found.
    pub fn vertex(&self) -> Option<&Vertex> {
        match self {
            Neighbor::Vertex(v) => Some(v),
            Neighbor::Unavailable { .. } => None,
        }
    }

    /// Consumes `self`, returning the vertex if it was found.
    pub fn into_vertex(self) -> Option<Vertex> {
        match self {
            Neighbor::Vertex(v) => Some(v),
            Neighbor::Unavailable { .. } => None,
        }
    }
}
