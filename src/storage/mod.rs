//! Document store and schema catalog the graph layer is built on.
//!
//! Both are consumed through traits; [`MemoryStore`] and [`Schema`] are the
//! in-memory implementations used by tests and embedders without a backend.

/// Schema classes, inheritance and declared properties.
pub mod catalog;

mod document;
mod store;
mod value;

pub use catalog::{PropertyDef, Schema, SchemaCatalog, CUSTOM_ORDERED, EDGE_CLASS, VERTEX_CLASS};
pub use document::{Document, Field};
pub use store::{DocumentStore, MemoryStore};
pub use value::{FieldType, FieldValue, LinkBag, LinkBagIter};
