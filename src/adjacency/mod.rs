//! Adjacency encoding and lazy traversal.
//!
//! An edge between two vertex documents is stored as a field on each
//! endpoint: `out_<label>` on the source and `in_<label>` on the destination.
//! The field holds either a direct reference to the opposite vertex (a
//! lightweight edge) or a reference to an edge record. As more edges share a
//! field, a single reference is upgraded to an ordered list or an unordered
//! bag depending on the schema.
//!
//! - [`codec`] maps `(direction, label)` to field names and back.
//! - [`link`] picks and upgrades the stored representation.
//! - [`cursor`] streams matching references from a vertex document.
//! - [`materialize`] turns those references into edges and neighbors.

pub mod codec;
pub mod cursor;
pub mod link;
pub mod materialize;

pub use codec::{
    decode_label, edge_class_name, encode_label, field_name, is_adjacency_field, label_of_class,
    parse, parse_connection, vertex_class_name, Connection, Direction, LabelFilter, IN_FIELD,
    IN_PREFIX, OUT_FIELD, OUT_PREFIX,
};
pub use cursor::{AdjacencyCursor, AdjacencyEntry};
pub use link::{attach_link, AttachOpts, LinkChange, LinkRepr};
pub use materialize::Materializer;
