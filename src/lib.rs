//! Property-graph adjacency encoding over a schema-bearing document store.
//!
//! Vertices and edges are documents. Each connection is stored as an
//! `out_<label>` field on the source vertex and an `in_<label>` field on the
//! destination, holding either a direct vertex reference (a lightweight edge)
//! or a reference to an edge record. Traversals walk those fields lazily.
//!
//! ```
//! use docgraph::{Direction, Graph, ANY_LABEL};
//!
//! # fn main() -> docgraph::Result<()> {
//! let graph = Graph::in_memory()?;
//! let ada = graph.add_vertex_with(Some("person"), [("name", "ada")])?;
//! let bob = graph.add_vertex(Some("person"))?;
//! graph.add_edge(ada.id(), "knows", bob.id())?;
//!
//! let ada = graph.vertex(ada.id())?.expect("vertex exists");
//! for edge in graph.edges(&ada, Direction::Out, &["knows"]) {
//!     assert_eq!(edge?.in_vertex(), bob.id());
//! }
//! assert_eq!(graph.vertices(&ada, Direction::Both, ANY_LABEL).count(), 1);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

pub mod adjacency;
pub mod config;
mod error;
pub mod graph;
pub mod storage;
pub mod types;

pub use adjacency::{Connection, Direction};
pub use config::GraphSettings;
pub use graph::{Edge, Graph, GraphOptions, Neighbor, Vertex, ANY_LABEL};
pub use types::{GraphError, RecordId, Result};
