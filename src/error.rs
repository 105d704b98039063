use thiserror::Error;

use crate::types::RecordId;

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, GraphError>;

/// Errors surfaced by the adjacency core and the graph session.
#[derive(Debug, Error)]
pub enum GraphError {
    /// The schema class of a document could not be resolved.
    #[error("class not found: {0}")]
    ClassNotFound(String),
    /// The declared property type cannot hold the link representation required.
    #[error("type of field '{field}' provided in schema ({declared}) can not be used for link creation")]
    IncompatibleFieldType {
        /// Adjacency field name.
        field: String,
        /// Declared schema type.
        declared: String,
    },
    /// An adjacency field holds a value no link representation handles.
    #[error("relationship content is invalid on field '{field}': found {found}")]
    InvalidLinkContent {
        /// Adjacency field name.
        field: String,
        /// Short description of the value found.
        found: String,
    },
    /// A document reachable from an adjacency field is neither a vertex nor an edge.
    #[error("invalid content found in '{field}' field: record {record} of class '{class}'")]
    InvalidAdjacency {
        /// Adjacency field name.
        field: String,
        /// Record the field pointed at.
        record: RecordId,
        /// Class of that record.
        class: String,
    },
    /// Stored graph data is structurally broken.
    #[error("corruption detected: {0}")]
    Corruption(String),
    /// Caller supplied an invalid argument.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    /// A required record does not exist.
    #[error("record {0} not found")]
    NotFound(RecordId),
    /// The document store reported a failure.
    #[error("storage error: {0}")]
    Storage(String),
    /// Configuration could not be read or parsed.
    #[error("configuration error: {0}")]
    Config(String),
}

impl From<std::io::Error> for GraphError {
    fn from(err: std::io::Error) -> Self {
        GraphError::Config(err.to_string())
    }
}

impl From<toml::de::Error> for GraphError {
    fn from(err: toml::de::Error) -> Self {
        GraphError::Config(err.to_string())
    }
}
