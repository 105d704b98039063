//! Shared identifiers and the crate-wide error type.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

pub use crate::error::{GraphError, Result};

/// Opaque handle identifying a stored document.
///
/// Rendered as `#cluster:position`. Two ids are equal when both parts match.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, Serialize)]
pub struct RecordId {
    /// Cluster the record lives in.
    pub cluster: u16,
    /// Position inside the cluster.
    pub position: u64,
}

impl RecordId {
    /// Creates a record id from its parts.
    pub const fn new(cluster: u16, position: u64) -> Self {
        Self { cluster, position }
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}:{}", self.cluster, self.position)
    }
}

impl FromStr for RecordId {
    type Err = GraphError;

    fn from_str(s: &str) -> Result<Self> {
        let body = s.strip_prefix('#').unwrap_or(s);
        let (cluster, position) = body
            .split_once(':')
            .ok_or_else(|| GraphError::InvalidArgument(format!("malformed record id '{s}'")))?;
        let cluster = cluster
            .parse::<u16>()
            .map_err(|_| GraphError::InvalidArgument(format!("malformed record id '{s}'")))?;
        let position = position
            .parse::<u64>()
            .map_err(|_| GraphError::InvalidArgument(format!("malformed record id '{s}'")))?;
        Ok(RecordId { cluster, position })
    }
}
