use crate::adjacency::{AdjacencyCursor, Materializer};
use crate::storage::Document;
use crate::types::{RecordId, Result};

use super::element::{Edge, Neighbor};

/// Lazy stream of the edges around a vertex.
///
/// Stale references and target mismatches are skipped. A bad entry yields
/// one `Err` item; iteration can continue past it.
pub struct Edges<'a> {
    source: &'a Document,
    cursor: AdjacencyCursor<'a>,
    materializer: Materializer<'a>,
    target: Option<RecordId>,
}

impl<'a> Edges<'a> {
    pub(super) fn new(
        source: &'a Document,
        cursor: AdjacencyCursor<'a>,
        materializer: Materializer<'a>,
        target: Option<RecordId>,
    ) -> Self {
        Self {
            source,
            cursor,
            materializer,
            target,
        }
    }
}

impl Iterator for Edges<'_> {
    type Item = Result<Edge>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let entry = match self.cursor.next()? {
                Ok(entry) => entry,
                Err(err) => return Some(Err(err)),
            };
            match self.materializer.edge(self.source, &entry, self.target) {
                Ok(Some(edge)) => return Some(Ok(edge)),
                Ok(None) => continue,
                Err(err) => return Some(Err(err)),
            }
        }
    }
}

/// Lazy stream of the neighbors of a vertex.
pub struct Vertices<'a> {
    cursor: AdjacencyCursor<'a>,
    materializer: Materializer<'a>,
}

impl<'a> Vertices<'a> {
    pub(super) fn new(cursor: AdjacencyCursor<'a>, materializer: Materializer<'a>) -> Self {
        Self {
            cursor,
            materializer,
        }
    }
}

impl Iterator for Vertices<'_> {
    type Item = Result<Neighbor>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let entry = match self.cursor.next()? {
                Ok(entry) => entry,
                Err(err) => return Some(Err(err)),
            };
            match self.materializer.vertex(&entry) {
                Ok(Some(neighbor)) => return Some(Ok(neighbor)),
                Ok(None) => continue,
                Err(err) => return Some(Err(err)),
            }
        }
    }
}
