//! Lazy adjacency iterator over a vertex document's fields.

use std::mem;
use std::slice;

use tracing::trace;

use crate::storage::{Document, Field, LinkBagIter};
use crate::types::{RecordId, Result};

use super::codec::{parse_connection, Connection, Direction, LabelFilter};
use super::link::LinkRepr;

/// One reference found in a matching adjacency field.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AdjacencyEntry<'a> {
    /// Name of the field the reference was found in.
    pub field: &'a str,
    /// Direction and label decoded from the field name.
    pub connection: Connection,
    /// The stored reference: a vertex for lightweight edges, else an edge record.
    pub target: RecordId,
}

/// Per-field source of references.
enum FieldCursor<'a> {
    Exhausted,
    One(RecordId),
    Ordered(slice::Iter<'a, RecordId>),
    Bag(LinkBagIter<'a>),
}

impl<'a> FieldCursor<'a> {
    fn from_repr(repr: LinkRepr<'a>) -> Self {
        match repr {
            LinkRepr::Single(id) => FieldCursor::One(id),
            LinkRepr::Ordered([only]) => FieldCursor::One(*only),
            LinkRepr::Ordered(ids) => FieldCursor::Ordered(ids.iter()),
            LinkRepr::Bag(bag) if bag.len() == 1 => match bag.first() {
                Some(only) => FieldCursor::One(only),
                None => FieldCursor::Exhausted,
            },
            LinkRepr::Bag(bag) => FieldCursor::Bag(bag.iter()),
        }
    }

    fn next(&mut self) -> Option<RecordId> {
        match self {
            FieldCursor::Exhausted => None,
            FieldCursor::One(_) => match mem::replace(self, FieldCursor::Exhausted) {
                FieldCursor::One(id) => Some(id),
                _ => None,
            },
            FieldCursor::Ordered(iter) => iter.next().copied(),
            FieldCursor::Bag(iter) => iter.next(),
        }
    }
}

/// Streams every `(connection, reference)` pair of a vertex that matches a
/// direction and label filter.
///
/// Fields are visited in stored order and each matching field is drained
/// before the next one is examined. Collections are walked lazily. A field
/// whose name matches but whose value is not a link representation yields one
/// `Err` item and the iteration moves on.
pub struct AdjacencyCursor<'a> {
    fields: slice::Iter<'a, Field>,
    direction: Direction,
    filter: LabelFilter,
    current: Option<(&'a str, Connection, FieldCursor<'a>)>,
}

impl<'a> AdjacencyCursor<'a> {
    /// Starts iterating `doc` in `direction` under `filter`.
    pub fn new(doc: &'a Document, direction: Direction, filter: LabelFilter) -> Self {
        Self {
            fields: doc.fields().iter(),
            direction,
            filter,
            current: None,
        }
    }
}

impl<'a> Iterator for AdjacencyCursor<'a> {
    type Item = Result<AdjacencyEntry<'a>>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some((field, connection, cursor)) = self.current.as_mut() {
                if let Some(target) = cursor.next() {
                    return Some(Ok(AdjacencyEntry {
                        field: *field,
                        connection: connection.clone(),
                        target,
                    }));
                }
                self.current = None;
            }
            let field = self.fields.next()?;
            let Some(connection) = parse_connection(&field.name, self.direction, &self.filter)
            else {
                continue;
            };
            match LinkRepr::classify(&field.name, Some(&field.value)) {
                Ok(Some(repr)) => {
                    trace!(
                        field = %field.name,
                        repr = %repr.field_type(),
                        len = repr.len(),
                        "expand adjacency field"
                    );
                    self.current = Some((
                        field.name.as_str(),
                        connection,
                        FieldCursor::from_repr(repr),
                    ));
                }
                Ok(None) => continue,
                Err(err) => return Some(Err(err)),
            }
        }
    }
}
