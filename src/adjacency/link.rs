//! Representation selector: decides how a new link is stored in an adjacency
//! field, upgrading single references to collections as cardinality grows.

use tracing::debug;

use crate::storage::{Document, FieldType, FieldValue, LinkBag, SchemaCatalog};
use crate::types::{GraphError, RecordId, Result};

/// Borrowed view of an adjacency field value.
#[derive(Clone, Copy, Debug)]
pub enum LinkRepr<'a> {
    /// Exactly one reference.
    Single(RecordId),
    /// Ordered sequence of references.
    Ordered(&'a [RecordId]),
    /// Unordered multiset of references.
    Bag(&'a LinkBag),
}

impl<'a> LinkRepr<'a> {
    /// Classifies `value`. Absent and null values yield `None`; any shape that
    /// is not a link representation is [`GraphError::InvalidLinkContent`].
    pub fn classify(field: &str, value: Option<&'a FieldValue>) -> Result<Option<Self>> {
        match value {
            None | Some(FieldValue::Null) => Ok(None),
            Some(FieldValue::Link(id)) => Ok(Some(LinkRepr::Single(*id))),
            Some(FieldValue::LinkList(ids)) => Ok(Some(LinkRepr::Ordered(ids))),
            Some(FieldValue::LinkBag(bag)) => Ok(Some(LinkRepr::Bag(bag))),
            Some(other) => Err(GraphError::InvalidLinkContent {
                field: field.to_string(),
                found: other.describe(),
            }),
        }
    }

    /// Number of references held.
    pub fn len(&self) -> usize {
        match self {
            LinkRepr::Single(_) => 1,
            LinkRepr::Ordered(ids) => ids.len(),
            LinkRepr::Bag(bag) => bag.len(),
        }
    }

    /// Whether no references are held.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether `id` is among the references.
    pub fn contains(&self, id: &RecordId) -> bool {
        match self {
            LinkRepr::Single(one) => one == id,
            LinkRepr::Ordered(ids) => ids.contains(id),
            LinkRepr::Bag(bag) => bag.contains(id),
        }
    }

    /// Type tag matching this representation.
    pub fn field_type(&self) -> FieldType {
        match self {
            LinkRepr::Single(_) => FieldType::Link,
            LinkRepr::Ordered(_) => FieldType::LinkList,
            LinkRepr::Bag(_) => FieldType::LinkBag,
        }
    }
}

/// What [`attach_link`] did to the field.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum LinkChange {
    /// The field was absent and now holds a fresh representation.
    Created(FieldType),
    /// A single reference was replaced by a collection holding both links.
    Upgraded(FieldType),
    /// The link was added to an existing collection in place.
    Appended,
}

impl LinkChange {
    /// Whether the field value object was replaced and written back.
    pub fn replaced_field(self) -> bool {
        !matches!(self, LinkChange::Appended)
    }
}

/// Tuning for [`attach_link`].
#[derive(Clone, Copy, Debug, Default)]
pub struct AttachOpts {
    /// Store the first link of an unconstrained field as a single reference.
    pub auto_scale: bool,
}

/// Adds a link to `to` under `field` on `doc`, choosing or upgrading the
/// representation against the schema. The document is not saved.
pub fn attach_link(
    catalog: &dyn SchemaCatalog,
    doc: &mut Document,
    to: RecordId,
    field: &str,
    opts: AttachOpts,
) -> Result<LinkChange> {
    let class = doc.class_name().to_string();
    if !catalog.exists(&class) {
        return Err(GraphError::ClassNotFound(format!(
            "class not found in source vertex {}: {class}",
            doc.id()
        )));
    }
    let prop = catalog.property(&class, field);
    let declared = prop.as_ref().and_then(|p| p.declared_type());
    let ordered = prop.as_ref().is_some_and(|p| p.is_ordered());
    let incompatible = |declared: String| GraphError::IncompatibleFieldType {
        field: field.to_string(),
        declared,
    };
    if let Some(ty) = declared.filter(|ty| !ty.is_link()) {
        return Err(incompatible(ty.to_string()));
    }

    let change = match doc.field_mut(field) {
        None | Some(FieldValue::Null) => {
            let ty = match declared {
                Some(ty) => ty,
                None if opts.auto_scale && (prop.is_none() || ordered) => FieldType::Link,
                None if ordered => FieldType::LinkList,
                None => FieldType::LinkBag,
            };
            let value = match ty {
                FieldType::Link => FieldValue::Link(to),
                FieldType::LinkList => FieldValue::LinkList(vec![to]),
                _ => {
                    let mut bag = LinkBag::new();
                    bag.add(to);
                    FieldValue::LinkBag(bag)
                }
            };
            doc.set_field(field, value, ty);
            LinkChange::Created(ty)
        }
        Some(FieldValue::Link(existing)) => {
            let existing = *existing;
            let ty = match declared {
                Some(FieldType::Link) => {
                    return Err(incompatible(format!(
                        "{} cannot hold several links",
                        FieldType::Link
                    )))
                }
                Some(ty) => ty,
                None if ordered => FieldType::LinkList,
                None => FieldType::LinkBag,
            };
            let value = if ty == FieldType::LinkList {
                FieldValue::LinkList(vec![existing, to])
            } else {
                let mut bag = LinkBag::new();
                bag.add(existing);
                bag.add(to);
                FieldValue::LinkBag(bag)
            };
            doc.set_field(field, value, ty);
            debug!(record = %doc.id(), field, to = %ty, "upgraded single link");
            LinkChange::Upgraded(ty)
        }
        Some(FieldValue::LinkBag(bag)) => {
            bag.add(to);
            LinkChange::Appended
        }
        Some(FieldValue::LinkList(ids)) => {
            ids.push(to);
            LinkChange::Appended
        }
        Some(other) => {
            return Err(GraphError::InvalidLinkContent {
                field: field.to_string(),
                found: other.describe(),
            })
        }
    };
    Ok(change)
}
