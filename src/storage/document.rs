use smallvec::SmallVec;

use crate::types::RecordId;

use super::value::{FieldType, FieldValue};

/// A named field with its value and declared type tag.
#[derive(Clone, Debug, PartialEq)]
pub struct Field {
    /// Field name.
    pub name: String,
    /// Current value.
    pub value: FieldValue,
    /// Type tag the value was written with.
    pub ty: FieldType,
}

/// A schema-bearing document: identity, class name, and ordered fields.
///
/// Field order is the order in which fields were first written; rewriting an
/// existing field keeps its position.
#[derive(Clone, Debug, PartialEq)]
pub struct Document {
    id: RecordId,
    class: String,
    fields: SmallVec<[Field; 8]>,
}

impl Document {
    /// Creates an empty document of `class` with the given identity.
    pub fn new(id: RecordId, class: impl Into<String>) -> Self {
        Self {
            id,
            class: class.into(),
            fields: SmallVec::new(),
        }
    }

    /// Identity of the document.
    pub fn id(&self) -> RecordId {
        self.id
    }

    /// Schema class name.
    pub fn class_name(&self) -> &str {
        &self.class
    }

    /// Returns the value of `name`, if present.
    pub fn field(&self, name: &str) -> Option<&FieldValue> {
        self.position(name).map(|idx| &self.fields[idx].value)
    }

    /// Returns a mutable reference to the value of `name`, if present.
    pub fn field_mut(&mut self, name: &str) -> Option<&mut FieldValue> {
        let idx = self.position(name)?;
        Some(&mut self.fields[idx].value)
    }

    /// Returns the type tag of `name`, if present.
    pub fn field_type(&self, name: &str) -> Option<FieldType> {
        self.position(name).map(|idx| self.fields[idx].ty)
    }

    /// Writes `value` under `name` with an explicit type tag.
    pub fn set_field(&mut self, name: &str, value: FieldValue, ty: FieldType) {
        match self.position(name) {
            Some(idx) => {
                let field = &mut self.fields[idx];
                field.value = value;
                field.ty = ty;
            }
            None => self.fields.push(Field {
                name: name.to_string(),
                value,
                ty,
            }),
        }
    }

    /// Writes `value` under `name`, tagging it with its natural type.
    pub fn set(&mut self, name: &str, value: FieldValue) {
        let ty = value.natural_type();
        self.set_field(name, value, ty);
    }

    /// Removes `name`, returning its value.
    pub fn remove_field(&mut self, name: &str) -> Option<FieldValue> {
        let idx = self.position(name)?;
        Some(self.fields.remove(idx).value)
    }

    /// Whether `name` is present.
    pub fn has_field(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    /// Field names in stored order.
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|f| f.name.as_str())
    }

    /// Fields in stored order.
    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    /// Number of fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether the document has no fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.name == name)
    }
}
