use std::collections::hash_map;
use std::fmt;

use rustc_hash::FxHashMap;

use crate::types::RecordId;

/// Declared type tag stored next to every document field.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum FieldType {
    /// No particular type; anything goes.
    Any,
    /// Boolean.
    Boolean,
    /// 64-bit signed integer.
    Integer,
    /// 64-bit float.
    Float,
    /// UTF-8 string.
    String,
    /// Raw bytes.
    Binary,
    /// Days since epoch.
    Date,
    /// Milliseconds since epoch.
    DateTime,
    /// Exactly one reference.
    Link,
    /// Ordered sequence of references.
    LinkList,
    /// Unordered multiset of references.
    LinkBag,
    /// Ordered list of arbitrary embedded values.
    EmbeddedList,
}

impl FieldType {
    /// Returns the upper-case schema name of the type.
    pub fn as_str(self) -> &'static str {
        match self {
            FieldType::Any => "ANY",
            FieldType::Boolean => "BOOLEAN",
            FieldType::Integer => "INTEGER",
            FieldType::Float => "FLOAT",
            FieldType::String => "STRING",
            FieldType::Binary => "BINARY",
            FieldType::Date => "DATE",
            FieldType::DateTime => "DATETIME",
            FieldType::Link => "LINK",
            FieldType::LinkList => "LINKLIST",
            FieldType::LinkBag => "LINKBAG",
            FieldType::EmbeddedList => "EMBEDDEDLIST",
        }
    }

    /// Whether a field of this type stores references.
    pub fn is_link(self) -> bool {
        matches!(self, FieldType::Link | FieldType::LinkList | FieldType::LinkBag)
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Value held by a document field.
#[derive(Clone, Debug, PartialEq)]
pub enum FieldValue {
    /// Null value.
    Null,
    /// Boolean value.
    Bool(bool),
    /// 64-bit signed integer.
    Int(i64),
    /// 64-bit floating point number.
    Float(f64),
    /// Owned string.
    Str(String),
    /// Owned byte vector.
    Bytes(Vec<u8>),
    /// Date value (days since epoch).
    Date(i64),
    /// DateTime value (milliseconds since epoch).
    DateTime(i64),
    /// A single reference.
    Link(RecordId),
    /// An ordered sequence of references.
    LinkList(Vec<RecordId>),
    /// An unordered multiset of references.
    LinkBag(LinkBag),
    /// Embedded values, not references.
    List(Vec<FieldValue>),
}

impl FieldValue {
    /// Type tag a value gets when written without an explicit one.
    pub fn natural_type(&self) -> FieldType {
        match self {
            FieldValue::Null => FieldType::Any,
            FieldValue::Bool(_) => FieldType::Boolean,
            FieldValue::Int(_) => FieldType::Integer,
            FieldValue::Float(_) => FieldType::Float,
            FieldValue::Str(_) => FieldType::String,
            FieldValue::Bytes(_) => FieldType::Binary,
            FieldValue::Date(_) => FieldType::Date,
            FieldValue::DateTime(_) => FieldType::DateTime,
            FieldValue::Link(_) => FieldType::Link,
            FieldValue::LinkList(_) => FieldType::LinkList,
            FieldValue::LinkBag(_) => FieldType::LinkBag,
            FieldValue::List(_) => FieldType::EmbeddedList,
        }
    }

    /// Returns the reference held by a `Link` value.
    pub fn as_link(&self) -> Option<RecordId> {
        match self {
            FieldValue::Link(id) => Some(*id),
            _ => None,
        }
    }

    /// Short description used in error messages.
    pub fn describe(&self) -> String {
        match self {
            FieldValue::Null => "null".to_string(),
            FieldValue::Bool(v) => format!("bool({v})"),
            FieldValue::Int(v) => format!("int({v})"),
            FieldValue::Float(v) => format!("float({v})"),
            FieldValue::Str(v) => format!("string(len={})", v.len()),
            FieldValue::Bytes(v) => format!("bytes(len={})", v.len()),
            FieldValue::Date(v) => format!("date({v})"),
            FieldValue::DateTime(v) => format!("datetime({v})"),
            FieldValue::Link(id) => format!("link({id})"),
            FieldValue::LinkList(v) => format!("linklist(len={})", v.len()),
            FieldValue::LinkBag(v) => format!("linkbag(len={})", v.len()),
            FieldValue::List(v) => format!("list(len={})", v.len()),
        }
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        FieldValue::Int(value)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        FieldValue::Bool(value)
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        FieldValue::Float(value)
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Str(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Str(value)
    }
}

impl From<RecordId> for FieldValue {
    fn from(value: RecordId) -> Self {
        FieldValue::Link(value)
    }
}

/// Unordered multiset of references.
///
/// Iteration order follows the underlying hash table and is not stable across
/// insertions.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LinkBag {
    counts: FxHashMap<RecordId, u32>,
    len: usize,
}

impl LinkBag {
    /// Creates an empty bag.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds one occurrence of `id`.
    pub fn add(&mut self, id: RecordId) {
        *self.counts.entry(id).or_insert(0) += 1;
        self.len += 1;
    }

    /// Removes one occurrence of `id`, returning whether it was present.
    pub fn remove(&mut self, id: &RecordId) -> bool {
        match self.counts.get_mut(id) {
            Some(count) if *count > 1 => {
                *count -= 1;
                self.len -= 1;
                true
            }
            Some(_) => {
                self.counts.remove(id);
                self.len -= 1;
                true
            }
            None => false,
        }
    }

    /// Whether at least one occurrence of `id` is present.
    pub fn contains(&self, id: &RecordId) -> bool {
        self.counts.contains_key(id)
    }

    /// Number of occurrences of `id`.
    pub fn count(&self, id: &RecordId) -> u32 {
        self.counts.get(id).copied().unwrap_or(0)
    }

    /// Total number of references, duplicates included.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the bag holds no references.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// First reference in native order, without building an iterator over the rest.
    pub fn first(&self) -> Option<RecordId> {
        self.counts.keys().next().copied()
    }

    /// Iterates every occurrence in native order.
    pub fn iter(&self) -> LinkBagIter<'_> {
        LinkBagIter {
            inner: self.counts.iter(),
            current: None,
            remaining: self.len,
        }
    }
}

impl FromIterator<RecordId> for LinkBag {
    fn from_iter<I: IntoIterator<Item = RecordId>>(iter: I) -> Self {
        let mut bag = LinkBag::new();
        for id in iter {
            bag.add(id);
        }
        bag
    }
}

impl<'a> IntoIterator for &'a LinkBag {
    type Item = RecordId;
    type IntoIter = LinkBagIter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Lazy iterator over a [`LinkBag`], repeating duplicated references.
pub struct LinkBagIter<'a> {
    inner: hash_map::Iter<'a, RecordId, u32>,
    current: Option<(RecordId, u32)>,
    remaining: usize,
}

impl Iterator for LinkBagIter<'_> {
    type Item = RecordId;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some((id, left)) = self.current.as_mut() {
                if *left > 0 {
                    *left -= 1;
                    self.remaining -= 1;
                    return Some(*id);
                }
            }
            let (id, count) = self.inner.next()?;
            self.current = Some((*id, *count));
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl ExactSizeIterator for LinkBagIter<'_> {}
