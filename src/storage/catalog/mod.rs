//! Schema catalog: class hierarchy and declared property types.

use std::collections::VecDeque;

use parking_lot::RwLock;
use rustc_hash::{FxHashMap, FxHashSet};
use tracing::info;

use crate::storage::FieldType;
use crate::types::{GraphError, Result};

/// Base class every vertex class descends from.
pub const VERTEX_CLASS: &str = "V";
/// Base class every edge class descends from.
pub const EDGE_CLASS: &str = "E";

/// Custom property flag requesting ordered link storage.
pub const CUSTOM_ORDERED: &str = "ordered";

/// Declared property on a class.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PropertyDef {
    /// Property name.
    pub name: String,
    /// Declared type.
    pub ty: FieldType,
    /// Custom string flags.
    pub custom: FxHashMap<String, String>,
}

impl PropertyDef {
    /// Creates a property without custom flags.
    pub fn new(name: impl Into<String>, ty: FieldType) -> Self {
        Self {
            name: name.into(),
            ty,
            custom: FxHashMap::default(),
        }
    }

    /// Returns a custom flag value.
    pub fn custom(&self, key: &str) -> Option<&str> {
        self.custom.get(key).map(String::as_str)
    }

    /// Whether the `ordered` custom flag is set to `true` (case-insensitive).
    pub fn is_ordered(&self) -> bool {
        self.custom(CUSTOM_ORDERED)
            .is_some_and(|v| v.eq_ignore_ascii_case("true"))
    }

    /// Declared type, or `None` when declared as [`FieldType::Any`].
    pub fn declared_type(&self) -> Option<FieldType> {
        (self.ty != FieldType::Any).then_some(self.ty)
    }
}

/// Read and minimal write access to the class hierarchy.
pub trait SchemaCatalog: Send + Sync {
    /// Whether a class called `name` exists.
    fn exists(&self, name: &str) -> bool;

    /// Direct superclass of `name`.
    fn superclass(&self, name: &str) -> Option<String>;

    /// Direct subclasses of `name`, sorted by name.
    fn direct_subclasses(&self, name: &str) -> Vec<String>;

    /// Property `field` declared on `class` or inherited from a superclass.
    fn property(&self, class: &str, field: &str) -> Option<PropertyDef>;

    /// Number of classes in the catalog.
    fn class_count(&self) -> usize;

    /// Creates `name` under `superclass` unless it exists. Returns whether a
    /// class was created.
    fn create_class(&self, name: &str, superclass: Option<&str>) -> Result<bool>;

    /// Whether `name` is `ancestor` or descends from it.
    fn is_subclass_of(&self, name: &str, ancestor: &str) -> bool {
        if !self.exists(name) {
            return false;
        }
        let mut current = name.to_string();
        // a well-formed hierarchy is never deeper than the catalog
        for _ in 0..=self.class_count() {
            if current == ancestor {
                return true;
            }
            match self.superclass(&current) {
                Some(next) => current = next,
                None => return false,
            }
        }
        false
    }

    /// Every transitive subclass of `name`, breadth-first, excluding `name`.
    fn all_subclasses(&self, name: &str) -> Vec<String> {
        let limit = self.class_count();
        let mut seen: FxHashSet<String> = FxHashSet::default();
        let mut queue: VecDeque<String> = self.direct_subclasses(name).into();
        let mut out = Vec::new();
        while let Some(class) = queue.pop_front() {
            if out.len() >= limit {
                break;
            }
            if class == name || !seen.insert(class.clone()) {
                continue;
            }
            queue.extend(self.direct_subclasses(&class));
            out.push(class);
        }
        out
    }

    /// Whether `name` is a vertex class.
    fn is_vertex_type(&self, name: &str) -> bool {
        self.is_subclass_of(name, VERTEX_CLASS)
    }

    /// Whether `name` is an edge class.
    fn is_edge_type(&self, name: &str) -> bool {
        self.is_subclass_of(name, EDGE_CLASS)
    }
}

#[derive(Clone, Debug)]
struct ClassDef {
    superclass: Option<String>,
    properties: FxHashMap<String, PropertyDef>,
}

/// In-memory [`SchemaCatalog`] seeded with the `V` and `E` base classes.
pub struct Schema {
    classes: RwLock<FxHashMap<String, ClassDef>>,
}

impl Default for Schema {
    fn default() -> Self {
        Self::new()
    }
}

impl Schema {
    /// Creates a catalog holding only the base classes.
    pub fn new() -> Self {
        let mut classes = FxHashMap::default();
        for base in [VERTEX_CLASS, EDGE_CLASS] {
            classes.insert(
                base.to_string(),
                ClassDef {
                    superclass: None,
                    properties: FxHashMap::default(),
                },
            );
        }
        Self {
            classes: RwLock::new(classes),
        }
    }

    /// Declares `field` on `class` with type `ty`, replacing an earlier declaration.
    pub fn create_property(&self, class: &str, field: &str, ty: FieldType) -> Result<()> {
        let mut classes = self.classes.write();
        let def = classes
            .get_mut(class)
            .ok_or_else(|| GraphError::ClassNotFound(class.to_string()))?;
        def.properties
            .insert(field.to_string(), PropertyDef::new(field, ty));
        Ok(())
    }

    /// Sets a custom flag on a declared property.
    pub fn set_custom(&self, class: &str, field: &str, key: &str, value: &str) -> Result<()> {
        let mut classes = self.classes.write();
        let def = classes
            .get_mut(class)
            .ok_or_else(|| GraphError::ClassNotFound(class.to_string()))?;
        let prop = def.properties.get_mut(field).ok_or_else(|| {
            GraphError::InvalidArgument(format!("property '{field}' not declared on '{class}'"))
        })?;
        prop.custom.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

impl SchemaCatalog for Schema {
    fn exists(&self, name: &str) -> bool {
        self.classes.read().contains_key(name)
    }

    fn superclass(&self, name: &str) -> Option<String> {
        self.classes.read().get(name)?.superclass.clone()
    }

    fn direct_subclasses(&self, name: &str) -> Vec<String> {
        let classes = self.classes.read();
        let mut subs: Vec<String> = classes
            .iter()
            .filter(|(_, def)| def.superclass.as_deref() == Some(name))
            .map(|(class, _)| class.clone())
            .collect();
        subs.sort();
        subs
    }

    fn property(&self, class: &str, field: &str) -> Option<PropertyDef> {
        let classes = self.classes.read();
        let mut current = classes.get(class)?;
        for _ in 0..=classes.len() {
            if let Some(prop) = current.properties.get(field) {
                return Some(prop.clone());
            }
            current = classes.get(current.superclass.as_deref()?)?;
        }
        None
    }

    fn class_count(&self) -> usize {
        self.classes.read().len()
    }

    fn create_class(&self, name: &str, superclass: Option<&str>) -> Result<bool> {
        let mut classes = self.classes.write();
        if classes.contains_key(name) {
            return Ok(false);
        }
        if let Some(sup) = superclass {
            if !classes.contains_key(sup) {
                let mut available: Vec<&str> = classes.keys().map(String::as_str).collect();
                available.sort_unstable();
                return Err(GraphError::ClassNotFound(format!(
                    "unable to find class {sup}. Available classes: {available:?}"
                )));
            }
        }
        classes.insert(
            name.to_string(),
            ClassDef {
                superclass: superclass.map(str::to_string),
                properties: FxHashMap::default(),
            },
        );
        info!(class = name, superclass = ?superclass, "created class");
        Ok(true)
    }
}
