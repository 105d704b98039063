use parking_lot::Mutex;
use rustc_hash::FxHashMap;
use tracing::trace;

use crate::types::{GraphError, RecordId, Result};

use super::document::Document;

/// Document persistence capability consumed by the graph layer.
///
/// Handles are thread-affine in practice; implementations need not merge
/// concurrent writers to the same document.
pub trait DocumentStore: Send + Sync {
    /// Allocates an identity for a new document of `class`. Nothing is
    /// persisted until [`DocumentStore::save`] is called.
    fn create(&self, class: &str) -> Result<Document>;

    /// Loads the persisted state of `id`.
    fn load(&self, id: &RecordId) -> Result<Option<Document>>;

    /// Persists `doc`, replacing any previous state.
    fn save(&self, doc: &Document) -> Result<()>;

    /// Deletes `id`, returning whether it existed.
    fn delete(&self, id: &RecordId) -> Result<bool>;

    /// Whether `id` is persisted.
    fn contains(&self, id: &RecordId) -> Result<bool> {
        Ok(self.load(id)?.is_some())
    }
}

#[derive(Default)]
struct MemoryInner {
    docs: FxHashMap<RecordId, Document>,
    clusters: FxHashMap<String, u16>,
    next_position: FxHashMap<u16, u64>,
}

/// In-memory [`DocumentStore`]; one cluster per class.
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<MemoryInner>,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of persisted documents.
    pub fn len(&self) -> usize {
        self.inner.lock().docs.len()
    }

    /// Whether no documents are persisted.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl DocumentStore for MemoryStore {
    fn create(&self, class: &str) -> Result<Document> {
        let mut inner = self.inner.lock();
        let cluster = match inner.clusters.get(class) {
            Some(cluster) => *cluster,
            None => {
                let next = u16::try_from(inner.clusters.len() + 1).map_err(|_| {
                    GraphError::Storage(format!("no cluster id left for class {class}"))
                })?;
                inner.clusters.insert(class.to_string(), next);
                next
            }
        };
        let slot = inner.next_position.entry(cluster).or_insert(0);
        let position = *slot;
        *slot += 1;
        Ok(Document::new(RecordId::new(cluster, position), class))
    }

    fn load(&self, id: &RecordId) -> Result<Option<Document>> {
        Ok(self.inner.lock().docs.get(id).cloned())
    }

    fn save(&self, doc: &Document) -> Result<()> {
        trace!(record = %doc.id(), class = doc.class_name(), fields = doc.len(), "save document");
        self.inner.lock().docs.insert(doc.id(), doc.clone());
        Ok(())
    }

    fn delete(&self, id: &RecordId) -> Result<bool> {
        Ok(self.inner.lock().docs.remove(id).is_some())
    }

    fn contains(&self, id: &RecordId) -> Result<bool> {
        Ok(self.inner.lock().docs.contains_key(id))
    }
}
