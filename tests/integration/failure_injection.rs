//! Store failures during edge creation and traversal.

use std::sync::Arc;

use docgraph::graph::CounterMetrics;
use docgraph::storage::{Document, DocumentStore, FieldValue, MemoryStore};
use docgraph::{Direction, Graph, GraphError, GraphOptions, Neighbor, RecordId, Result, ANY_LABEL};
use parking_lot::Mutex;

/// Wraps a [`MemoryStore`], failing saves once a budget runs out and loads of
/// chosen records.
#[derive(Default)]
struct FailingStore {
    inner: MemoryStore,
    save_budget: Mutex<Option<usize>>,
    saved: Mutex<Vec<RecordId>>,
    broken_loads: Mutex<Vec<RecordId>>,
    loads: Mutex<Vec<RecordId>>,
}

impl FailingStore {
    fn fail_after_saves(&self, n: usize) {
        *self.save_budget.lock() = Some(n);
        self.saved.lock().clear();
    }

    fn heal(&self) {
        *self.save_budget.lock() = None;
    }

    fn break_load(&self, id: RecordId) {
        self.broken_loads.lock().push(id);
    }

    fn loads_of(&self, id: RecordId) -> usize {
        self.loads.lock().iter().filter(|l| **l == id).count()
    }
}

impl DocumentStore for FailingStore {
    fn create(&self, class: &str) -> Result<Document> {
        self.inner.create(class)
    }

    fn load(&self, id: &RecordId) -> Result<Option<Document>> {
        self.loads.lock().push(*id);
        if self.broken_loads.lock().contains(id) {
            return Err(GraphError::Storage(format!("injected failure loading {id}")));
        }
        self.inner.load(id)
    }

    fn save(&self, doc: &Document) -> Result<()> {
        {
            let mut budget = self.save_budget.lock();
            if let Some(left) = budget.as_mut() {
                if *left == 0 {
                    return Err(GraphError::Storage(format!(
                        "injected failure saving {}",
                        doc.id()
                    )));
                }
                *left -= 1;
            }
        }
        self.saved.lock().push(doc.id());
        self.inner.save(doc)
    }

    fn delete(&self, id: &RecordId) -> Result<bool> {
        self.inner.delete(id)
    }
}

fn setup(lightweight: bool) -> (Arc<FailingStore>, Arc<CounterMetrics>, Graph) {
    let store = Arc::new(FailingStore::default());
    let metrics = Arc::new(CounterMetrics::default());
    let opts = GraphOptions::in_memory()
        .lightweight_edges(lightweight)
        .metrics(metrics.clone());
    let opts = GraphOptions {
        store: store.clone(),
        ..opts
    };
    (store, metrics, Graph::open(opts).unwrap())
}

#[test]
fn endpoints_are_saved_after_the_edge_record() {
    let (store, _, graph) = setup(false);
    let a = graph.add_vertex(None).unwrap().id();
    let b = graph.add_vertex(None).unwrap().id();
    store.fail_after_saves(usize::MAX);
    let edge = graph.add_edge(a, "knows", b).unwrap();
    assert_eq!(*store.saved.lock(), vec![edge.id().unwrap(), b, a]);
}

#[test]
fn failure_before_any_save_persists_nothing() {
    let (store, _, graph) = setup(false);
    let a = graph.add_vertex(None).unwrap().id();
    let b = graph.add_vertex(None).unwrap().id();
    store.fail_after_saves(0);
    assert!(matches!(
        graph.add_edge(a, "knows", b),
        Err(GraphError::Storage(_))
    ));
    store.heal();
    for id in [a, b] {
        let vertex = graph.vertex(id).unwrap().unwrap();
        assert_eq!(vertex.document().field_names().count(), 0);
        assert!(graph.verify_vertex(id).unwrap().success);
    }
}

#[test]
fn failed_out_vertex_save_leaves_one_sided_adjacency() {
    for lightweight in [false, true] {
        let (store, _, graph) = setup(lightweight);
        let a = graph.add_vertex(None).unwrap().id();
        let b = graph.add_vertex(None).unwrap().id();
        // edge record (if any) and in-vertex succeed, out-vertex fails
        store.fail_after_saves(if lightweight { 1 } else { 2 });
        assert!(graph.add_edge(a, "knows", b).is_err());
        store.heal();

        let va = graph.vertex(a).unwrap().unwrap();
        let vb = graph.vertex(b).unwrap().unwrap();
        assert!(!va.document().has_field("out_knows"));
        assert!(vb.document().has_field("in_knows"));

        // the surviving half still resolves to a's side
        let incoming: Vec<_> = graph
            .edges(&vb, Direction::In, ANY_LABEL)
            .collect::<Result<_>>()
            .unwrap();
        assert_eq!(incoming.len(), 1);
        assert_eq!(incoming[0].out_vertex(), a);

        assert!(graph.verify_vertex(a).unwrap().success);
        let report = graph.verify_vertex(b).unwrap();
        assert!(!report.success, "lightweight={lightweight}");
        assert!(report.findings[0].message.contains("out_knows"));
    }
}

#[test]
fn unavailable_endpoint_reloads_edge_once() {
    let (store, metrics, graph) = setup(false);
    let a = graph.add_vertex(None).unwrap().id();
    let b = graph.add_vertex(None).unwrap().id();
    let edge = graph.add_edge(a, "knows", b).unwrap().id().unwrap();
    let va = graph.vertex(a).unwrap().unwrap();
    graph.remove_vertex(b).unwrap();

    let before = store.loads_of(edge);
    let items: Vec<Neighbor> = graph
        .vertices(&va, Direction::Out, &["knows"])
        .collect::<Result<_>>()
        .unwrap();
    assert_eq!(
        items,
        vec![Neighbor::Unavailable {
            edge,
            direction: Direction::In,
        }]
    );
    assert_eq!(store.loads_of(edge) - before, 2);
    assert_eq!(CounterMetrics::get(&metrics.endpoints_unavailable), 1);
}

#[test]
fn load_failure_is_reported_per_entry() {
    let (store, _, graph) = setup(true);
    let a = graph.add_vertex(None).unwrap().id();
    let b = graph.add_vertex(None).unwrap().id();
    let c = graph.add_vertex(None).unwrap().id();
    graph.add_edge(a, "knows", b).unwrap();
    graph.add_edge(a, "likes", c).unwrap();
    let va = graph.vertex(a).unwrap().unwrap();
    store.break_load(b);

    let items: Vec<Result<Neighbor>> = graph.vertices(&va, Direction::Out, ANY_LABEL).collect();
    assert_eq!(items.len(), 2);
    assert!(matches!(items[0], Err(GraphError::Storage(_))));
    match &items[1] {
        Ok(Neighbor::Vertex(v)) => assert_eq!(v.id(), c),
        other => panic!("unexpected {other:?}"),
    }
    assert!(matches!(
        graph.vertex(b),
        Err(GraphError::Storage(_))
    ));
}

#[test]
fn failed_attach_saves_nothing() {
    let (store, _, graph) = setup(false);
    let a = graph.add_vertex(None).unwrap().id();
    let b = graph.add_vertex(None).unwrap().id();
    let mut doc = store.load(&b).unwrap().unwrap();
    doc.set("in_knows", FieldValue::Bool(true));
    store.save(&doc).unwrap();

    store.fail_after_saves(usize::MAX);
    assert!(matches!(
        graph.add_edge(a, "knows", b),
        Err(GraphError::InvalidLinkContent { .. })
    ));
    assert!(store.saved.lock().is_empty());
    assert!(!graph.vertex(a).unwrap().unwrap().document().has_field("out_knows"));
}
