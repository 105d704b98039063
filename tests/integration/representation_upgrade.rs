use std::sync::Arc;

use docgraph::adjacency::{attach_link, AdjacencyCursor, AttachOpts, LabelFilter, LinkRepr};
use docgraph::storage::{
    Document, DocumentStore, FieldType, FieldValue, LinkBag, MemoryStore, Schema, CUSTOM_ORDERED,
};
use docgraph::{Direction, Graph, GraphError, GraphOptions, RecordId, ANY_LABEL};
use proptest::prelude::*;

struct Fixture {
    store: Arc<MemoryStore>,
    schema: Arc<Schema>,
    graph: Graph,
}

impl Fixture {
    fn new(configure: impl FnOnce(&Schema), auto_scale: bool) -> Self {
        let store = Arc::new(MemoryStore::new());
        let schema = Arc::new(Schema::new());
        configure(&schema);
        let opts = GraphOptions::new(store.clone(), schema.clone()).auto_scale_edge_type(auto_scale);
        let graph = Graph::open(opts).unwrap();
        Self {
            store,
            schema,
            graph,
        }
    }

    fn vertex(&self) -> RecordId {
        self.graph.add_vertex(None).unwrap().id()
    }

    fn field(&self, id: RecordId, field: &str) -> Option<FieldValue> {
        self.store.load(&id).unwrap().unwrap().field(field).cloned()
    }

    fn field_type(&self, id: RecordId, field: &str) -> Option<FieldType> {
        self.store.load(&id).unwrap().unwrap().field_type(field)
    }
}

fn mark_ordered(schema: &Schema, field: &str) {
    schema.create_property("V", field, FieldType::Any).unwrap();
    schema.set_custom("V", field, CUSTOM_ORDERED, "true").unwrap();
}

fn arb_declared() -> impl Strategy<Value = Option<FieldType>> {
    prop_oneof![
        Just(None),
        Just(Some(FieldType::Any)),
        Just(Some(FieldType::Link)),
        Just(Some(FieldType::LinkList)),
        Just(Some(FieldType::LinkBag)),
        Just(Some(FieldType::Integer)),
        Just(Some(FieldType::String)),
    ]
}

fn arb_existing() -> impl Strategy<Value = Option<FieldValue>> {
    let held = RecordId::new(2, 0);
    let mut bag = LinkBag::new();
    bag.add(held);
    prop_oneof![
        Just(None),
        Just(Some(FieldValue::Link(held))),
        Just(Some(FieldValue::LinkList(vec![held]))),
        Just(Some(FieldValue::LinkBag(bag))),
    ]
}

proptest! {
    #[test]
    fn prop_stored_representation_honours_declared_type(
        declared in arb_declared(),
        ordered in any::<bool>(),
        auto_scale in any::<bool>(),
        existing in arb_existing(),
    ) {
        const FIELD: &str = "out_knows";
        let schema = Schema::new();
        if let Some(ty) = declared {
            schema.create_property("V", FIELD, ty).unwrap();
            if ordered {
                schema.set_custom("V", FIELD, CUSTOM_ORDERED, "true").unwrap();
            }
        }
        let mut doc = Document::new(RecordId::new(1, 0), "V");
        if let Some(value) = existing.clone() {
            doc.set(FIELD, value);
        }
        let before = existing.as_ref().map_or(0, |v| {
            LinkRepr::classify(FIELD, Some(v)).unwrap().map_or(0, |r| r.len())
        });
        let to = RecordId::new(3, 7);

        let declared_link = declared.filter(|ty| ty.is_link());
        let refused = declared.is_some_and(|ty| ty != FieldType::Any && !ty.is_link())
            || (declared == Some(FieldType::Link) && matches!(existing, Some(FieldValue::Link(_))));

        match attach_link(&schema, &mut doc, to, FIELD, AttachOpts { auto_scale }) {
            Err(GraphError::IncompatibleFieldType { .. }) => {
                prop_assert!(refused, "declared={:?} existing={:?}", declared, existing);
                prop_assert_eq!(doc.field(FIELD).cloned(), existing);
            }
            Err(other) => prop_assert!(false, "unexpected error {:?}", other),
            Ok(_) => {
                prop_assert!(!refused, "declared={:?} existing={:?}", declared, existing);
                let stored = doc.field_type(FIELD).unwrap();
                prop_assert!(stored.is_link());
                let repr = LinkRepr::classify(FIELD, doc.field(FIELD)).unwrap().unwrap();
                prop_assert_eq!(repr.field_type(), stored);
                prop_assert_eq!(repr.len(), before + 1);
                prop_assert!(repr.contains(&to));
                let replaced = matches!(existing, None | Some(FieldValue::Link(_)));
                if let Some(ty) = declared_link.filter(|_| replaced) {
                    prop_assert_eq!(stored, ty);
                }
            }
        }
    }

    #[test]
    fn prop_second_link_upgrades_single_reference(
        ordered in any::<bool>(),
        extra in 1usize..6,
        lightweight in any::<bool>(),
    ) {
        let fx = Fixture::new(|s| if ordered { mark_ordered(s, "out_knows") }, true);
        let opts_graph = Graph::open(
            GraphOptions::new(fx.store.clone(), fx.schema.clone())
                .auto_scale_edge_type(true)
                .lightweight_edges(lightweight),
        ).unwrap();
        let a = fx.vertex();
        let first_target = fx.vertex();
        let first = opts_graph.add_edge(a, "knows", first_target).unwrap();
        let first_ref = first.id().unwrap_or(first_target);
        prop_assert_eq!(fx.field(a, "out_knows"), Some(FieldValue::Link(first_ref)));

        for _ in 0..extra {
            let b = fx.vertex();
            opts_graph.add_edge(a, "knows", b).unwrap();
        }

        let value = fx.field(a, "out_knows").unwrap();
        match value {
            FieldValue::LinkList(ids) => {
                prop_assert!(ordered);
                prop_assert_eq!(ids.len(), extra + 1);
                prop_assert_eq!(ids[0], first_ref);
                prop_assert_eq!(fx.field_type(a, "out_knows"), Some(FieldType::LinkList));
            }
            FieldValue::LinkBag(bag) => {
                prop_assert!(!ordered);
                prop_assert_eq!(bag.len(), extra + 1);
                prop_assert!(bag.contains(&first_ref));
                prop_assert_eq!(fx.field_type(a, "out_knows"), Some(FieldType::LinkBag));
            }
            other => prop_assert!(false, "unexpected representation {:?}", other),
        }
    }
}

#[test]
fn unconstrained_first_link_is_a_bag_by_default() {
    let fx = Fixture::new(|_| {}, false);
    let a = fx.vertex();
    let b = fx.vertex();
    let edge = fx.graph.add_edge(a, "knows", b).unwrap();
    let mut bag = LinkBag::new();
    bag.add(edge.id().unwrap());
    assert_eq!(fx.field(a, "out_knows"), Some(FieldValue::LinkBag(bag.clone())));
    assert_eq!(fx.field(b, "in_knows"), Some(FieldValue::LinkBag(bag)));
}

#[test]
fn ordered_field_starts_as_list() {
    let fx = Fixture::new(|s| mark_ordered(s, "out_step"), false);
    let a = fx.vertex();
    let targets: Vec<RecordId> = (0..4).map(|_| fx.vertex()).collect();
    let edges: Vec<RecordId> = targets
        .iter()
        .map(|t| fx.graph.add_edge(a, "step", *t).unwrap().id().unwrap())
        .collect();
    assert_eq!(fx.field(a, "out_step"), Some(FieldValue::LinkList(edges)));

    let va = fx.graph.vertex(a).unwrap().unwrap();
    let walked: Vec<RecordId> = fx
        .graph
        .edges(&va, Direction::Out, &["step"])
        .map(|e| e.unwrap().in_vertex())
        .collect();
    assert_eq!(walked, targets);
}

#[test]
fn declared_link_list_is_kept() {
    let fx = Fixture::new(
        |s| s.create_property("V", "in_knows", FieldType::LinkList).unwrap(),
        false,
    );
    let a = fx.vertex();
    let b = fx.vertex();
    fx.graph.add_edge(a, "knows", b).unwrap();
    assert_eq!(fx.field_type(b, "in_knows"), Some(FieldType::LinkList));
    assert_eq!(fx.field_type(a, "out_knows"), Some(FieldType::LinkBag));
}

#[test]
fn declared_single_link_refuses_a_second_edge() {
    let fx = Fixture::new(
        |s| s.create_property("V", "out_parent", FieldType::Link).unwrap(),
        false,
    );
    let a = fx.vertex();
    let b = fx.vertex();
    let c = fx.vertex();
    let first = fx.graph.add_edge(a, "parent", b).unwrap();
    assert_eq!(
        fx.field(a, "out_parent"),
        Some(FieldValue::Link(first.id().unwrap()))
    );

    let persisted = fx.store.len();
    let err = fx.graph.add_edge(a, "parent", c).unwrap_err();
    assert!(matches!(err, GraphError::IncompatibleFieldType { .. }));
    assert_eq!(fx.store.len(), persisted);
    assert_eq!(fx.field(c, "in_parent"), None);
    assert_eq!(
        fx.field(a, "out_parent"),
        Some(FieldValue::Link(first.id().unwrap()))
    );
}

#[test]
fn non_link_declared_type_is_rejected() {
    let fx = Fixture::new(
        |s| s.create_property("V", "out_score", FieldType::Integer).unwrap(),
        true,
    );
    let a = fx.vertex();
    let b = fx.vertex();
    assert!(matches!(
        fx.graph.add_edge(a, "score", b),
        Err(GraphError::IncompatibleFieldType { .. })
    ));
}

#[test]
fn unexpected_field_content_is_rejected() {
    let fx = Fixture::new(|_| {}, false);
    let a = fx.vertex();
    let b = fx.vertex();
    let mut doc = fx.store.load(&a).unwrap().unwrap();
    doc.set("out_knows", FieldValue::from("not a link"));
    fx.store.save(&doc).unwrap();
    assert!(matches!(
        fx.graph.add_edge(a, "knows", b),
        Err(GraphError::InvalidLinkContent { .. })
    ));
}

#[test]
fn one_element_bag_matches_generic_path() {
    let target = RecordId::new(3, 9);
    let mut one = LinkBag::new();
    one.add(target);
    let mut doc = Document::new(RecordId::new(1, 0), "V");
    doc.set("out_knows", FieldValue::LinkBag(one.clone()));

    let mut single = Document::new(RecordId::new(1, 1), "V");
    single.set("out_knows", FieldValue::Link(target));

    let shortcut: Vec<RecordId> = AdjacencyCursor::new(&doc, Direction::Out, LabelFilter::any())
        .map(|e| e.unwrap().target)
        .collect();
    let generic: Vec<RecordId> = one.iter().collect();
    let bare: Vec<RecordId> = AdjacencyCursor::new(&single, Direction::Out, LabelFilter::any())
        .map(|e| e.unwrap().target)
        .collect();
    assert_eq!(shortcut, generic);
    assert_eq!(shortcut, bare);

    let mut many = one.clone();
    many.add(target);
    doc.set("out_knows", FieldValue::LinkBag(many));
    let repeated: Vec<RecordId> = AdjacencyCursor::new(&doc, Direction::Out, LabelFilter::any())
        .map(|e| e.unwrap().target)
        .collect();
    assert_eq!(repeated, vec![target, target]);
}

#[test]
fn bad_field_does_not_stop_traversal() {
    let fx = Fixture::new(|_| {}, false);
    let a = fx.vertex();
    let b = fx.vertex();
    fx.graph.add_edge(a, "likes", b).unwrap();
    let mut doc = fx.store.load(&a).unwrap().unwrap();
    doc.set("out_broken", FieldValue::Int(1));
    fx.store.save(&doc).unwrap();

    let va = fx.graph.vertex(a).unwrap().unwrap();
    let items: Vec<_> = fx.graph.edges(&va, Direction::Out, ANY_LABEL).collect();
    assert_eq!(items.len(), 2);
    assert!(items.iter().filter(|i| i.is_err()).count() == 1);
    assert!(items.iter().any(|i| matches!(i, Ok(e) if e.in_vertex() == b)));
}
