// Tests for the node and property stores

use ontosight_extractor::{
    lock, DiscoveryState, EventBus, GraphEvent, Node, NodeGraph, NodeKind, PropertyGraph,
    PLACEHOLDER_PROP_URI,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

fn events() -> Arc<EventBus> {
    Arc::new(EventBus::new())
}

// ============================================================================
// Node Store Tests
// ============================================================================

#[test]
fn test_node_ids_carry_the_kind_prefix() {
    let mut nodes = NodeGraph::new(events());
    let class_id = nodes.add_node(Node::class("http://example.org/Person", 100));
    let type_id = nodes.add_node(Node::datatype(
        "http://www.w3.org/2001/XMLSchema#string",
        25,
    ));

    assert!(class_id.starts_with("class"));
    assert!(type_id.starts_with("type"));
    assert_ne!(class_id, type_id);
}

#[test]
fn test_class_registration_is_idempotent_per_uri() {
    let mut nodes = NodeGraph::new(events());
    let first = nodes.add_node(Node::class("http://example.org/Person", 100));
    let second = nodes.add_node(Node::class("http://example.org/Person", 100));

    assert_eq!(first, second);
    assert_eq!(nodes.len(), 1);
    assert_eq!(nodes.class_ids(), vec![first]);
}

#[test]
fn test_display_names_are_derived_from_the_uri() {
    let mut nodes = NodeGraph::new(events());
    let person = nodes.add_node(Node::class("http://example.org/Person", 100));
    let string = nodes.add_node(Node::datatype(
        "http://www.w3.org/2001/XMLSchema#string",
        25,
    ));
    let knows = nodes.add_node(Node::property("http://xmlns.com/foaf/0.1/knows", false));

    assert_eq!(nodes.get(&person).unwrap().name, "Person");
    assert_eq!(nodes.get(&string).unwrap().name, "string");
    assert_eq!(nodes.get(&knows).unwrap().name, "foaf:knows");
}

#[test]
fn test_explicit_names_survive_registration() {
    let mut nodes = NodeGraph::new(events());
    let id = nodes.add_node(
        Node::property("http://www.w3.org/2000/01/rdf-schema#subClassOf", false)
            .with_name("Subclass of"),
    );
    assert_eq!(nodes.get(&id).unwrap().name, "Subclass of");
}

#[test]
fn test_datatypes_are_unique_across_the_session() {
    let mut nodes = NodeGraph::new(events());
    let first = nodes.add_datatype_for_class(Node::datatype(
        "http://www.w3.org/2001/XMLSchema#string",
        25,
    ));
    let second = nodes.add_datatype_for_class(Node::datatype(
        "http://www.w3.org/2001/XMLSchema#string",
        7,
    ));

    assert!(first.is_some());
    assert!(second.is_none());
    assert_eq!(nodes.len(), 1);
}

#[test]
fn test_set_uri_rederives_the_name_and_keeps_the_id() {
    let mut nodes = NodeGraph::new(events());
    let id = nodes.add_node(Node::datatype_property(PLACEHOLDER_PROP_URI));
    assert_eq!(nodes.get(&id).unwrap().name, "unknown");

    nodes.set_uri(&id, "http://example.org/name");
    let node = nodes.get(&id).unwrap();
    assert_eq!(node.id, id);
    assert_eq!(node.uri, "http://example.org/name");
    assert_eq!(node.name, "name");
}

#[test]
fn test_label_insertion_overrides_the_derived_name() {
    let mut nodes = NodeGraph::new(events());
    let id = nodes.add_node(Node::class("http://example.org/Person", 100));
    nodes.insert_label(&id, "A person");
    assert_eq!(nodes.get(&id).unwrap().name, "A person");

    // Unknown ids are ignored
    nodes.insert_label("class999", "ghost");
    assert_eq!(nodes.len(), 1);
}

#[test]
fn test_discovery_state_advances_once() {
    let mut nodes = NodeGraph::new(events());
    let id = nodes.add_node(Node::class("http://example.org/Person", 100));
    assert_eq!(nodes.discovery_state(&id), Some(DiscoveryState::Seeded));

    nodes.advance_discovery(&id);
    assert_eq!(
        nodes.discovery_state(&id),
        Some(DiscoveryState::TypesDiscovered)
    );

    nodes.advance_discovery(&id);
    assert_eq!(
        nodes.discovery_state(&id),
        Some(DiscoveryState::TypesDiscovered)
    );
}

#[test]
fn test_instance_count_lookup_never_fails() {
    let mut nodes = NodeGraph::new(events());
    let id = nodes.add_node(Node::class("http://example.org/Person", 100));
    assert_eq!(nodes.instance_count_of(&id), 100);
    assert_eq!(nodes.instance_count_of("class999"), 0);
}

#[test]
fn test_node_changes_are_broadcast() {
    let bus = events();
    let seen = Arc::new(AtomicUsize::new(0));
    let seen_clone = seen.clone();
    bus.subscribe(Arc::new(move |event| {
        if matches!(event, GraphEvent::NodesChanged(_)) {
            seen_clone.fetch_add(1, Ordering::SeqCst);
        }
    }));

    let mut nodes = NodeGraph::new(bus);
    let id = nodes.add_node(Node::class("http://example.org/Person", 100));
    nodes.insert_label(&id, "A person");
    assert_eq!(seen.load(Ordering::SeqCst), 2);
}

// ============================================================================
// Property Store Tests
// ============================================================================

#[test]
fn test_edges_are_directional() {
    let mut properties = PropertyGraph::new(events());
    properties.add_property("class0", "property2", "class1", "http://example.org/p", 1);
    properties.add_property("class1", "property3", "class0", "http://example.org/p", 1);

    assert_eq!(properties.len(), 2);
    assert_eq!(
        properties.intermediate_id("class0", "class1"),
        Some("property2".to_string())
    );
    assert_eq!(
        properties.intermediate_id("class1", "class0"),
        Some("property3".to_string())
    );
    assert_eq!(properties.intermediate_id("class0", "class2"), None);
}

#[test]
fn test_placeholder_uri_is_replaced_wholesale() {
    let mut properties = PropertyGraph::new(events());
    properties.add_property("class0", "datatypeProperty2", "type1", PLACEHOLDER_PROP_URI, 1);
    properties.add_property("class0", "datatypeProperty2", "type1", "http://example.org/name", 3);

    let edges = properties.snapshot();
    assert_eq!(edges.len(), 1);
    assert_eq!(edges[0].uri, "http://example.org/name");
    assert_eq!(edges[0].props.len(), 1);
    assert_eq!(edges[0].props[0].uri, "http://example.org/name");
    assert_eq!(edges[0].props[0].value, 3);
}

#[test]
fn test_further_predicates_merge_into_the_same_edge() {
    let mut properties = PropertyGraph::new(events());
    properties.add_property("class0", "property2", "class1", "http://example.org/p", 1);
    properties.add_property("class0", "property2", "class1", "http://example.org/q", 1);
    properties.add_property("class0", "property2", "class1", "http://example.org/q", 1);

    let edges = properties.snapshot();
    assert_eq!(edges.len(), 1);
    assert_eq!(edges[0].uri, "http://example.org/p");
    assert_eq!(edges[0].props.len(), 2);
}

#[test]
fn test_the_intermediate_id_never_changes_after_creation() {
    let mut properties = PropertyGraph::new(events());
    properties.add_property("class0", "property2", "class1", "http://example.org/p", 1);
    properties.add_property("class0", "property9", "class1", "http://example.org/q", 1);

    assert_eq!(
        properties.intermediate_id("class0", "class1"),
        Some("property2".to_string())
    );
}

#[test]
fn test_insert_name_enriches_the_first_representative_match() {
    let mut properties = PropertyGraph::new(events());
    properties.add_property("class0", "property2", "class1", "http://example.org/p", 1);
    properties.add_property("class0", "property3", "class2", "http://example.org/p", 1);
    properties.add_property("class1", "property4", "class2", "http://example.org/q", 1);

    assert!(properties.insert_name("http://example.org/p", "part of"));
    assert!(!properties.insert_name("http://example.org/missing", "ghost"));

    let edges = properties.snapshot();
    assert_eq!(edges[0].name.as_deref(), Some("part of"));
    assert_eq!(edges[1].name, None);
    assert_eq!(edges[2].name, None);
}

#[test]
fn test_property_changes_are_broadcast() {
    let bus = events();
    let seen = Arc::new(AtomicUsize::new(0));
    let seen_clone = seen.clone();
    bus.subscribe(Arc::new(move |event| {
        if matches!(event, GraphEvent::PropertiesChanged(_)) {
            seen_clone.fetch_add(1, Ordering::SeqCst);
        }
    }));

    let mut properties = PropertyGraph::new(bus);
    properties.add_property("class0", "property2", "class1", "http://example.org/p", 1);
    properties.insert_name("http://example.org/p", "part of");
    assert_eq!(seen.load(Ordering::SeqCst), 2);
}

// ============================================================================
// Shared Handle Tests
// ============================================================================

#[test]
fn test_shared_stores_mutate_under_the_lock() {
    let nodes = NodeGraph::new(events()).into_shared();
    let id = lock(&nodes).add_node(Node::class("http://example.org/Person", 100));
    assert_eq!(lock(&nodes).uri_of(&id).as_deref(), Some("http://example.org/Person"));
}
