// End-to-end extraction tests against a mocked SPARQL endpoint

use ontosight_extractor::extractors::RelationExtractor;
use ontosight_extractor::{
    lock, ClassExtractor, EventBus, ExtractError, Node, NodeGraph, NodeKind, PropertyGraph,
    RequestConfig, RequestStats, SparqlClient, SharedConfig, SUBCLASS_OF_URI,
};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use url::Url;
use wiremock::matchers::{method, query_param_contains};
use wiremock::{Mock, MockServer, ResponseTemplate};

const PERSON: &str = "http://example.org/Person";
const ORGANIZATION: &str = "http://example.org/Organization";
const XSD_STRING: &str = "http://www.w3.org/2001/XMLSchema#string";
const WORKS_FOR: &str = "http://example.org/worksFor";
const NAME_PROP: &str = "http://example.org/name";

// ============================================================================
// SPARQL JSON body builders
// ============================================================================

fn sparql_json(body: String) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_raw(body, "application/sparql-results+json")
}

fn integer_literal(value: u64) -> serde_json::Value {
    json!({
        "type": "literal",
        "datatype": "http://www.w3.org/2001/XMLSchema#integer",
        "value": value.to_string()
    })
}

fn class_body(classes: &[(&str, u64)]) -> String {
    let bindings: Vec<_> = classes
        .iter()
        .map(|(uri, count)| {
            json!({
                "class": { "type": "uri", "value": uri },
                "instanceCount": integer_literal(*count)
            })
        })
        .collect();
    json!({
        "head": { "vars": ["class", "instanceCount"] },
        "results": { "bindings": bindings }
    })
    .to_string()
}

fn prop_body(uris: &[&str]) -> String {
    let bindings: Vec<_> = uris
        .iter()
        .map(|uri| json!({ "prop": { "type": "uri", "value": uri } }))
        .collect();
    json!({
        "head": { "vars": ["prop"] },
        "results": { "bindings": bindings }
    })
    .to_string()
}

fn label_body(label: &str) -> String {
    json!({
        "head": { "vars": ["label"] },
        "results": { "bindings": [
            { "label": { "type": "literal", "value": label } }
        ] }
    })
    .to_string()
}

fn type_body(types: &[(&str, u64)]) -> String {
    let bindings: Vec<_> = types
        .iter()
        .map(|(uri, count)| {
            json!({
                "valType": { "type": "uri", "value": uri },
                "valCount": integer_literal(*count)
            })
        })
        .collect();
    json!({
        "head": { "vars": ["valCount", "valType"] },
        "results": { "bindings": bindings }
    })
    .to_string()
}

fn overlap_body(common: u64) -> String {
    json!({
        "head": { "vars": ["commonInstanceCount"] },
        "results": { "bindings": [
            { "commonInstanceCount": integer_literal(common) }
        ] }
    })
    .to_string()
}

fn empty_body() -> String {
    json!({
        "head": { "vars": ["prop"] },
        "results": { "bindings": [] }
    })
    .to_string()
}

// ============================================================================
// Harness
// ============================================================================

fn config_for(server: &MockServer) -> SharedConfig {
    let endpoint = Url::parse(&server.uri()).unwrap();
    RequestConfig::new(endpoint)
        .with_limit(10)
        .with_query_delay(Duration::from_millis(1))
        .with_concurrency(4)
        .into_shared()
}

struct Harness {
    extractor: ClassExtractor,
    nodes: ontosight_extractor::SharedNodeGraph,
    properties: ontosight_extractor::SharedPropertyGraph,
    stats: Arc<RequestStats>,
}

fn harness_for(server: &MockServer) -> Harness {
    let events = Arc::new(EventBus::new());
    let config = config_for(server);
    let stats = Arc::new(RequestStats::new());
    let client = SparqlClient::new(config.clone(), stats.clone()).unwrap();
    let nodes = NodeGraph::new(events.clone()).into_shared();
    let properties = PropertyGraph::new(events.clone()).into_shared();
    let extractor = ClassExtractor::new(
        client,
        config,
        nodes.clone(),
        properties.clone(),
        events,
    );
    Harness {
        extractor,
        nodes,
        properties,
        stats,
    }
}

/// Generic fallbacks so branches not under test answer with empty result
/// sets instead of failing.
async fn mount_empty_fallbacks(server: &MockServer) {
    for marker in [
        "rdfs:label",
        "skos:prefLabel",
        "AS ?valType",
        "?originInstance ?prop ?targetInstance",
        "FILTER (datatype(?val)",
        "?commonInstanceCount",
    ] {
        Mock::given(method("GET"))
            .and(query_param_contains("query", marker))
            .respond_with(sparql_json(empty_body()))
            .with_priority(50)
            .mount(server)
            .await;
    }
}

// ============================================================================
// Full extraction scenario
// ============================================================================

#[tokio::test]
async fn test_full_extraction_discovers_classes_types_and_relations() {
    let server = MockServer::start().await;
    mount_empty_fallbacks(&server).await;

    // Two seeded classes
    Mock::given(method("GET"))
        .and(query_param_contains("query", "GROUP BY ?class"))
        .respond_with(sparql_json(class_body(&[
            (PERSON, 100),
            (ORGANIZATION, 40),
        ])))
        .with_priority(1)
        .mount(&server)
        .await;

    // Person has an rdfs:label, Organization only a skos:prefLabel
    Mock::given(method("GET"))
        .and(query_param_contains(
            "query",
            "<http://example.org/Person> rdfs:label",
        ))
        .respond_with(sparql_json(label_body("A person")))
        .with_priority(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(query_param_contains(
            "query",
            "<http://example.org/Organization> skos:prefLabel",
        ))
        .respond_with(sparql_json(label_body("Organisation")))
        .with_priority(1)
        .mount(&server)
        .await;

    // Person instances carry string-typed values
    Mock::given(method("GET"))
        .and(query_param_contains("query", "AS ?valType"))
        .and(query_param_contains("query", PERSON))
        .respond_with(sparql_json(type_body(&[(XSD_STRING, 25)])))
        .with_priority(1)
        .mount(&server)
        .await;

    // worksFor links Person instances to Organization instances
    Mock::given(method("GET"))
        .and(query_param_contains(
            "query",
            "?originInstance a <http://example.org/Person> . \
             ?targetInstance a <http://example.org/Organization>",
        ))
        .respond_with(sparql_json(prop_body(&[WORKS_FOR])))
        .with_priority(1)
        .mount(&server)
        .await;

    // The name predicate carries the string values
    Mock::given(method("GET"))
        .and(query_param_contains(
            "query",
            "FILTER (datatype(?val) = <http://www.w3.org/2001/XMLSchema#string>)",
        ))
        .respond_with(sparql_json(prop_body(&[NAME_PROP])))
        .with_priority(1)
        .mount(&server)
        .await;

    // Every Organization instance is also a Person instance
    Mock::given(method("GET"))
        .and(query_param_contains("query", "?commonInstanceCount"))
        .respond_with(sparql_json(overlap_body(40)))
        .with_priority(1)
        .mount(&server)
        .await;

    let harness = harness_for(&server);
    let class_ids = harness.extractor.request_classes().await.unwrap();
    assert_eq!(class_ids.len(), 2);

    let nodes = lock(&harness.nodes).snapshot();
    let by_uri = |uri: &str| {
        nodes
            .values()
            .find(|node| node.uri == uri)
            .unwrap_or_else(|| panic!("no node for {uri}"))
    };

    let person = by_uri(PERSON);
    assert_eq!(person.kind, NodeKind::Class);
    assert_eq!(person.name, "A person");
    assert_eq!(person.instance_count, 100);

    let organization = by_uri(ORGANIZATION);
    assert_eq!(organization.name, "Organisation");

    let string_type = by_uri(XSD_STRING);
    assert_eq!(string_type.kind, NodeKind::Type);
    assert_eq!(string_type.name, "string");
    assert_eq!(string_type.value, 25);

    // The placeholder intermediate was rewritten to the real predicate
    let name_intermediate = by_uri(NAME_PROP);
    assert_eq!(name_intermediate.kind, NodeKind::DatatypeProperty);
    assert_eq!(name_intermediate.name, "name");

    let edges = lock(&harness.properties).snapshot();
    assert!(
        edges.iter().all(|edge| edge.uri.starts_with("http")),
        "placeholder edge survived: {edges:?}"
    );

    let works_for = edges
        .iter()
        .find(|edge| edge.uri == WORKS_FOR)
        .expect("no worksFor edge");
    assert_eq!(works_for.source, person.id);
    assert_eq!(works_for.target, organization.id);

    let name_edge = edges
        .iter()
        .find(|edge| edge.uri == NAME_PROP)
        .expect("no name edge");
    assert_eq!(name_edge.source, person.id);
    assert_eq!(name_edge.target, string_type.id);

    // Strict containment of the instance sets makes Organization a subclass
    let subclass = edges
        .iter()
        .find(|edge| edge.uri == SUBCLASS_OF_URI)
        .expect("no subclass edge");
    assert_eq!(subclass.source, organization.id);
    assert_eq!(subclass.target, person.id);
    assert_eq!(nodes.get(&subclass.intermediate).unwrap().name, "Subclass of");

    let snapshot = harness.stats.snapshot();
    assert_eq!(snapshot.failed, 0);
    assert_eq!(snapshot.pending, 0);
}

// ============================================================================
// Failure handling
// ============================================================================

#[tokio::test]
async fn test_seeding_failure_aborts_the_run() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let harness = harness_for(&server);
    let result = harness.extractor.request_classes().await;
    assert!(matches!(result, Err(ExtractError::Status { status: 500, .. })));
    assert_eq!(harness.stats.snapshot().failed, 1);
    assert!(lock(&harness.nodes).is_empty());
}

#[tokio::test]
async fn test_branch_failures_do_not_sink_the_run() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(query_param_contains("query", "GROUP BY ?class"))
        .respond_with(sparql_json(class_body(&[
            (PERSON, 100),
            (ORGANIZATION, 40),
        ])))
        .with_priority(1)
        .mount(&server)
        .await;
    // Every discovery branch hits a server error
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .with_priority(50)
        .mount(&server)
        .await;

    let harness = harness_for(&server);
    let class_ids = harness.extractor.request_classes().await.unwrap();
    assert_eq!(class_ids.len(), 2);

    let snapshot = harness.stats.snapshot();
    assert!(snapshot.failed > 0);
    assert_eq!(snapshot.pending, 0);
    assert!(!lock(&harness.nodes).is_empty());
}

#[tokio::test]
async fn test_non_http_class_uris_are_skipped() {
    let server = MockServer::start().await;
    mount_empty_fallbacks(&server).await;

    Mock::given(method("GET"))
        .and(query_param_contains("query", "GROUP BY ?class"))
        .respond_with(sparql_json(class_body(&[
            (PERSON, 100),
            ("urn:blank:b0", 3),
        ])))
        .with_priority(1)
        .mount(&server)
        .await;

    let harness = harness_for(&server);
    let class_ids = harness.extractor.request_classes().await.unwrap();
    assert_eq!(class_ids.len(), 1);
    assert_eq!(
        lock(&harness.nodes).uri_of(&class_ids[0]).as_deref(),
        Some(PERSON)
    );
}

#[tokio::test]
async fn test_reseeding_is_a_noop() {
    let server = MockServer::start().await;
    mount_empty_fallbacks(&server).await;

    Mock::given(method("GET"))
        .and(query_param_contains("query", "GROUP BY ?class"))
        .respond_with(sparql_json(class_body(&[(PERSON, 100)])))
        .with_priority(1)
        .mount(&server)
        .await;

    let harness = harness_for(&server);
    let first = harness.extractor.request_classes().await.unwrap();
    let successful = harness.stats.snapshot().successful;

    let second = harness.extractor.request_classes().await.unwrap();
    assert_eq!(first, second);
    assert_eq!(harness.stats.snapshot().successful, successful);
}

// ============================================================================
// Pagination
// ============================================================================

#[tokio::test]
async fn test_relation_pagination_stops_on_a_short_page() {
    let server = MockServer::start().await;
    mount_empty_fallbacks(&server).await;

    let first_page: Vec<String> = (0..10)
        .map(|i| format!("http://example.org/p{i}"))
        .collect();
    let first_refs: Vec<&str> = first_page.iter().map(String::as_str).collect();

    // Full first page doubles the limit and advances the offset
    Mock::given(method("GET"))
        .and(query_param_contains("query", "?targetInstance"))
        .and(query_param_contains("query", "LIMIT 10 OFFSET 0"))
        .respond_with(sparql_json(prop_body(&first_refs)))
        .with_priority(1)
        .expect(1)
        .mount(&server)
        .await;
    // Short second page ends the loop
    Mock::given(method("GET"))
        .and(query_param_contains("query", "?targetInstance"))
        .and(query_param_contains("query", "LIMIT 20 OFFSET 10"))
        .respond_with(sparql_json(prop_body(&["http://example.org/p10"])))
        .with_priority(1)
        .expect(1)
        .mount(&server)
        .await;

    let events = Arc::new(EventBus::new());
    let config = config_for(&server);
    let stats = Arc::new(RequestStats::new());
    let client = SparqlClient::new(config.clone(), stats).unwrap();
    let nodes = NodeGraph::new(events.clone()).into_shared();
    let properties = PropertyGraph::new(events).into_shared();

    let person = lock(&nodes).add_node(Node::class(PERSON, 100));
    let organization = lock(&nodes).add_node(Node::class(ORGANIZATION, 40));

    let relations = RelationExtractor::new(client, config, nodes, properties.clone());
    relations
        .request_class_class_relation(&person, &organization)
        .await;

    let edges = lock(&properties).snapshot();
    assert_eq!(edges.len(), 1);
    assert_eq!(edges[0].props.len(), 11);
}
