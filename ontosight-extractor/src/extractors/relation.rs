//! Relation discovery between pairs of registered nodes.

use crate::bindings::{OverlapRow, PredicateRow};
use crate::client::SparqlClient;
use crate::config::SharedConfig;
use crate::extractors::{fetch_label, INITIAL_RELATION_LIMIT, MAX_PAGE_ROUNDS};
use crate::lock;
use crate::model::{Node, PLACEHOLDER_PROP_URI, SUBCLASS_OF_URI};
use crate::nodes::SharedNodeGraph;
use crate::properties::SharedPropertyGraph;
use crate::queries;
use tracing::{debug, warn};

/// Discovers predicates linking instances of two classes, predicates linking
/// a class to a value type, and subclass relationships inferred from
/// instance-set overlap.
#[derive(Clone)]
pub struct RelationExtractor {
    client: SparqlClient,
    config: SharedConfig,
    nodes: SharedNodeGraph,
    properties: SharedPropertyGraph,
}

impl RelationExtractor {
    pub fn new(
        client: SparqlClient,
        config: SharedConfig,
        nodes: SharedNodeGraph,
        properties: SharedPropertyGraph,
    ) -> Self {
        Self {
            client,
            config,
            nodes,
            properties,
        }
    }

    /// Pages through every predicate whose subject is an instance of the
    /// origin class and whose object is an instance of the target class.
    ///
    /// A short page ends the loop; a full page doubles the limit and
    /// advances the offset by the rows received.
    pub async fn request_class_class_relation(&self, origin_id: &str, target_id: &str) {
        let (origin_uri, target_uri) = {
            let nodes = lock(&self.nodes);
            match (nodes.uri_of(origin_id), nodes.uri_of(target_id)) {
                (Some(a), Some(b)) => (a, b),
                _ => return,
            }
        };
        let lang = lock(&self.config).label_lang.clone();

        let mut limit = INITIAL_RELATION_LIMIT;
        let mut offset = 0usize;
        let mut rounds = 0usize;
        loop {
            let query = queries::unordered_class_class_relation_query(
                &origin_uri,
                &target_uri,
                limit,
                offset,
            );
            let rows = match self.client.query(&query).await {
                Ok(rows) => rows,
                Err(error) if error.is_cancelled() => return,
                Err(error) => {
                    warn!(
                        "Relation discovery for {} and {} failed: {}",
                        origin_uri, target_uri, error
                    );
                    return;
                }
            };
            let received = rows.len();
            for row in rows.iter().filter_map(PredicateRow::from_solution) {
                self.register_predicate(origin_id, target_id, &row.uri, &lang)
                    .await;
            }
            if received < limit {
                return;
            }
            rounds += 1;
            if rounds >= MAX_PAGE_ROUNDS {
                warn!(
                    "Stopping relation pagination for {} and {} after {} rounds",
                    origin_uri, target_uri, rounds
                );
                return;
            }
            offset += received;
            limit *= 2;
        }
    }

    /// Pages through predicates whose subject is an instance of the class
    /// and whose object carries the given value type.
    pub async fn request_class_type_relation(&self, class_id: &str, type_id: &str) {
        let (class_uri, type_uri) = {
            let nodes = lock(&self.nodes);
            match (nodes.uri_of(class_id), nodes.uri_of(type_id)) {
                (Some(a), Some(b)) => (a, b),
                _ => return,
            }
        };
        let lang = lock(&self.config).label_lang.clone();

        let mut limit = INITIAL_RELATION_LIMIT;
        let mut offset = 0usize;
        let mut rounds = 0usize;
        loop {
            let query =
                queries::unordered_class_type_relation_query(&class_uri, &type_uri, limit, offset);
            let rows = match self.client.query(&query).await {
                Ok(rows) => rows,
                Err(error) if error.is_cancelled() => return,
                Err(error) => {
                    warn!(
                        "Type relation discovery for {} and {} failed: {}",
                        class_uri, type_uri, error
                    );
                    return;
                }
            };
            let received = rows.len();
            for row in rows.iter().filter_map(PredicateRow::from_solution) {
                self.register_predicate(class_id, type_id, &row.uri, &lang)
                    .await;
            }
            if received < limit {
                return;
            }
            rounds += 1;
            if rounds >= MAX_PAGE_ROUNDS {
                warn!(
                    "Stopping type relation pagination for {} and {} after {} rounds",
                    class_uri, type_uri, rounds
                );
                return;
            }
            offset += received;
            limit *= 2;
        }
    }

    /// Compares the instance sets of two classes and records a subclass edge
    /// when one set strictly contains the other. Equal sets produce no edge.
    pub async fn request_class_equality(&self, id_a: &str, id_b: &str) {
        let (uri_a, uri_b, count_a, count_b) = {
            let nodes = lock(&self.nodes);
            match (nodes.uri_of(id_a), nodes.uri_of(id_b)) {
                (Some(a), Some(b)) => (
                    a,
                    b,
                    nodes.instance_count_of(id_a),
                    nodes.instance_count_of(id_b),
                ),
                _ => return,
            }
        };

        let query = queries::common_instances_query(&uri_a, &uri_b);
        let rows = match self.client.query(&query).await {
            Ok(rows) => rows,
            Err(error) if error.is_cancelled() => return,
            Err(error) => {
                warn!(
                    "Overlap check for {} and {} failed: {}",
                    uri_a, uri_b, error
                );
                return;
            }
        };
        let Some(row) = rows.iter().filter_map(OverlapRow::from_solution).next() else {
            return;
        };
        if row.common == 0 {
            return;
        }
        debug!(
            "{} and {} share {} instances ({} vs {})",
            uri_a, uri_b, row.common, count_a, count_b
        );
        if row.common == count_a && row.common < count_b {
            self.add_subclass_edge(id_a, id_b);
        } else if row.common == count_b && row.common < count_a {
            self.add_subclass_edge(id_b, id_a);
        }
    }

    fn add_subclass_edge(&self, sub_id: &str, super_id: &str) {
        let intermediate = {
            let existing = lock(&self.properties).intermediate_id(sub_id, super_id);
            match existing {
                Some(id) => id,
                None => lock(&self.nodes).add_node(
                    Node::property(SUBCLASS_OF_URI, false).with_name("Subclass of"),
                ),
            }
        };
        lock(&self.properties).add_property(sub_id, &intermediate, super_id, SUBCLASS_OF_URI, 1);
    }

    /// Records one discovered predicate between two nodes, allocating the
    /// intermediate property node on first contact and rewriting a
    /// placeholder intermediate in place when a real predicate arrives.
    async fn register_predicate(&self, source_id: &str, target_id: &str, uri: &str, lang: &str) {
        let intermediate = {
            let existing = lock(&self.properties).intermediate_id(source_id, target_id);
            match existing {
                Some(id) => {
                    let mut nodes = lock(&self.nodes);
                    if nodes.uri_of(&id).as_deref() == Some(PLACEHOLDER_PROP_URI) {
                        nodes.set_uri(&id, uri);
                    }
                    id
                }
                None => lock(&self.nodes)
                    .add_node(Node::property(uri, source_id == target_id)),
            }
        };
        lock(&self.properties).add_property(source_id, &intermediate, target_id, uri, 1);

        if let Some(label) = fetch_label(&self.client, uri, lang).await {
            lock(&self.properties).insert_name(uri, &label);
        }
    }
}
