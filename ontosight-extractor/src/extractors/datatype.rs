//! Value-type discovery for a single class.

use crate::bindings::TypeRow;
use crate::client::SparqlClient;
use crate::config::SharedConfig;
use crate::extractors::{RelationExtractor, REFERRING_TYPE_LIMIT};
use crate::lock;
use crate::model::{DiscoveryState, Node, PLACEHOLDER_PROP_URI};
use crate::nodes::SharedNodeGraph;
use crate::properties::SharedPropertyGraph;
use crate::queries;
use tracing::{debug, warn};

/// Samples the value types reachable from instances of a class and attaches
/// each new type behind a placeholder property edge, then kicks off predicate
/// discovery to name that edge.
#[derive(Clone)]
pub struct DatatypeExtractor {
    client: SparqlClient,
    nodes: SharedNodeGraph,
    properties: SharedPropertyGraph,
    relations: RelationExtractor,
}

impl DatatypeExtractor {
    pub fn new(
        client: SparqlClient,
        config: SharedConfig,
        nodes: SharedNodeGraph,
        properties: SharedPropertyGraph,
    ) -> Self {
        let relations = RelationExtractor::new(
            client.clone(),
            config,
            nodes.clone(),
            properties.clone(),
        );
        Self {
            client,
            nodes,
            properties,
            relations,
        }
    }

    /// Runs at most once per class. The discovery marker advances before the
    /// query is issued, so concurrent callers for the same class bail out
    /// instead of duplicating work.
    pub async fn request_referring_types(&self, class_id: &str) {
        let class_uri = {
            let mut nodes = lock(&self.nodes);
            if nodes.discovery_state(class_id) == Some(DiscoveryState::TypesDiscovered) {
                return;
            }
            let Some(uri) = nodes.uri_of(class_id) else {
                return;
            };
            nodes.advance_discovery(class_id);
            uri
        };

        let query = queries::referring_types_query(&class_uri, REFERRING_TYPE_LIMIT);
        let rows = match self.client.query(&query).await {
            Ok(rows) => rows,
            Err(error) if error.is_cancelled() => return,
            Err(error) => {
                warn!("Type discovery for {} failed: {}", class_uri, error);
                return;
            }
        };

        for row in rows.iter().filter_map(TypeRow::from_solution) {
            if !row.uri.starts_with("http") {
                debug!("Skipping non-dereferenceable value type {}", row.uri);
                continue;
            }
            let (type_id, intermediate) = {
                let mut nodes = lock(&self.nodes);
                let Some(type_id) =
                    nodes.add_datatype_for_class(Node::datatype(&row.uri, row.count))
                else {
                    continue;
                };
                let intermediate = nodes.add_node(Node::datatype_property(PLACEHOLDER_PROP_URI));
                (type_id, intermediate)
            };
            lock(&self.properties).add_property(
                class_id,
                &intermediate,
                &type_id,
                PLACEHOLDER_PROP_URI,
                1,
            );
            self.relations
                .request_class_type_relation(class_id, &type_id)
                .await;
        }
    }
}
